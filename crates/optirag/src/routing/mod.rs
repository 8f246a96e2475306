//! Centroid-based storage routing
//!
//! Maps a natural-language query to the vector storage backend best suited
//! to answer it. Each candidate backend publishes a centroid (a
//! representative embedding of its indexed content) in a JSON document in
//! the blob store; the router embeds the query and picks the backend whose
//! centroid is nearest by Euclidean distance.
//!
//! Routing is a best-effort optimization on a latency-sensitive path, so
//! infrastructure trouble (centroid document missing, malformed, store
//! unreachable) degrades to the default backend with an observable reason
//! rather than failing the query. Data-integrity trouble (the winning
//! centroid naming an unknown backend, mismatched vector dimensions) is a
//! hard error, because it means the routing metadata is out of sync with
//! the deployed backend set.
//!
//! # Example
//!
//! ```rust,ignore
//! use optirag::routing::{RoutingRequest, StorageRouter};
//!
//! let router = StorageRouter::new(embedder, blob_store, registry);
//! let decision = router
//!     .route(&RoutingRequest::new(
//!         "how do I rotate credentials?",
//!         "QdrantVectorDBStorage",
//!         "NanoVectorDBStorage",
//!     ))
//!     .await?;
//! println!("serve from {}", decision.storage_name());
//! ```

pub mod centroid;

pub use centroid::{CentroidEntry, CentroidSet, CENTROID_KEY};

use crate::blob::BlobStore;
use crate::llm::{Embedder, LLMError};
use crate::storage::{ResolvedBackend, StorageKind, StorageRegistry};
use centroid::euclidean_distance;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One routing call's input.
#[derive(Debug, Clone)]
pub struct RoutingRequest {
    /// The query to route
    pub query: String,
    /// The storage currently configured for the pipeline
    pub configured_storage: String,
    /// The known-good default storage, always a valid fallback
    pub default_storage: String,
}

impl RoutingRequest {
    pub fn new(
        query: impl Into<String>,
        configured_storage: impl Into<String>,
        default_storage: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            configured_storage: configured_storage.into(),
            default_storage: default_storage.into(),
        }
    }
}

/// Why a routing call fell back to the default storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The centroid document could not be fetched (missing key, store
    /// unavailable); carries the underlying error text for logging
    BlobUnavailable(String),
    /// The centroid document was fetched but is not valid JSON in the
    /// expected shape
    MalformedCentroidData(String),
    /// The document parsed but holds no centroid entries
    NoCentroidData,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::BlobUnavailable(e) => write!(f, "centroid data unavailable: {e}"),
            FallbackReason::MalformedCentroidData(e) => {
                write!(f, "centroid data malformed: {e}")
            }
            FallbackReason::NoCentroidData => f.write_str("no centroid data"),
        }
    }
}

/// Outcome of a routing call.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingDecision {
    /// A backend was selected by nearest centroid
    Routed {
        /// The resolved backend
        backend: ResolvedBackend,
        /// Name of the winning centroid entry
        matched: String,
        /// Distance between the query vector and the winning centroid
        distance: f32,
    },
    /// Routing was disabled for this request; the configured storage is
    /// returned unchanged
    PassThrough { storage: String },
    /// Routing was enabled but inconclusive; the default storage is used
    Fallback {
        storage: String,
        reason: FallbackReason,
    },
}

impl RoutingDecision {
    /// The storage name the caller should use.
    pub fn storage_name(&self) -> &str {
        match self {
            RoutingDecision::Routed { backend, .. } => backend.name(),
            RoutingDecision::PassThrough { storage } => storage,
            RoutingDecision::Fallback { storage, .. } => storage,
        }
    }
}

/// Hard routing failures. Everything here aborts the routing call; soft
/// failures become [`RoutingDecision::Fallback`] instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RouteError {
    /// The query could not be embedded; without a query vector there is no
    /// principled decision to make
    #[error("query embedding failed: {0}")]
    Embedding(#[from] LLMError),
    /// The winning centroid names a backend absent from the registry,
    /// which means the centroid metadata is stale or corrupt
    #[error("centroid data names unknown storage backend: {name}")]
    UnknownBackend { name: String },
    /// A centroid's dimensionality differs from the query vector's
    #[error(
        "dimension mismatch for centroid '{name}': query vector has {expected} dimensions, centroid has {found}"
    )]
    DimensionMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Nearest-centroid storage router.
///
/// Stateless per call: each invocation embeds the query, fetches the
/// centroid document fresh (no caching, no retries), and computes the
/// decision. Calls are safe to run concurrently.
pub struct StorageRouter {
    embedder: Embedder,
    blob: Arc<dyn BlobStore>,
    registry: Arc<StorageRegistry>,
    centroid_key: String,
}

impl StorageRouter {
    /// Create a router over the given collaborators.
    pub fn new(
        embedder: Embedder,
        blob: Arc<dyn BlobStore>,
        registry: Arc<StorageRegistry>,
    ) -> Self {
        Self {
            embedder,
            blob,
            registry,
            centroid_key: CENTROID_KEY.to_string(),
        }
    }

    /// Override the blob key of the centroid document.
    pub fn with_centroid_key(mut self, key: impl Into<String>) -> Self {
        self.centroid_key = key.into();
        self
    }

    /// Routing applies only when the configured storage differs from the
    /// default and is a valid vector backend.
    fn routing_enabled(&self, request: &RoutingRequest) -> bool {
        request.configured_storage != request.default_storage
            && self
                .registry
                .validate(&request.configured_storage, StorageKind::Vector)
    }

    /// Resolve the configured storage without consulting centroids.
    ///
    /// When routing applies, the configured name is resolved through the
    /// registry to its canonical wire name; otherwise the configured value
    /// is returned unchanged.
    pub fn select_storage(&self, configured: &str, default_storage: &str) -> String {
        if configured != default_storage && self.registry.validate(configured, StorageKind::Vector)
        {
            if let Ok(backend) = self.registry.resolve(configured) {
                return backend.name().to_string();
            }
        }
        configured.to_string()
    }

    /// Route a query to a storage backend.
    ///
    /// See the module docs for the fallback/propagate split. Ties at equal
    /// distance resolve to the earliest entry in the centroid document.
    pub async fn route(&self, request: &RoutingRequest) -> Result<RoutingDecision, RouteError> {
        if !self.routing_enabled(request) {
            debug!(
                storage = %request.configured_storage,
                "routing disabled, passing configured storage through"
            );
            return Ok(RoutingDecision::PassThrough {
                storage: request.configured_storage.clone(),
            });
        }

        // The two I/O legs are independent; issue them together. The
        // embedding result decides whether the call proceeds at all, so its
        // error is checked first.
        let (embedded, fetched) = tokio::join!(
            self.embedder.embed_one(&request.query),
            self.blob.get(&self.centroid_key)
        );
        let query_vector = embedded?;

        let raw = match fetched {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    key = %self.centroid_key,
                    error = %e,
                    "failed to fetch centroid data, using default storage"
                );
                return Ok(RoutingDecision::Fallback {
                    storage: request.default_storage.clone(),
                    reason: FallbackReason::BlobUnavailable(e.to_string()),
                });
            }
        };

        let set = match CentroidSet::from_slice(&raw) {
            Ok(set) => set,
            Err(e) => {
                warn!(
                    key = %self.centroid_key,
                    error = %e,
                    "centroid data is malformed, using default storage"
                );
                return Ok(RoutingDecision::Fallback {
                    storage: request.default_storage.clone(),
                    reason: FallbackReason::MalformedCentroidData(e.to_string()),
                });
            }
        };

        let mut entries = set.databases.iter();
        let (mut best_name, first) = match entries.next() {
            Some(entry) => entry,
            None => {
                warn!("no centroid data found, using default storage");
                return Ok(RoutingDecision::Fallback {
                    storage: request.default_storage.clone(),
                    reason: FallbackReason::NoCentroidData,
                });
            }
        };

        let mut best_distance = self.distance_to(&query_vector, best_name, &first.centroid)?;
        for (name, entry) in entries {
            let distance = self.distance_to(&query_vector, name, &entry.centroid)?;
            // Strictly smaller wins, so the earliest entry keeps ties.
            if distance < best_distance {
                best_distance = distance;
                best_name = name;
            }
        }

        let backend = self
            .registry
            .resolve(best_name)
            .map_err(|_| RouteError::UnknownBackend {
                name: best_name.clone(),
            })?;

        info!(
            backend = %backend.name(),
            matched = %best_name,
            distance = best_distance,
            "routed query to storage backend"
        );

        Ok(RoutingDecision::Routed {
            backend,
            matched: best_name.clone(),
            distance: best_distance,
        })
    }

    fn distance_to(
        &self,
        query_vector: &[f32],
        name: &str,
        centroid: &[f32],
    ) -> Result<f32, RouteError> {
        if centroid.len() != query_vector.len() {
            return Err(RouteError::DimensionMismatch {
                name: name.to_string(),
                expected: query_vector.len(),
                found: centroid.len(),
            });
        }
        Ok(euclidean_distance(query_vector, centroid))
    }
}
