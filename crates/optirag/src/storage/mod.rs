//! Storage backend registry
//!
//! The RAG pipeline is wired to pluggable key-value, graph, vector, and
//! doc-status backends. Backends are identified by the class names the
//! centroid metadata and configuration files carry (e.g.
//! `"QdrantVectorDBStorage"`); this module enumerates the finite set of
//! known implementations as a tagged enum so unknown names are rejected when
//! configuration is loaded, not when a query arrives.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// The role a storage backend plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKind {
    /// Key-value storage (chunks, LLM response cache)
    Kv,
    /// Graph storage (entity/relation graph)
    Graph,
    /// Vector storage (embeddings)
    Vector,
    /// Document status storage (ingestion bookkeeping)
    DocStatus,
}

impl StorageKind {
    /// Methods every implementation of this kind must provide.
    ///
    /// Custom backend descriptors are checked against this set at
    /// registration time.
    pub fn required_capabilities(&self) -> &'static [&'static str] {
        match self {
            StorageKind::Kv => &["get_by_id", "upsert"],
            StorageKind::Graph => &["upsert_node", "upsert_edge"],
            StorageKind::Vector => &["query", "upsert"],
            StorageKind::DocStatus => &["get_docs_by_status"],
        }
    }
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageKind::Kv => "kv",
            StorageKind::Graph => "graph",
            StorageKind::Vector => "vector",
            StorageKind::DocStatus => "doc_status",
        };
        f.write_str(name)
    }
}

/// One built-in storage backend implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendId {
    // KV
    JsonKv,
    RedisKv,
    PgKv,
    MongoKv,
    // Graph
    NetworkX,
    Neo4j,
    PgGraph,
    // Vector
    NanoVector,
    Milvus,
    Chroma,
    PgVector,
    Faiss,
    Qdrant,
    MongoVector,
    Weaviate,
    // Doc status
    JsonDocStatus,
    PgDocStatus,
    MongoDocStatus,
}

impl BackendId {
    /// Every built-in backend, in declaration order.
    pub const ALL: &'static [BackendId] = &[
        BackendId::JsonKv,
        BackendId::RedisKv,
        BackendId::PgKv,
        BackendId::MongoKv,
        BackendId::NetworkX,
        BackendId::Neo4j,
        BackendId::PgGraph,
        BackendId::NanoVector,
        BackendId::Milvus,
        BackendId::Chroma,
        BackendId::PgVector,
        BackendId::Faiss,
        BackendId::Qdrant,
        BackendId::MongoVector,
        BackendId::Weaviate,
        BackendId::JsonDocStatus,
        BackendId::PgDocStatus,
        BackendId::MongoDocStatus,
    ];

    /// The class name this backend is known by in configuration files and
    /// persisted centroid metadata. Kept bit-compatible with the deployed
    /// metadata format.
    pub fn wire_name(&self) -> &'static str {
        match self {
            BackendId::JsonKv => "JsonKVStorage",
            BackendId::RedisKv => "RedisKVStorage",
            BackendId::PgKv => "PGKVStorage",
            BackendId::MongoKv => "MongoKVStorage",
            BackendId::NetworkX => "NetworkXStorage",
            BackendId::Neo4j => "Neo4JStorage",
            BackendId::PgGraph => "PGGraphStorage",
            BackendId::NanoVector => "NanoVectorDBStorage",
            BackendId::Milvus => "MilvusVectorDBStorage",
            BackendId::Chroma => "ChromaVectorDBStorage",
            BackendId::PgVector => "PGVectorStorage",
            BackendId::Faiss => "FaissVectorDBStorage",
            BackendId::Qdrant => "QdrantVectorDBStorage",
            BackendId::MongoVector => "MongoVectorDBStorage",
            BackendId::Weaviate => "WeaviateDBVectorStorage",
            BackendId::JsonDocStatus => "JsonDocStatusStorage",
            BackendId::PgDocStatus => "PGDocStatusStorage",
            BackendId::MongoDocStatus => "MongoDocStatusStorage",
        }
    }

    /// The storage role this backend implements.
    pub fn kind(&self) -> StorageKind {
        match self {
            BackendId::JsonKv | BackendId::RedisKv | BackendId::PgKv | BackendId::MongoKv => {
                StorageKind::Kv
            }
            BackendId::NetworkX | BackendId::Neo4j | BackendId::PgGraph => StorageKind::Graph,
            BackendId::NanoVector
            | BackendId::Milvus
            | BackendId::Chroma
            | BackendId::PgVector
            | BackendId::Faiss
            | BackendId::Qdrant
            | BackendId::MongoVector
            | BackendId::Weaviate => StorageKind::Vector,
            BackendId::JsonDocStatus | BackendId::PgDocStatus | BackendId::MongoDocStatus => {
                StorageKind::DocStatus
            }
        }
    }

    /// Environment variables this backend needs at runtime.
    pub fn required_env(&self) -> &'static [&'static str] {
        match self {
            BackendId::RedisKv => &["REDIS_URI"],
            BackendId::PgKv | BackendId::PgVector | BackendId::PgGraph | BackendId::PgDocStatus => {
                &["POSTGRES_USER", "POSTGRES_PASSWORD", "POSTGRES_DATABASE"]
            }
            BackendId::Neo4j => &["NEO4J_URI", "NEO4J_USERNAME", "NEO4J_PASSWORD"],
            BackendId::Qdrant => &["QDRANT_URL"],
            BackendId::Weaviate => &["WEAVIATE_URL"],
            _ => &[],
        }
    }

    /// Parse a wire name into a backend id.
    pub fn parse(name: &str) -> Option<BackendId> {
        Self::ALL.iter().copied().find(|b| b.wire_name() == name)
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Errors raised by registry construction and lookups.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageConfigError {
    /// Name does not match any registered backend
    #[error("unknown storage backend: {0}")]
    UnknownBackend(String),
    /// Backend exists but implements a different storage kind
    #[error("storage backend {name} is a {found} implementation, expected {expected}")]
    WrongKind {
        name: String,
        expected: StorageKindName,
        found: StorageKindName,
    },
    /// Custom backend descriptor does not cover its kind's capability set
    #[error("custom backend {backend} is missing required capability '{capability}'")]
    MissingCapability { backend: String, capability: String },
    /// Backend requires an environment variable that is not set
    #[error("storage backend {backend} requires environment variable {var}")]
    MissingEnv { backend: String, var: String },
    /// Name collides with an already-registered backend
    #[error("storage backend {0} is already registered")]
    DuplicateBackend(String),
}

/// Display wrapper so error messages carry readable kind names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageKindName(pub StorageKind);

impl std::fmt::Display for StorageKindName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Descriptor for a custom (out-of-tree) storage backend.
///
/// `capabilities` lists the methods the implementation provides; it must
/// cover the required set for `kind` or registration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomBackend {
    pub name: String,
    pub kind: StorageKind,
    pub capabilities: Vec<String>,
}

/// A backend name resolved through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedBackend {
    /// One of the built-in implementations
    Builtin(BackendId),
    /// A registered custom backend, by name
    Custom(String),
}

impl ResolvedBackend {
    /// The wire name of the resolved backend.
    pub fn name(&self) -> &str {
        match self {
            ResolvedBackend::Builtin(id) => id.wire_name(),
            ResolvedBackend::Custom(name) => name.as_str(),
        }
    }
}

/// Registry of known storage backends.
///
/// Holds the built-in implementation table plus any custom backends
/// registered at startup. Lookups never touch the environment; use
/// [`StorageRegistry::check_env`] for deploy-time validation.
#[derive(Debug, Clone, Default)]
pub struct StorageRegistry {
    custom: HashMap<String, CustomBackend>,
}

impl StorageRegistry {
    /// Registry with only the built-in backends.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom backend descriptor.
    ///
    /// Structural capability checking happens here: a descriptor that does
    /// not cover the required method set of its kind is rejected, so a
    /// misconfigured plugin fails at startup rather than mid-query.
    pub fn register_custom(&mut self, backend: CustomBackend) -> Result<(), StorageConfigError> {
        if BackendId::parse(&backend.name).is_some() || self.custom.contains_key(&backend.name) {
            return Err(StorageConfigError::DuplicateBackend(backend.name));
        }

        for required in backend.kind.required_capabilities() {
            if !backend.capabilities.iter().any(|c| c == required) {
                return Err(StorageConfigError::MissingCapability {
                    backend: backend.name,
                    capability: (*required).to_string(),
                });
            }
        }

        info!(backend = %backend.name, kind = %backend.kind, "registered custom storage backend");
        self.custom.insert(backend.name.clone(), backend);
        Ok(())
    }

    /// All wire names implementing the given kind, built-ins first.
    pub fn implementations(&self, kind: StorageKind) -> Vec<&str> {
        let mut names: Vec<&str> = BackendId::ALL
            .iter()
            .filter(|b| b.kind() == kind)
            .map(|b| b.wire_name())
            .collect();
        names.extend(
            self.custom
                .values()
                .filter(|c| c.kind == kind)
                .map(|c| c.name.as_str()),
        );
        names
    }

    /// Resolve a wire name to a backend.
    pub fn resolve(&self, name: &str) -> Result<ResolvedBackend, StorageConfigError> {
        if let Some(id) = BackendId::parse(name) {
            return Ok(ResolvedBackend::Builtin(id));
        }
        if self.custom.contains_key(name) {
            return Ok(ResolvedBackend::Custom(name.to_string()));
        }
        Err(StorageConfigError::UnknownBackend(name.to_string()))
    }

    /// Resolve a wire name, additionally requiring a specific kind.
    pub fn resolve_kind(
        &self,
        name: &str,
        kind: StorageKind,
    ) -> Result<ResolvedBackend, StorageConfigError> {
        let resolved = self.resolve(name)?;
        let found = match &resolved {
            ResolvedBackend::Builtin(id) => id.kind(),
            ResolvedBackend::Custom(n) => self.custom[n].kind,
        };
        if found != kind {
            return Err(StorageConfigError::WrongKind {
                name: name.to_string(),
                expected: StorageKindName(kind),
                found: StorageKindName(found),
            });
        }
        Ok(resolved)
    }

    /// Validity predicate used by the router: is `name` a known backend of
    /// the given kind?
    pub fn validate(&self, name: &str, kind: StorageKind) -> bool {
        self.resolve_kind(name, kind).is_ok()
    }

    /// Check that the environment carries every variable a built-in backend
    /// needs. Custom backends own their environment contract.
    pub fn check_env(&self, name: &str) -> Result<(), StorageConfigError> {
        if let Some(id) = BackendId::parse(name) {
            for var in id.required_env() {
                if std::env::var(var).is_err() {
                    return Err(StorageConfigError::MissingEnv {
                        backend: name.to_string(),
                        var: (*var).to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for id in BackendId::ALL {
            assert_eq!(BackendId::parse(id.wire_name()), Some(*id));
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        let registry = StorageRegistry::new();
        let err = registry.resolve("AstraDBVectorStorage").unwrap_err();
        assert!(matches!(err, StorageConfigError::UnknownBackend(_)));
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let registry = StorageRegistry::new();
        let err = registry
            .resolve_kind("JsonKVStorage", StorageKind::Vector)
            .unwrap_err();
        assert!(matches!(err, StorageConfigError::WrongKind { .. }));
        assert!(registry.validate("QdrantVectorDBStorage", StorageKind::Vector));
        assert!(!registry.validate("JsonKVStorage", StorageKind::Vector));
    }

    #[test]
    fn test_vector_implementations_complete() {
        let registry = StorageRegistry::new();
        let vectors = registry.implementations(StorageKind::Vector);
        assert_eq!(vectors.len(), 8);
        assert!(vectors.contains(&"WeaviateDBVectorStorage"));
        assert!(vectors.contains(&"NanoVectorDBStorage"));
    }

    #[test]
    fn test_custom_backend_capability_check() {
        let mut registry = StorageRegistry::new();

        // Missing "upsert" for a vector backend
        let err = registry
            .register_custom(CustomBackend {
                name: "AcmeVectorStorage".to_string(),
                kind: StorageKind::Vector,
                capabilities: vec!["query".to_string()],
            })
            .unwrap_err();
        assert!(matches!(err, StorageConfigError::MissingCapability { .. }));

        registry
            .register_custom(CustomBackend {
                name: "AcmeVectorStorage".to_string(),
                kind: StorageKind::Vector,
                capabilities: vec!["query".to_string(), "upsert".to_string()],
            })
            .unwrap();

        assert!(registry.validate("AcmeVectorStorage", StorageKind::Vector));
        assert_eq!(
            registry.resolve("AcmeVectorStorage").unwrap(),
            ResolvedBackend::Custom("AcmeVectorStorage".to_string())
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = StorageRegistry::new();
        let err = registry
            .register_custom(CustomBackend {
                name: "JsonKVStorage".to_string(),
                kind: StorageKind::Kv,
                capabilities: vec!["get_by_id".to_string(), "upsert".to_string()],
            })
            .unwrap_err();
        assert!(matches!(err, StorageConfigError::DuplicateBackend(_)));
    }

    #[test]
    fn test_required_env_tables() {
        assert_eq!(BackendId::Neo4j.required_env().len(), 3);
        assert_eq!(BackendId::JsonKv.required_env().len(), 0);
        assert_eq!(BackendId::Qdrant.required_env(), &["QDRANT_URL"]);
    }

    #[test]
    fn test_check_env_reports_missing_variable() {
        let registry = StorageRegistry::new();

        // File-backed backends need no environment at all.
        registry.check_env("JsonKVStorage").unwrap();

        // No other test touches REDIS_URI, so mutating it here is safe
        // under the parallel test runner.
        std::env::remove_var("REDIS_URI");
        let err = registry.check_env("RedisKVStorage").unwrap_err();
        assert!(matches!(
            err,
            StorageConfigError::MissingEnv { ref var, .. } if var == "REDIS_URI"
        ));

        std::env::set_var("REDIS_URI", "redis://localhost:6379");
        registry.check_env("RedisKVStorage").unwrap();
        std::env::remove_var("REDIS_URI");
    }
}
