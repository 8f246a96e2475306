//! optirag — RAG storage configuration and centroid-based query routing
//!
//! Wires pluggable key-value, graph, and vector storage backends and
//! embedding providers into a RAG pipeline, and routes each query to the
//! vector database whose content centroid it is nearest to.

// config module - application settings
pub mod config;

// llm module - embedding providers
pub mod llm;

// blob module - object store client
pub mod blob;

// storage module - backend registry
pub mod storage;

// routing module - centroid-based storage router
pub mod routing;

pub use config::AppConfig;

pub use llm::{Embedder, EmbeddingProvider, LLMError, LLMResult};

pub use blob::{BlobError, BlobResult, BlobStore, HttpBlobStore, MemoryBlobStore};

pub use storage::{
    BackendId, CustomBackend, ResolvedBackend, StorageConfigError, StorageKind, StorageRegistry,
};

pub use routing::{
    CentroidSet, FallbackReason, RouteError, RoutingDecision, RoutingRequest, StorageRouter,
    CENTROID_KEY,
};
