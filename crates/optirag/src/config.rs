//! Application configuration
//!
//! Settings are loaded once at startup and passed into the components that
//! need them; no module reads ambient globals. Sources are layered:
//! built-in defaults, then an optional `optirag.{toml,yaml,json}` file,
//! then `OPTIRAG_*` environment variables (nested fields separated by
//! `__`, e.g. `OPTIRAG_BLOB__BASE_URL`).
//!
//! # Example file (optirag.toml)
//!
//! ```toml
//! app_name = "optirag"
//!
//! [blob]
//! base_url = "https://store.example.com/my-bucket"
//!
//! [embedding]
//! provider = "ollama"
//! model = "nomic-embed-text"
//!
//! [storage]
//! vector = "QdrantVectorDBStorage"
//! default_vector = "NanoVectorDBStorage"
//! ```

use crate::llm::{
    Embedder, EmbeddingProvider, LLMError, LLMResult, OllamaConfig, OllamaEmbeddings,
    OpenAIConfig, OpenAIEmbeddings,
};
use crate::storage::{StorageConfigError, StorageKind, StorageRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name (used in logs)
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Blob store settings
    #[serde(default)]
    pub blob: BlobSettings,
    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    /// Storage backend selections
    #[serde(default)]
    pub storage: StorageSettings,
    /// Collaborator endpoints
    #[serde(default)]
    pub endpoints: EndpointSettings,
}

fn default_app_name() -> String {
    "optirag".to_string()
}

/// Blob store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobSettings {
    /// Bucket base URL of the S3-compatible gateway
    #[serde(default)]
    pub base_url: String,
    /// Region hint, forwarded to the gateway when it needs one
    #[serde(default = "default_region")]
    pub region: String,
    /// Request timeout in seconds
    #[serde(default = "default_blob_timeout")]
    pub timeout_secs: u64,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_blob_timeout() -> u64 {
    30
}

impl Default for BlobSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            region: default_region(),
            timeout_secs: default_blob_timeout(),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider type: openai, azure, ollama
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    /// Embedding model name (must be in the known-models table)
    #[serde(default)]
    pub model: Option<String>,
    /// OpenAI API key
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// OpenAI-compatible base URL override
    #[serde(default)]
    pub openai_base_url: Option<String>,
    /// Azure OpenAI endpoint
    #[serde(default)]
    pub azure_endpoint: Option<String>,
    /// Azure OpenAI API key
    #[serde(default)]
    pub azure_api_key: Option<String>,
    /// Azure embedding deployment name
    #[serde(default)]
    pub azure_deployment: Option<String>,
    /// Ollama base URL
    #[serde(default = "default_ollama_url")]
    pub ollama_base_url: String,
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434/v1".to_string()
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: None,
            openai_api_key: None,
            openai_base_url: None,
            azure_endpoint: None,
            azure_api_key: None,
            azure_deployment: None,
            ollama_base_url: default_ollama_url(),
        }
    }
}

impl EmbeddingSettings {
    /// Construct the configured embedding provider.
    pub fn build_provider(&self) -> LLMResult<Arc<dyn EmbeddingProvider>> {
        match self.provider.as_str() {
            "openai" => {
                let api_key = self.openai_api_key.clone().ok_or_else(|| {
                    LLMError::ConfigError(
                        "openai_api_key must be set for the openai provider".to_string(),
                    )
                })?;
                let mut cfg = OpenAIConfig::new(api_key);
                if let Some(ref base_url) = self.openai_base_url {
                    cfg = cfg.with_base_url(base_url);
                }
                if let Some(ref model) = self.model {
                    cfg = cfg.with_model(model);
                }
                Ok(Arc::new(OpenAIEmbeddings::with_config(cfg)))
            }
            "azure" => {
                let endpoint = self.azure_endpoint.clone().ok_or_else(|| {
                    LLMError::ConfigError(
                        "azure_endpoint must be set for the azure provider".to_string(),
                    )
                })?;
                let api_key = self.azure_api_key.clone().ok_or_else(|| {
                    LLMError::ConfigError(
                        "azure_api_key must be set for the azure provider".to_string(),
                    )
                })?;
                let deployment = self.azure_deployment.clone().ok_or_else(|| {
                    LLMError::ConfigError(
                        "azure_deployment must be set for the azure provider".to_string(),
                    )
                })?;
                Ok(Arc::new(OpenAIEmbeddings::azure(
                    endpoint, api_key, deployment,
                )))
            }
            "ollama" => {
                let mut cfg = OllamaConfig::new().with_base_url(&self.ollama_base_url);
                if let Some(ref model) = self.model {
                    cfg = cfg.with_model(model);
                }
                Ok(Arc::new(OllamaEmbeddings::with_config(cfg)))
            }
            other => Err(LLMError::ProviderNotSupported(other.to_string())),
        }
    }

    /// Construct the fixed-dimension embedder the router consumes.
    ///
    /// A configured model goes through the known-models dimension table
    /// (unsupported models fail here); no model means the provider default.
    pub fn build_embedder(&self) -> LLMResult<Embedder> {
        let provider = self.build_provider()?;
        match &self.model {
            Some(model) => Embedder::new(provider, model),
            None => Ok(Embedder::with_default_model(provider)),
        }
    }
}

/// Storage backend selections, by wire name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key-value backend
    #[serde(default = "default_kv")]
    pub kv: String,
    /// Graph backend
    #[serde(default = "default_graph")]
    pub graph: String,
    /// Vector backend serving queries
    #[serde(default = "default_vector")]
    pub vector: String,
    /// Doc-status backend
    #[serde(default = "default_doc_status")]
    pub doc_status: String,
    /// Known-good default vector backend the router falls back to
    #[serde(default = "default_vector")]
    pub default_vector: String,
}

fn default_kv() -> String {
    "JsonKVStorage".to_string()
}

fn default_graph() -> String {
    "NetworkXStorage".to_string()
}

fn default_vector() -> String {
    "NanoVectorDBStorage".to_string()
}

fn default_doc_status() -> String {
    "JsonDocStatusStorage".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            kv: default_kv(),
            graph: default_graph(),
            vector: default_vector(),
            doc_status: default_doc_status(),
            default_vector: default_vector(),
        }
    }
}

/// Endpoints of the databases the configured backends connect to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointSettings {
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default)]
    pub neo4j_uri: Option<String>,
    #[serde(default)]
    pub neo4j_username: Option<String>,
    #[serde(default)]
    pub neo4j_password: Option<String>,
    #[serde(default)]
    pub mongo_uri: Option<String>,
    #[serde(default)]
    pub qdrant_url: Option<String>,
    #[serde(default)]
    pub weaviate_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            blob: BlobSettings::default(),
            embedding: EmbeddingSettings::default(),
            storage: StorageSettings::default(),
            endpoints: EndpointSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the layered sources.
    ///
    /// Storage backend selections are resolved through the built-in
    /// registry here, so an unknown tag is a load-time error. Deployments
    /// with custom backends load with [`AppConfig::load_with_registry`].
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("optirag")
    }

    /// Load configuration validated against a registry carrying custom
    /// backends.
    pub fn load_with_registry(registry: &StorageRegistry) -> Result<Self, config::ConfigError> {
        let config = Self::read_sources("optirag")?;
        config
            .validate_storage(registry)
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration with a custom file stem (used by tests).
    pub fn load_from(file_stem: &str) -> Result<Self, config::ConfigError> {
        let config = Self::read_sources(file_stem)?;
        config
            .validate_storage(&StorageRegistry::new())
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    fn read_sources(file_stem: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(
                config::Environment::with_prefix("OPTIRAG")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Check every selected backend name against the registry.
    ///
    /// Unknown or wrong-kind selections fail here, at configuration load,
    /// rather than when a query arrives.
    pub fn validate_storage(&self, registry: &StorageRegistry) -> Result<(), StorageConfigError> {
        registry.resolve_kind(&self.storage.kv, StorageKind::Kv)?;
        registry.resolve_kind(&self.storage.graph, StorageKind::Graph)?;
        registry.resolve_kind(&self.storage.vector, StorageKind::Vector)?;
        registry.resolve_kind(&self.storage.doc_status, StorageKind::DocStatus)?;
        registry.resolve_kind(&self.storage.default_vector, StorageKind::Vector)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        let registry = StorageRegistry::new();
        config.validate_storage(&registry).unwrap();
        assert_eq!(config.storage.vector, "NanoVectorDBStorage");
        assert_eq!(config.embedding.provider, "ollama");
    }

    #[test]
    fn test_unknown_backend_fails_at_load() {
        let mut config = AppConfig::default();
        config.storage.vector = "AstraDBVectorStorage".to_string();
        let registry = StorageRegistry::new();
        let err = config.validate_storage(&registry).unwrap_err();
        assert!(matches!(err, StorageConfigError::UnknownBackend(_)));
    }

    #[test]
    fn test_wrong_kind_fails_at_load() {
        let mut config = AppConfig::default();
        config.storage.vector = "JsonKVStorage".to_string();
        let registry = StorageRegistry::new();
        let err = config.validate_storage(&registry).unwrap_err();
        assert!(matches!(err, StorageConfigError::WrongKind { .. }));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let raw = r#"
            app_name = "optirag-test"

            [storage]
            vector = "QdrantVectorDBStorage"
            default_vector = "NanoVectorDBStorage"

            [embedding]
            provider = "openai"
            model = "openai-ada"
        "#;
        let config: AppConfig = toml_from_str(raw);
        assert_eq!(config.app_name, "optirag-test");
        assert_eq!(config.storage.vector, "QdrantVectorDBStorage");
        // Unset sections fall back to defaults
        assert_eq!(config.storage.kv, "JsonKVStorage");
        assert_eq!(config.embedding.model.as_deref(), Some("openai-ada"));
    }

    fn toml_from_str(raw: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_load_rejects_unknown_backend() {
        // No other test reads the OPTIRAG_ environment, so setting the
        // override here is safe under the parallel test runner.
        std::env::set_var("OPTIRAG_STORAGE__VECTOR", "AstraDBVectorStorage");
        let loaded = AppConfig::load_from("optirag_nonexistent_stem");
        std::env::remove_var("OPTIRAG_STORAGE__VECTOR");

        let err = loaded.unwrap_err();
        assert!(err.to_string().contains("AstraDBVectorStorage"));
    }

    #[test]
    fn test_build_embedder_defaults_to_ollama() {
        let settings = EmbeddingSettings::default();
        let embedder = settings.build_embedder().unwrap();
        assert_eq!(embedder.model(), "nomic-embed-text");
        assert_eq!(embedder.dimensions(), 768);
    }

    #[test]
    fn test_build_embedder_openai_needs_api_key() {
        let settings = EmbeddingSettings {
            provider: "openai".to_string(),
            model: Some("openai-ada".to_string()),
            ..Default::default()
        };
        let err = settings.build_embedder().unwrap_err();
        assert!(matches!(err, LLMError::ConfigError(_)));
    }

    #[test]
    fn test_build_embedder_openai_with_key() {
        let settings = EmbeddingSettings {
            provider: "openai".to_string(),
            model: Some("openai-ada".to_string()),
            openai_api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        let embedder = settings.build_embedder().unwrap();
        assert_eq!(embedder.dimensions(), 1536);
    }

    #[test]
    fn test_build_embedder_rejects_unsupported_model() {
        let settings = EmbeddingSettings {
            model: Some("made-up-model".to_string()),
            ..Default::default()
        };
        let err = settings.build_embedder().unwrap_err();
        assert!(matches!(err, LLMError::ConfigError(_)));
    }

    #[test]
    fn test_build_provider_rejects_unknown_provider() {
        let settings = EmbeddingSettings {
            provider: "bedrock".to_string(),
            ..Default::default()
        };
        match settings.build_provider() {
            Err(LLMError::ProviderNotSupported(name)) => assert_eq!(name, "bedrock"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error for an unknown provider"),
        }
    }
}
