//! Ollama embedding provider (thin wrapper over the OpenAI-compatible API)

use super::openai::{OpenAIConfig, OpenAIEmbeddings};
use super::provider::EmbeddingProvider;
use super::types::*;
use async_trait::async_trait;

/// Ollama provider configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL (default: http://localhost:11434/v1)
    pub base_url: String,
    /// Default embedding model, e.g. nomic-embed-text
    pub default_model: String,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            default_model: "nomic-embed-text".to_string(),
            timeout_secs: 60,
        }
    }
}

impl OllamaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(model) = std::env::var("OLLAMA_EMBEDDING_MODEL") {
            cfg.default_model = model;
        }
        if let Ok(base_url) = std::env::var("OLLAMA_BASE_URL") {
            let base = base_url.trim_end_matches('/');
            cfg.base_url = if base.ends_with("/v1") {
                base.to_string()
            } else {
                format!("{}/v1", base)
            };
        }
        cfg
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Ollama provider (delegates to an inner `OpenAIEmbeddings`)
pub struct OllamaEmbeddings {
    inner: OpenAIEmbeddings,
}

impl Default for OllamaEmbeddings {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaEmbeddings {
    /// Create a provider with the default localhost endpoint and model.
    pub fn new() -> Self {
        Self::with_config(OllamaConfig::new())
    }

    /// Create a provider reading `OLLAMA_BASE_URL` and
    /// `OLLAMA_EMBEDDING_MODEL` from the environment.
    pub fn from_env() -> Self {
        Self::with_config(OllamaConfig::from_env())
    }

    /// Create a provider from an explicit `OllamaConfig`.
    pub fn with_config(config: OllamaConfig) -> Self {
        let openai_config = OpenAIConfig::new("not-needed")
            .with_base_url(&config.base_url)
            .with_model(&config.default_model)
            .with_timeout(config.timeout_secs);
        Self {
            inner: OpenAIEmbeddings::with_config(openai_config),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    fn name(&self) -> &str {
        "ollama"
    }

    fn default_model(&self) -> &str {
        self.inner.default_model()
    }

    async fn embed(&self, request: EmbeddingRequest) -> LLMResult<EmbeddingResponse> {
        self.inner.embed(request).await
    }

    async fn health_check(&self) -> LLMResult<bool> {
        // Ollama needs no API key
        Ok(true)
    }
}
