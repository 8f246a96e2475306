//! OpenAI embedding provider
//!
//! Uses the `async-openai` crate to talk to the embeddings API.
//!
//! # Supported services
//!
//! - OpenAI API (api.openai.com)
//! - Azure OpenAI
//! - OpenAI-compatible local services (Ollama, vLLM, LocalAI, etc.)
//!
//! # Examples
//!
//! ```rust,ignore
//! use optirag::llm::openai::{OpenAIEmbeddings, OpenAIConfig};
//!
//! // OpenAI
//! let provider = OpenAIEmbeddings::new("sk-xxx");
//!
//! // Custom endpoint
//! let provider = OpenAIEmbeddings::with_config(
//!     OpenAIConfig::new("sk-xxx")
//!         .with_base_url("http://localhost:11434/v1")
//!         .with_model("nomic-embed-text"),
//! );
//!
//! // Azure OpenAI
//! let provider = OpenAIEmbeddings::azure("https://xxx.openai.azure.com", "api-key", "embedding-model");
//! ```

use super::provider::EmbeddingProvider;
use super::types::*;
use async_openai::{
    config::OpenAIConfig as AsyncOpenAIConfig, types::CreateEmbeddingRequestArgs, Client,
};
use async_trait::async_trait;

/// OpenAI provider configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key
    pub api_key: String,
    /// API base URL
    pub base_url: Option<String>,
    /// Organization ID
    pub org_id: Option<String>,
    /// Default embedding model
    pub default_model: String,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            org_id: None,
            default_model: "text-embedding-ada-002".to_string(),
            timeout_secs: 60,
        }
    }
}

impl OpenAIConfig {
    /// Create a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Create a configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_BASE_URL").ok(),
            default_model: std::env::var("OPENAI_EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-ada-002".to_string()),
            ..Default::default()
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// OpenAI embedding provider
///
/// Supports the OpenAI API and compatible services.
pub struct OpenAIEmbeddings {
    client: Client<AsyncOpenAIConfig>,
    config: OpenAIConfig,
}

impl OpenAIEmbeddings {
    /// Create a provider using an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    /// Create a provider from environment variables.
    pub fn from_env() -> Self {
        Self::with_config(OpenAIConfig::from_env())
    }

    /// Create a provider from an explicit configuration.
    pub fn with_config(config: OpenAIConfig) -> Self {
        let mut openai_config = AsyncOpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(ref base_url) = config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        if let Some(ref org_id) = config.org_id {
            openai_config = openai_config.with_org_id(org_id);
        }

        let client = Client::with_config(openai_config);

        Self { client, config }
    }

    /// Create an Azure OpenAI provider.
    pub fn azure(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into();
        let deployment = deployment.into();

        // Azure OpenAI uses a deployment-scoped URL
        let base_url = format!(
            "{}/openai/deployments/{}",
            endpoint.trim_end_matches('/'),
            deployment
        );

        let config = OpenAIConfig::new(api_key)
            .with_base_url(base_url)
            .with_model(deployment);

        Self::with_config(config)
    }

    /// Create a provider for a local OpenAI-compatible service.
    pub fn local(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new("not-needed")
            .with_base_url(base_url)
            .with_model(model);

        Self::with_config(config)
    }

    /// Get the underlying async-openai client.
    pub fn client(&self) -> &Client<AsyncOpenAIConfig> {
        &self.client
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Convert an async-openai error into an `LLMError`.
    fn convert_error(err: async_openai::error::OpenAIError) -> LLMError {
        match err {
            async_openai::error::OpenAIError::ApiError(api_err) => {
                let code = api_err.code.clone();
                let message = api_err.message.clone();

                if message.contains("rate limit") {
                    LLMError::RateLimited(message)
                } else if message.contains("model") && message.contains("not found") {
                    LLMError::ModelNotFound(message)
                } else if message.contains("api key") || message.contains("authentication") {
                    LLMError::AuthError(message)
                } else {
                    LLMError::ApiError { code, message }
                }
            }
            async_openai::error::OpenAIError::Reqwest(e) => {
                if e.is_timeout() {
                    LLMError::Timeout(e.to_string())
                } else {
                    LLMError::NetworkError(e.to_string())
                }
            }
            async_openai::error::OpenAIError::InvalidArgument(msg) => LLMError::ConfigError(msg),
            _ => LLMError::Other(err.to_string()),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    async fn embed(&self, request: EmbeddingRequest) -> LLMResult<EmbeddingResponse> {
        let input = match request.input {
            EmbeddingInput::Single(s) => vec![s],
            EmbeddingInput::Multiple(v) => v,
        };

        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model
        };

        let openai_request = CreateEmbeddingRequestArgs::default()
            .model(&model)
            .input(input)
            .build()
            .map_err(|e| LLMError::ConfigError(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(openai_request)
            .await
            .map_err(Self::convert_error)?;

        let data: Vec<EmbeddingData> = response
            .data
            .into_iter()
            .map(|d| EmbeddingData {
                object: "embedding".to_string(),
                index: d.index,
                embedding: d.embedding,
            })
            .collect();

        Ok(EmbeddingResponse {
            object: "list".to_string(),
            model: response.model,
            data,
            usage: EmbeddingUsage {
                prompt_tokens: response.usage.prompt_tokens,
                total_tokens: response.usage.total_tokens,
            },
        })
    }

    async fn health_check(&self) -> LLMResult<bool> {
        Ok(!self.config.api_key.is_empty())
    }
}
