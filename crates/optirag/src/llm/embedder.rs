//! Fixed-dimension embedding handle
//!
//! Wraps an [`EmbeddingProvider`] together with the model name and the
//! dimensionality that model produces. The dimensionality is looked up from
//! a known-models table at construction, so an unsupported model fails as a
//! configuration error before any request is made, and every returned vector
//! is checked against the expected dimension.

use super::provider::EmbeddingProvider;
use super::types::*;
use std::sync::Arc;
use tracing::info;

/// Known embedding models and the dimension each produces.
pub const EMBEDDING_MODEL_DIMENSIONS: &[(&str, usize)] = &[
    ("nomic-embed-text", 768),
    ("openai-ada", 1536),
    ("azure-openai", 1536),
];

/// Default embedding model when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
/// Default embedding dimension (matches the default model).
pub const DEFAULT_EMBEDDING_DIM: usize = 768;
/// Maximum input size the embedding path accepts, in tokens.
pub const DEFAULT_MAX_TOKEN_SIZE: usize = 8192;

/// Look up the output dimension of a known embedding model.
pub fn embedding_dimension(model: &str) -> Option<usize> {
    EMBEDDING_MODEL_DIMENSIONS
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, dim)| *dim)
}

/// An embedding provider bound to one model with a fixed output dimension.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    dimensions: usize,
    max_token_size: usize,
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("max_token_size", &self.max_token_size)
            .finish()
    }
}

impl Embedder {
    /// Bind a provider to a known model.
    ///
    /// Returns a configuration error if the model is not in the
    /// known-models table.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model: impl Into<String>) -> LLMResult<Self> {
        let model = model.into();
        let dimensions = embedding_dimension(&model)
            .ok_or_else(|| LLMError::ConfigError(format!("Unsupported embedding model: {model}")))?;

        info!(
            model = %model,
            dimensions,
            provider = provider.name(),
            "initialized embedder"
        );

        Ok(Self {
            provider,
            model,
            dimensions,
            max_token_size: DEFAULT_MAX_TOKEN_SIZE,
        })
    }

    /// Bind a provider to the default model (`nomic-embed-text`, 768 dims).
    pub fn with_default_model(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIM,
            max_token_size: DEFAULT_MAX_TOKEN_SIZE,
        }
    }

    /// Bind a provider to a model outside the known-models table, stating
    /// its output dimension explicitly.
    pub fn with_dimensions(
        provider: Arc<dyn EmbeddingProvider>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            dimensions,
            max_token_size: DEFAULT_MAX_TOKEN_SIZE,
        }
    }

    /// The model this embedder calls.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The dimension every returned vector has.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Maximum accepted input size in tokens.
    pub fn max_token_size(&self) -> usize {
        self.max_token_size
    }

    /// Embed a batch of texts, one vector per text.
    pub async fn embed(&self, texts: Vec<String>) -> LLMResult<Vec<Vec<f32>>> {
        let response = self
            .provider
            .embed(EmbeddingRequest::batch(&self.model, texts))
            .await?;

        let mut vectors = Vec::with_capacity(response.data.len());
        for data in response.data {
            self.check_dimension(&data.embedding)?;
            vectors.push(data.embedding);
        }
        Ok(vectors)
    }

    /// Embed a single text and return its vector.
    ///
    /// An empty response from the provider is an error, not an empty vector.
    pub async fn embed_one(&self, text: &str) -> LLMResult<Vec<f32>> {
        let response = self
            .provider
            .embed(EmbeddingRequest::single(&self.model, text))
            .await?;

        let data = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::Other("provider returned no embedding data".to_string()))?;

        self.check_dimension(&data.embedding)?;
        Ok(data.embedding)
    }

    fn check_dimension(&self, vector: &[f32]) -> LLMResult<()> {
        if vector.len() != self.dimensions {
            return Err(LLMError::ConfigError(format!(
                "model '{}' returned a {}-dimensional vector, expected {}",
                self.model,
                vector.len(),
                self.dimensions
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedProvider {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn embed(&self, request: EmbeddingRequest) -> LLMResult<EmbeddingResponse> {
            let n = request.input.len();
            let data = (0..n)
                .map(|i| EmbeddingData {
                    object: "embedding".to_string(),
                    index: i as u32,
                    embedding: self.vector.clone(),
                })
                .collect();
            Ok(EmbeddingResponse {
                object: "list".to_string(),
                model: request.model,
                data,
                usage: EmbeddingUsage::default(),
            })
        }
    }

    #[test]
    fn test_dimension_table() {
        assert_eq!(embedding_dimension("nomic-embed-text"), Some(768));
        assert_eq!(embedding_dimension("openai-ada"), Some(1536));
        assert_eq!(embedding_dimension("azure-openai"), Some(1536));
        assert_eq!(embedding_dimension("made-up-model"), None);
    }

    #[test]
    fn test_unsupported_model_is_config_error() {
        let provider = Arc::new(FixedProvider { vector: vec![] });
        let err = Embedder::new(provider, "made-up-model").unwrap_err();
        assert!(matches!(err, LLMError::ConfigError(_)));
    }

    #[test]
    fn test_debug_shows_model_and_provider() {
        let provider = Arc::new(FixedProvider { vector: vec![] });
        let embedder = Embedder::new(provider, "nomic-embed-text").unwrap();
        let rendered = format!("{embedder:?}");
        assert!(rendered.contains("nomic-embed-text"));
        assert!(rendered.contains("fixed"));
    }

    #[tokio::test]
    async fn test_embed_one_flattens_single_result() {
        let provider = Arc::new(FixedProvider {
            vector: vec![0.5; 768],
        });
        let embedder = Embedder::new(provider, "nomic-embed-text").unwrap();
        let vector = embedder.embed_one("hello").await.unwrap();
        assert_eq!(vector.len(), 768);
    }

    #[tokio::test]
    async fn test_embed_one_rejects_wrong_dimension() {
        let provider = Arc::new(FixedProvider {
            vector: vec![0.5; 4],
        });
        let embedder = Embedder::new(provider, "nomic-embed-text").unwrap();
        let err = embedder.embed_one("hello").await.unwrap_err();
        assert!(matches!(err, LLMError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_embed_batch_counts() {
        let provider = Arc::new(FixedProvider {
            vector: vec![0.0; 768],
        });
        let embedder = Embedder::new(provider, "nomic-embed-text").unwrap();
        let vectors = embedder
            .embed(vec!["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 3);
    }
}
