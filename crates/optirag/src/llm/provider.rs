//! Embedding provider trait
//!
//! All embedding backends (OpenAI, Azure OpenAI, Ollama, compatible local
//! services) implement this trait. The router and the RAG pipeline only see
//! the trait, so backends can be swapped through configuration.

use super::types::*;
use async_trait::async_trait;

/// Embedding provider trait
///
/// # Example
///
/// ```rust,ignore
/// use optirag::llm::{EmbeddingProvider, EmbeddingRequest, LLMResult};
///
/// struct MyProvider;
///
/// #[async_trait::async_trait]
/// impl EmbeddingProvider for MyProvider {
///     fn name(&self) -> &str {
///         "my-provider"
///     }
///
///     async fn embed(&self, request: EmbeddingRequest) -> LLMResult<EmbeddingResponse> {
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get provider name
    fn name(&self) -> &str;

    /// Get default model
    fn default_model(&self) -> &str {
        ""
    }

    /// Get list of supported models
    fn supported_models(&self) -> Vec<&str> {
        vec![]
    }

    /// Check if a model is supported
    fn supports_model(&self, model: &str) -> bool {
        self.supported_models().contains(&model)
    }

    /// Send an embedding request
    async fn embed(&self, request: EmbeddingRequest) -> LLMResult<EmbeddingResponse>;

    /// Health check
    async fn health_check(&self) -> LLMResult<bool> {
        Ok(true)
    }
}
