//! Shared types for embedding providers
//!
//! Request/response shapes follow the OpenAI embeddings API, which both
//! OpenAI and the compatible local services (Ollama, vLLM, LocalAI) speak.

use serde::{Deserialize, Serialize};

/// Embedding request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Model name
    pub model: String,
    /// Input text (single string or an array of strings)
    pub input: EmbeddingInput,
    /// Encoding format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
    /// Output dimensions (supported by some models)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    /// User identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl EmbeddingRequest {
    /// Build a request for a single input text.
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: EmbeddingInput::Single(text.into()),
            encoding_format: None,
            dimensions: None,
            user: None,
        }
    }

    /// Build a request for a batch of input texts.
    pub fn batch(model: impl Into<String>, texts: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input: EmbeddingInput::Multiple(texts),
            encoding_format: None,
            dimensions: None,
            user: None,
        }
    }
}

/// Embedding input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    /// Single string
    Single(String),
    /// Array of strings
    Multiple(Vec<String>),
}

impl EmbeddingInput {
    /// Number of input texts.
    pub fn len(&self) -> usize {
        match self {
            EmbeddingInput::Single(_) => 1,
            EmbeddingInput::Multiple(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            EmbeddingInput::Single(s) => s.is_empty(),
            EmbeddingInput::Multiple(v) => v.is_empty(),
        }
    }
}

/// Embedding response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// Object type (always "list")
    pub object: String,
    /// Model name
    pub model: String,
    /// Embedding data, one entry per input text
    pub data: Vec<EmbeddingData>,
    /// Usage statistics
    pub usage: EmbeddingUsage,
}

/// One embedding vector in a response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingData {
    /// Object type (always "embedding")
    pub object: String,
    /// Index of the corresponding input text
    pub index: u32,
    /// Embedding vector
    pub embedding: Vec<f32>,
}

/// Token usage for an embedding request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

/// Errors raised by embedding providers
#[derive(Debug, Clone, thiserror::Error)]
pub enum LLMError {
    /// API error
    #[error("API error: {message} (code: {code:?})")]
    ApiError {
        code: Option<String>,
        message: String,
    },
    /// Authentication error
    #[error("Authentication failed: {0}")]
    AuthError(String),
    /// Rate limit exceeded
    #[error("Rate limited: {0}")]
    RateLimited(String),
    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Provider not supported
    #[error("Provider not supported: {0}")]
    ProviderNotSupported(String),
    /// Other error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Result alias for provider operations
pub type LLMResult<T> = Result<T, LLMError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_input_serializes_as_string() {
        let req = EmbeddingRequest::single("nomic-embed-text", "hello");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["input"], "hello");
        assert_eq!(json["model"], "nomic-embed-text");
        assert!(json.get("dimensions").is_none());
    }

    #[test]
    fn test_batch_input_serializes_as_array() {
        let req = EmbeddingRequest::batch("openai-ada", vec!["a".into(), "b".into()]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["input"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_input_len() {
        assert_eq!(EmbeddingInput::Single("x".into()).len(), 1);
        assert_eq!(
            EmbeddingInput::Multiple(vec!["a".into(), "b".into()]).len(),
            2
        );
        assert!(EmbeddingInput::Multiple(vec![]).is_empty());
    }
}
