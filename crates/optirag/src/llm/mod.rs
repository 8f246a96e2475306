//! Embedding providers
//!
//! Provider trait, OpenAI-shaped request/response types, and the concrete
//! OpenAI/Azure/Ollama backends, plus the fixed-dimension [`Embedder`]
//! handle the router consumes.

pub mod embedder;
pub mod ollama;
pub mod openai;
pub mod provider;
pub mod types;

pub use embedder::{
    embedding_dimension, Embedder, DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_MAX_TOKEN_SIZE, EMBEDDING_MODEL_DIMENSIONS,
};
pub use ollama::{OllamaConfig, OllamaEmbeddings};
pub use openai::{OpenAIConfig, OpenAIEmbeddings};
pub use provider::EmbeddingProvider;
pub use types::{
    EmbeddingData, EmbeddingInput, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage, LLMError,
    LLMResult,
};
