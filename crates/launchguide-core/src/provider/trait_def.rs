//! The `ModelProvider` trait -- the adapter interface for text-generation
//! services.
//!
//! Each concrete provider (an OpenAI-compatible endpoint, the offline
//! fallback) implements this trait. The trait is object-safe so providers can
//! be stored as `Arc<dyn ModelProvider>` in the [`super::ProviderRegistry`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rendered prompt plus the JSON Schema the response must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredPrompt {
    /// What the prompt is about (the channel name). Used for logging and by
    /// providers that do not read the prompt text.
    pub label: String,
    /// Full prompt text sent to the model.
    pub prompt: String,
    /// Schema identifier passed to providers that name their schemas.
    pub schema_name: String,
    /// JSON Schema of the expected response object.
    pub schema: serde_json::Value,
}

/// Errors reported by a model provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to model provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model provider response has no content")]
    MissingContent,

    #[error("model provider content is not valid JSON: {0}")]
    MalformedContent(#[source] serde_json::Error),

    #[error("model provider unavailable: {0}")]
    Unavailable(String),
}

/// Adapter interface for structured text generation.
///
/// Implementors send the prompt to a model configured to answer with a JSON
/// object matching `prompt.schema`, and return that object unvalidated.
/// Validation against the schema is the caller's job.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Short name for this provider (e.g. "openai").
    fn name(&self) -> &str;

    /// Submit a prompt and return the model's structured answer.
    async fn complete(&self, prompt: &StructuredPrompt) -> Result<serde_json::Value, ProviderError>;
}

// Compile-time assertion: ModelProvider must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ModelProvider) {}
};
