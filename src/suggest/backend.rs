use async_trait::async_trait;
use serde_json::Value;

use super::SuggestError;

/// One call to the text generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    /// When set, the service is asked for JSON matching this schema.
    pub schema: Option<Value>,
}

/// The external generative text service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Whether a credential is available. Without one no request may be sent.
    fn has_credential(&self) -> bool;

    /// Execute a request and return the raw response text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, SuggestError>;
}
