//! Failures of a single suggestion request.
//!
//! None of these reach the user: the client folds every variant into the
//! fallback value of the operation that was running.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuggestError {
    /// No API credential was configured; no request was sent.
    #[error("API credential missing")]
    MissingCredential,
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),
    /// The service answered 429.
    #[error("Rate limit exceeded")]
    RateLimited,
    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// The bounded wait expired.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),
    /// The payload did not match what was asked for.
    #[error("Malformed response: {0}")]
    Decode(String),
    /// The service returned no text at all.
    #[error("Empty response")]
    EmptyResponse,
}

impl SuggestError {
    /// Short stable name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            SuggestError::MissingCredential => "missing_credential",
            SuggestError::Network(_) => "network",
            SuggestError::RateLimited => "rate_limited",
            SuggestError::Http { .. } => "http",
            SuggestError::Timeout(_) => "timeout",
            SuggestError::Decode(_) => "decode",
            SuggestError::EmptyResponse => "empty_response",
        }
    }
}
