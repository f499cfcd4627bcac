//! AI-assisted field suggestions.
//!
//! `SuggestionClient` wraps a [`CompletionBackend`] with three fixed prompts.
//! Every operation is best effort: a missing credential, a transport error, a
//! timeout or an unreadable payload all produce the operation's fallback
//! value, never an error. Without a credential no request is sent.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{Config, TasksConfig};
use crate::error::{Error, Result};
use crate::record::{DefectCategory, Domain};

mod backend;
mod error;
mod gemini;
pub mod prompt;

pub use backend::{CompletionBackend, CompletionRequest};
pub use error::SuggestError;
pub use gemini::GeminiBackend;

/// Shown in place of a document when no credential is configured.
pub const DOC_MISSING_KEY: &str =
    "## API Key Missing\nPlease provide an API Key to generate the documentation.";
/// Shown in place of a document when the request failed.
pub const DOC_FAILED: &str = "Error generating documentation. Please try again.";
/// Shown in place of a document when the service answered with nothing.
pub const DOC_EMPTY: &str = "Failed to generate documentation.";

/// A suggested task before it is given an id and a due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub owner: String,
    pub due_date_offset_days: u32,
}

#[derive(Clone)]
pub struct SuggestionClient {
    backend: Arc<dyn CompletionBackend>,
    model: String,
    timeout: Duration,
    defaults: TasksConfig,
}

#[derive(Deserialize)]
struct CategoryReply {
    category: Option<String>,
}

impl SuggestionClient {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        model: impl Into<String>,
        timeout: Duration,
        defaults: TasksConfig,
    ) -> Self {
        Self {
            backend,
            model: model.into(),
            timeout,
            defaults,
        }
    }

    /// Build the Gemini-backed client, reading the credential from the
    /// environment variable named in `suggest.api_key_env`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = std::env::var(config.suggest.api_key_env.trim())
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(|raw| SecretString::new(raw.into_boxed_str()));
        if api_key.is_none() {
            tracing::debug!(
                env = %config.suggest.api_key_env,
                "no suggestion credential; suggestions will use fallbacks"
            );
        }
        let backend = GeminiBackend::new(&config.suggest, api_key)
            .map_err(|err| Error::OperationFailed(err.to_string()))?;
        Ok(Self::new(
            Arc::new(backend),
            config.suggest.model.trim(),
            Duration::from_millis(config.suggest.timeout_ms),
            config.tasks.clone(),
        ))
    }

    pub fn has_credential(&self) -> bool {
        self.backend.has_credential()
    }

    /// Pick a defect category for `description`. Falls back to `Other`.
    pub async fn classify(&self, description: &str) -> DefectCategory {
        match self.try_classify(description).await {
            Ok(category) => category,
            Err(err) => {
                log_fallback("classify", &err);
                DefectCategory::Other
            }
        }
    }

    pub async fn try_classify(&self, description: &str) -> std::result::Result<DefectCategory, SuggestError> {
        let text = self
            .call(prompt::classify(description), Some(prompt::classify_schema()))
            .await?;
        decode_category(&text)
    }

    /// Ask for follow-up tasks. Falls back to no suggestions.
    pub async fn suggest_tasks(&self, context: &str, domain: Domain) -> Vec<TaskDraft> {
        match self.try_suggest_tasks(context, domain).await {
            Ok(drafts) => drafts,
            Err(err) => {
                log_fallback("suggest_tasks", &err);
                Vec::new()
            }
        }
    }

    pub async fn try_suggest_tasks(
        &self,
        context: &str,
        domain: Domain,
    ) -> std::result::Result<Vec<TaskDraft>, SuggestError> {
        let text = self
            .call(prompt::suggest_tasks(context, domain), Some(prompt::tasks_schema()))
            .await?;
        decode_task_drafts(&text, self.default_owner(domain), self.defaults.default_offset_days)
    }

    /// Draft a markdown design document. Failures come back as readable text
    /// since the result is displayed as is.
    pub async fn draft_document(&self, subject: &str, details: &str) -> String {
        match self.call(prompt::document(subject, details), None).await {
            Ok(text) => text,
            Err(SuggestError::MissingCredential) => DOC_MISSING_KEY.to_string(),
            Err(SuggestError::EmptyResponse) => {
                log_fallback("draft_document", &SuggestError::EmptyResponse);
                DOC_EMPTY.to_string()
            }
            Err(err) => {
                log_fallback("draft_document", &err);
                DOC_FAILED.to_string()
            }
        }
    }

    fn default_owner(&self, domain: Domain) -> &str {
        match domain {
            Domain::Defect => &self.defaults.defect_owner,
            Domain::Recruitment => &self.defaults.recruitment_owner,
        }
    }

    async fn call(
        &self,
        prompt: String,
        schema: Option<Value>,
    ) -> std::result::Result<String, SuggestError> {
        if !self.backend.has_credential() {
            return Err(SuggestError::MissingCredential);
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt,
            schema,
        };
        tracing::debug!(model = %request.model, structured = request.schema.is_some(), "suggestion request");

        let text = tokio::time::timeout(self.timeout, self.backend.complete(request))
            .await
            .map_err(|_| SuggestError::Timeout(self.timeout.as_millis() as u64))??;
        if text.trim().is_empty() {
            return Err(SuggestError::EmptyResponse);
        }
        Ok(text)
    }
}

impl std::fmt::Debug for SuggestionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionClient")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("has_credential", &self.has_credential())
            .finish()
    }
}

fn log_fallback(operation: &'static str, err: &SuggestError) {
    match err {
        SuggestError::MissingCredential => {
            tracing::debug!(operation, "suggestion skipped: no credential");
        }
        _ => tracing::warn!(operation, kind = err.kind(), error = %err, "suggestion failed; using fallback"),
    }
}

/// Decode `{"category": "..."}`. Labels outside the closed set map to `Other`.
pub fn decode_category(text: &str) -> std::result::Result<DefectCategory, SuggestError> {
    let reply: CategoryReply = serde_json::from_str(strip_code_fence(text))
        .map_err(|err| SuggestError::Decode(format!("category reply: {err}")))?;
    let label = reply
        .category
        .ok_or_else(|| SuggestError::Decode("category field missing".to_string()))?;
    Ok(DefectCategory::from_label(&label).unwrap_or_else(|| {
        tracing::debug!(label = %label, "unknown category label");
        DefectCategory::Other
    }))
}

/// Decode an array of `{title, owner, dueDateOffset}` objects.
///
/// Entries that are not objects or have no title are skipped. A missing or
/// blank owner becomes `default_owner`; a missing, negative or non-numeric
/// offset becomes `default_offset`. Fractional offsets round to whole days.
pub fn decode_task_drafts(
    text: &str,
    default_owner: &str,
    default_offset: u32,
) -> std::result::Result<Vec<TaskDraft>, SuggestError> {
    let value: Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|err| SuggestError::Decode(format!("task reply: {err}")))?;
    let items = value
        .as_array()
        .ok_or_else(|| SuggestError::Decode("task reply is not an array".to_string()))?;

    Ok(items
        .iter()
        .filter_map(|item| {
            let item = item.as_object()?;
            let title = item.get("title")?.as_str()?.trim();
            if title.is_empty() {
                return None;
            }
            let owner = item
                .get("owner")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|owner| !owner.is_empty())
                .unwrap_or(default_owner);
            let offset = item
                .get("dueDateOffset")
                .and_then(Value::as_f64)
                .filter(|days| days.is_finite() && *days >= 0.0)
                .map(|days| days.round().min(f64::from(u32::MAX)) as u32)
                .unwrap_or(default_offset);
            Some(TaskDraft {
                title: title.to_string(),
                owner: owner.to_string(),
                due_date_offset_days: offset,
            })
        })
        .collect())
}

/// Accept JSON wrapped in a markdown code fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
