//! Record editor.
//!
//! A [`Draft`] is a working copy of one record. It is opened from a store
//! (copy of an existing record, or a blank record with a freshly allocated id),
//! edited freely, and then either committed back or discarded.
//!
//! Suggestions run in three steps so the draft is never borrowed across an
//! await: [`Editor::request_category`] / [`Editor::request_tasks`] capture the
//! draft key and input, [`PendingSuggestion::run`] calls the service, and
//! [`Editor::resolve`] merges the result if the same draft is still open.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::record::{DefectCategory, Domain, Record};
use crate::store::{CommitOutcome, RecordStore};
use crate::suggest::{SuggestionClient, TaskDraft};
use crate::task::{self, TaskUpdate};

#[derive(Debug, Clone, PartialEq)]
pub struct Draft<R: Record> {
    key: Uuid,
    existing: bool,
    record: R,
}

impl<R: Record> Draft<R> {
    /// Identity of this editing session. Two drafts of the same record have
    /// different keys.
    pub fn key(&self) -> Uuid {
        self.key
    }

    /// False when the draft was opened for a new record.
    pub fn is_existing(&self) -> bool {
        self.existing
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut R {
        &mut self.record
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        self.record.set_field(field, value)
    }

    /// Append a blank task due `today` and return its id.
    pub fn add_task(&mut self, today: NaiveDate) -> String {
        let tasks = task::add(self.record.tasks(), today);
        let id = tasks.last().map(|task| task.id.clone()).unwrap_or_default();
        self.record.set_tasks(tasks);
        id
    }

    /// Change one field of task `id`. Returns false, leaving the list as is,
    /// when no task has that id.
    pub fn update_task(&mut self, id: &str, change: &TaskUpdate) -> bool {
        if !self.has_task(id) {
            return false;
        }
        let tasks = task::update(self.record.tasks(), id, change);
        self.record.set_tasks(tasks);
        true
    }

    /// Remove task `id`. Returns false when no task has that id.
    pub fn remove_task(&mut self, id: &str) -> bool {
        if !self.has_task(id) {
            return false;
        }
        let tasks = task::remove(self.record.tasks(), id);
        self.record.set_tasks(tasks);
        true
    }

    /// Append suggested tasks after the existing ones. Returns how many were added.
    pub fn append_suggested_tasks(&mut self, drafts: &[TaskDraft], today: NaiveDate) -> usize {
        if drafts.is_empty() {
            return 0;
        }
        let tasks = task::append_suggested(self.record.tasks(), drafts, today);
        self.record.set_tasks(tasks);
        drafts.len()
    }

    fn has_task(&self, id: &str) -> bool {
        self.record.tasks().iter().any(|task| task.id == id)
    }
}

/// Open a draft dated today. See [`open_on`].
pub fn open<R: Record>(store: &mut RecordStore<R>, existing: Option<&str>) -> Result<Draft<R>> {
    open_on(store, existing, task::today())
}

/// Open a draft: a copy of the record with id `existing`, or a blank record
/// with the next id from the store's counter.
pub fn open_on<R: Record>(
    store: &mut RecordStore<R>,
    existing: Option<&str>,
    today: NaiveDate,
) -> Result<Draft<R>> {
    let (record, existing) = match existing {
        Some(id) => {
            let record = store
                .get(id)
                .cloned()
                .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
            (record, true)
        }
        None => (R::blank(store.allocate_id(), today), false),
    };
    let draft = Draft {
        key: Uuid::new_v4(),
        existing,
        record,
    };
    tracing::debug!(
        domain = %R::DOMAIN,
        id = draft.record.id(),
        key = %draft.key,
        existing = draft.existing,
        "draft opened"
    );
    Ok(draft)
}

/// Write the draft into the store: replace by id, or insert as newest.
pub fn commit<R: Record>(draft: Draft<R>, store: &mut RecordStore<R>) -> CommitOutcome {
    let id = draft.record.id().to_string();
    let outcome = store.commit(draft.record);
    tracing::debug!(domain = %R::DOMAIN, id = %id, ?outcome, "draft committed");
    outcome
}

/// Drop the draft without touching any store.
pub fn discard<R: Record>(draft: Draft<R>) {
    tracing::debug!(domain = %R::DOMAIN, id = draft.record.id(), key = %draft.key, "draft discarded");
}

/// Classify `description` and store the result as the draft's category.
pub async fn apply_category_suggestion<R: Record>(
    draft: &mut Draft<R>,
    client: &SuggestionClient,
    description: &str,
) -> DefectCategory {
    let category = client.classify(description).await;
    draft.record.set_category(category);
    category
}

/// Ask for follow-up tasks and append them to the draft. Existing tasks are kept.
pub async fn apply_task_suggestions<R: Record>(
    draft: &mut Draft<R>,
    client: &SuggestionClient,
    context: &str,
    domain: Domain,
) -> usize {
    let drafts = client.suggest_tasks(context, domain).await;
    draft.append_suggested_tasks(&drafts, task::today())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Category,
    Tasks,
}

/// A suggestion captured from a draft, ready to run without borrowing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSuggestion {
    pub draft_key: Uuid,
    pub kind: SuggestionKind,
    pub domain: Domain,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionResult {
    Category(DefectCategory),
    Tasks(Vec<TaskDraft>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSuggestion {
    pub draft_key: Uuid,
    pub kind: SuggestionKind,
    pub result: SuggestionResult,
}

impl PendingSuggestion {
    pub async fn run(self, client: &SuggestionClient) -> ResolvedSuggestion {
        let result = match self.kind {
            SuggestionKind::Category => SuggestionResult::Category(client.classify(&self.input).await),
            SuggestionKind::Tasks => {
                SuggestionResult::Tasks(client.suggest_tasks(&self.input, self.domain).await)
            }
        };
        ResolvedSuggestion {
            draft_key: self.draft_key,
            kind: self.kind,
            result,
        }
    }
}

/// How a resolved suggestion was merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeOutcome {
    Category { category: DefectCategory },
    Tasks { added: usize },
    /// The draft the suggestion was made for is no longer open.
    Stale,
}

/// Why a suggestion request was not issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Refusal {
    /// A suggestion of the same kind is already running for this draft.
    Busy,
    /// The draft has no text to base a suggestion on.
    BlankInput,
    /// The record kind has no category.
    Unsupported,
}

/// One store plus at most one open draft.
#[derive(Debug, Clone)]
pub struct Editor<R: Record> {
    store: RecordStore<R>,
    draft: Option<Draft<R>>,
    pending: HashSet<(Uuid, SuggestionKind)>,
}

impl<R: Record> Editor<R> {
    pub fn new(store: RecordStore<R>) -> Self {
        Self {
            store,
            draft: None,
            pending: HashSet::new(),
        }
    }

    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    pub fn draft(&self) -> Option<&Draft<R>> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Result<&mut Draft<R>> {
        self.draft.as_mut().ok_or(Error::NoDraft)
    }

    /// Open a draft, discarding any draft already open.
    pub fn open(&mut self, existing: Option<&str>) -> Result<&Draft<R>> {
        let draft = open(&mut self.store, existing)?;
        if let Some(previous) = self.close() {
            discard(previous);
        }
        let draft = self.draft.insert(draft);
        Ok(&*draft)
    }

    pub fn save(&mut self) -> Result<CommitOutcome> {
        let draft = self.close().ok_or(Error::NoDraft)?;
        Ok(commit(draft, &mut self.store))
    }

    pub fn cancel(&mut self) -> Result<()> {
        let draft = self.close().ok_or(Error::NoDraft)?;
        discard(draft);
        Ok(())
    }

    /// Take the open draft and forget its in-flight suggestions.
    fn close(&mut self) -> Option<Draft<R>> {
        let draft = self.draft.take()?;
        self.pending.retain(|(key, _)| *key != draft.key);
        Some(draft)
    }

    /// Whether a suggestion of `kind` is running for the open draft.
    pub fn is_busy(&self, kind: SuggestionKind) -> bool {
        self.draft
            .as_ref()
            .is_some_and(|draft| self.pending.contains(&(draft.key, kind)))
    }

    pub fn request_category(&mut self) -> Result<std::result::Result<PendingSuggestion, Refusal>> {
        let draft = self.draft.as_ref().ok_or(Error::NoDraft)?;
        if R::DOMAIN != Domain::Defect {
            return Ok(Err(Refusal::Unsupported));
        }
        let input = draft.record.suggestion_context();
        Ok(self.begin(SuggestionKind::Category, input))
    }

    pub fn request_tasks(&mut self) -> Result<std::result::Result<PendingSuggestion, Refusal>> {
        let draft = self.draft.as_ref().ok_or(Error::NoDraft)?;
        let input = draft.record.suggestion_context();
        Ok(self.begin(SuggestionKind::Tasks, input))
    }

    fn begin(&mut self, kind: SuggestionKind, input: String) -> std::result::Result<PendingSuggestion, Refusal> {
        let Some(draft) = self.draft.as_ref() else {
            return Err(Refusal::BlankInput);
        };
        if input.trim().is_empty() {
            return Err(Refusal::BlankInput);
        }
        if !self.pending.insert((draft.key, kind)) {
            return Err(Refusal::Busy);
        }
        tracing::debug!(key = %draft.key, ?kind, "suggestion requested");
        Ok(PendingSuggestion {
            draft_key: draft.key,
            kind,
            domain: R::DOMAIN,
            input,
        })
    }

    /// Merge a finished suggestion into the open draft. Results for a draft
    /// that was saved, cancelled or replaced are dropped.
    pub fn resolve(&mut self, resolved: ResolvedSuggestion) -> MergeOutcome {
        self.pending.remove(&(resolved.draft_key, resolved.kind));
        let Some(draft) = self.draft.as_mut().filter(|draft| draft.key == resolved.draft_key) else {
            tracing::debug!(key = %resolved.draft_key, kind = ?resolved.kind, "stale suggestion dropped");
            return MergeOutcome::Stale;
        };
        match resolved.result {
            SuggestionResult::Category(category) => {
                draft.record.set_category(category);
                MergeOutcome::Category { category }
            }
            SuggestionResult::Tasks(drafts) => MergeOutcome::Tasks {
                added: draft.append_suggested_tasks(&drafts, task::today()),
            },
        }
    }

    /// Request, run and resolve a category suggestion in one go.
    pub async fn suggest_category(
        &mut self,
        client: &SuggestionClient,
    ) -> Result<std::result::Result<MergeOutcome, Refusal>> {
        match self.request_category()? {
            Ok(pending) => {
                let resolved = pending.run(client).await;
                Ok(Ok(self.resolve(resolved)))
            }
            Err(refusal) => Ok(Err(refusal)),
        }
    }

    /// Request, run and resolve a task suggestion in one go.
    pub async fn suggest_tasks(
        &mut self,
        client: &SuggestionClient,
    ) -> Result<std::result::Result<MergeOutcome, Refusal>> {
        match self.request_tasks()? {
            Ok(pending) => {
                let resolved = pending.run(client).await;
                Ok(Ok(self.resolve(resolved)))
            }
            Err(refusal) => Ok(Err(refusal)),
        }
    }
}
