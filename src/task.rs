//! Tasks embedded in defect and candidate records.
//!
//! A record owns its `related_tasks` list outright. The list helpers below
//! never mutate their input; each returns a fresh `Vec` so callers can swap
//! it into a draft and observe the change.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::suggest::TaskDraft;

const ULID_TIME_LEN: usize = 10;
const TASK_ID_LEN: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "inprogress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(Error::InvalidArgument(format!(
                "invalid task status '{}': must be pending, in-progress, or completed",
                s.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub owner: String,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
}

impl Task {
    /// Blank task as produced by "add manually".
    pub fn blank(id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            owner: String::new(),
            status: TaskStatus::Pending,
            due_date: today,
        }
    }

    /// Materialize a suggested task. Suggestions always start out pending.
    pub fn from_draft(draft: &TaskDraft, id: impl Into<String>, today: NaiveDate) -> Self {
        let due_date = today
            .checked_add_days(Days::new(u64::from(draft.due_date_offset_days)))
            .unwrap_or(today);
        Self {
            id: id.into(),
            title: draft.title.clone(),
            owner: draft.owner.clone(),
            status: TaskStatus::Pending,
            due_date,
        }
    }
}

/// Editable task columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Owner,
    Status,
    DueDate,
}

impl FromStr for TaskField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "title" => Ok(TaskField::Title),
            "owner" => Ok(TaskField::Owner),
            "status" => Ok(TaskField::Status),
            "due" | "duedate" => Ok(TaskField::DueDate),
            _ => Err(Error::InvalidArgument(format!(
                "unknown task field '{}': must be title, owner, status, or due",
                s.trim()
            ))),
        }
    }
}

/// A typed replacement value for one task column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskUpdate {
    Title(String),
    Owner(String),
    Status(TaskStatus),
    DueDate(NaiveDate),
}

impl TaskUpdate {
    /// Parse a raw value for `field`, validating statuses and dates.
    pub fn parse(field: TaskField, value: &str) -> Result<Self> {
        match field {
            TaskField::Title => Ok(TaskUpdate::Title(value.to_string())),
            TaskField::Owner => Ok(TaskUpdate::Owner(value.to_string())),
            TaskField::Status => Ok(TaskUpdate::Status(value.parse()?)),
            TaskField::DueDate => parse_date(value).map(TaskUpdate::DueDate),
        }
    }

    fn apply(&self, task: &mut Task) {
        match self {
            TaskUpdate::Title(title) => task.title = title.clone(),
            TaskUpdate::Owner(owner) => task.owner = owner.clone(),
            TaskUpdate::Status(status) => task.status = *status,
            TaskUpdate::DueDate(date) => task.due_date = *date,
        }
    }
}

/// Append a blank task with a fresh id. The new task is last.
pub fn add(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    let mut next = tasks.to_vec();
    next.push(Task::blank(generate_task_id(tasks), today));
    next
}

/// Replace one field of the task matching `id`. Unknown ids leave the list as is.
pub fn update(tasks: &[Task], id: &str, change: &TaskUpdate) -> Vec<Task> {
    tasks
        .iter()
        .cloned()
        .map(|mut task| {
            if task.id == id {
                change.apply(&mut task);
            }
            task
        })
        .collect()
}

/// Drop the task matching `id`. Unknown ids leave the list as is.
pub fn remove(tasks: &[Task], id: &str) -> Vec<Task> {
    tasks.iter().filter(|task| task.id != id).cloned().collect()
}

/// Append materialized suggestions after the existing tasks.
pub fn append_suggested(tasks: &[Task], drafts: &[TaskDraft], today: NaiveDate) -> Vec<Task> {
    let mut next = tasks.to_vec();
    for draft in drafts {
        let id = generate_task_id(&next);
        next.push(Task::from_draft(draft, id, today));
    }
    next
}

/// Generate a task id that is not already used in `existing`.
///
/// Ids are taken from the random section of a ULID so that two ids minted in
/// the same millisecond still differ.
pub fn generate_task_id(existing: &[Task]) -> String {
    loop {
        let base = Ulid::new().to_string().to_lowercase();
        let candidate = &base[ULID_TIME_LEN..ULID_TIME_LEN + TASK_ID_LEN];
        if !existing.iter().any(|task| task.id == candidate) {
            return candidate.to_string();
        }
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| {
        Error::InvalidArgument(format!("invalid date '{}' (expected YYYY-MM-DD): {err}", value.trim()))
    })
}

/// Lowercase and drop separators so `In Progress`, `in_progress` and
/// `in-progress` compare equal.
pub(crate) fn normalize_label(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}
