//! Defect and candidate records.
//!
//! Every enumerated field is a closed enum. Labels match what users see
//! (`In Progress`, `Functional Bugs`, ...) and parsing accepts them
//! case-insensitively with or without separators.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::{normalize_label, parse_date, Task};

/// Which workflow a record or suggestion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Defect,
    Recruitment,
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "defect" | "defects" => Ok(Domain::Defect),
            "recruitment" | "candidate" | "candidates" => Ok(Domain::Recruitment),
            _ => Err(Error::InvalidArgument(format!(
                "invalid domain '{}': must be defect or recruitment",
                s.trim()
            ))),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Defect => f.write_str("defect"),
            Domain::Recruitment => f.write_str("recruitment"),
        }
    }
}

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($variant:ident => $label:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Exact match against the display labels, as returned by the
            /// suggestion service.
            pub fn from_label(label: &str) -> Option<Self> {
                let trimmed = label.trim();
                Self::ALL.iter().copied().find(|value| value.label() == trimmed)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = normalize_label(s);
                $(
                    if wanted == normalize_label($label) $(|| wanted == $alias)* {
                        return Ok($name::$variant);
                    }
                )+
                let choices: Vec<&str> = Self::ALL.iter().map(|value| value.label()).collect();
                Err(Error::InvalidArgument(format!(
                    "invalid {} '{}': must be one of {}",
                    $what,
                    s.trim(),
                    choices.join(", ")
                )))
            }
        }
    };
}

labeled_enum!(
    /// Defect classification. `Other` is the safe default.
    DefectCategory, "category" {
        Functional => "Functional Bugs" | "functional",
        Logical => "Logical Bugs" | "logical",
        Workflow => "Workflow Bugs" | "workflow",
        Other => "Other",
    }
);

impl Default for DefectCategory {
    fn default() -> Self {
        DefectCategory::Other
    }
}

labeled_enum!(
    DefectStatus, "defect status" {
        New => "New",
        InProgress => "In Progress",
        Resolved => "Resolved",
    }
);

labeled_enum!(
    CandidateStatus, "candidate status" {
        Applied => "Applied",
        Screening => "Screening",
        Interview => "Interview",
        Offer => "Offer",
        Hired => "Hired",
        Rejected => "Rejected",
    }
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    pub id: String,
    pub date_reported: NaiveDate,
    pub customer_name: String,
    pub description: String,
    pub category: DefectCategory,
    pub feature_link: String,
    pub status: DefectStatus,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub related_tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub role: String,
    pub email: String,
    pub status: CandidateStatus,
    #[serde(default)]
    pub interview_notes: String,
    #[serde(default)]
    pub related_tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

/// Behavior shared by both record kinds, used by the store and the editor.
pub trait Record: Clone + fmt::Debug + PartialEq + Serialize {
    const DOMAIN: Domain;

    /// Editable scalar field names, for help output.
    const FIELDS: &'static [&'static str];

    /// Fresh record as created by "new": initial status, empty tasks, today's date.
    fn blank(id: String, today: NaiveDate) -> Self;

    fn id(&self) -> &str;

    fn tasks(&self) -> &[Task];

    fn set_tasks(&mut self, tasks: Vec<Task>);

    /// Status label, used for listings and breakdowns.
    fn status_label(&self) -> &'static str;

    /// Every status label in declaration order.
    fn status_labels() -> Vec<&'static str>;

    /// One-line summary for listings.
    fn summary(&self) -> String;

    /// Free text handed to the suggestion service when asking for tasks.
    fn suggestion_context(&self) -> String;

    /// Set a scalar field from user input. Statuses, categories and dates are validated.
    fn set_field(&mut self, field: &str, value: &str) -> Result<()>;

    /// Store a suggested category. Records without a category ignore it.
    fn set_category(&mut self, _category: DefectCategory) -> bool {
        false
    }
}

impl Record for Defect {
    const DOMAIN: Domain = Domain::Defect;
    const FIELDS: &'static [&'static str] = &[
        "date",
        "customer",
        "description",
        "category",
        "feature",
        "status",
        "attach",
    ];

    fn blank(id: String, today: NaiveDate) -> Self {
        Self {
            id,
            date_reported: today,
            customer_name: String::new(),
            description: String::new(),
            category: DefectCategory::default(),
            feature_link: String::new(),
            status: DefectStatus::New,
            attachments: Vec::new(),
            related_tasks: Vec::new(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn tasks(&self) -> &[Task] {
        &self.related_tasks
    }

    fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.related_tasks = tasks;
    }

    fn status_label(&self) -> &'static str {
        self.status.label()
    }

    fn status_labels() -> Vec<&'static str> {
        DefectStatus::ALL.iter().map(|status| status.label()).collect()
    }

    fn summary(&self) -> String {
        format!(
            "{}  {}  {}  [{}] [{}]",
            self.id, self.date_reported, self.customer_name, self.category, self.status
        )
    }

    fn suggestion_context(&self) -> String {
        self.description.clone()
    }

    fn set_category(&mut self, category: DefectCategory) -> bool {
        self.category = category;
        true
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        match normalize_label(field).as_str() {
            "date" | "datereported" => self.date_reported = parse_date(value)?,
            "customer" | "customername" => self.customer_name = value.to_string(),
            "description" => self.description = value.to_string(),
            "category" => self.category = value.parse()?,
            "feature" | "featurelink" => self.feature_link = value.to_string(),
            "status" => self.status = value.parse()?,
            "attach" | "attachment" => {
                let reference = value.trim();
                if reference.is_empty() {
                    return Err(Error::InvalidArgument(
                        "attachment reference cannot be empty".to_string(),
                    ));
                }
                self.attachments.push(reference.to_string());
            }
            _ => return Err(unknown_field(field, Self::FIELDS)),
        }
        Ok(())
    }
}

impl Record for Candidate {
    const DOMAIN: Domain = Domain::Recruitment;
    const FIELDS: &'static [&'static str] = &["name", "role", "email", "status", "notes", "resume"];

    fn blank(id: String, _today: NaiveDate) -> Self {
        Self {
            id,
            name: String::new(),
            role: String::new(),
            email: String::new(),
            status: CandidateStatus::Applied,
            interview_notes: String::new(),
            related_tasks: Vec::new(),
            resume_url: None,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn tasks(&self) -> &[Task] {
        &self.related_tasks
    }

    fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.related_tasks = tasks;
    }

    fn status_label(&self) -> &'static str {
        self.status.label()
    }

    fn status_labels() -> Vec<&'static str> {
        CandidateStatus::ALL.iter().map(|status| status.label()).collect()
    }

    fn summary(&self) -> String {
        format!("{}  {}  {}  [{}]", self.id, self.name, self.role, self.status)
    }

    fn suggestion_context(&self) -> String {
        format!(
            "Candidate: {}, Role: {}, Status: {}",
            self.name, self.role, self.status
        )
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        match normalize_label(field).as_str() {
            "name" => self.name = value.to_string(),
            "role" => self.role = value.to_string(),
            "email" => self.email = value.to_string(),
            "status" => self.status = value.parse()?,
            "notes" | "interviewnotes" => self.interview_notes = value.to_string(),
            "resume" | "resumeurl" => {
                let url = value.trim();
                self.resume_url = if url.is_empty() {
                    None
                } else {
                    Some(url.to_string())
                };
            }
            _ => return Err(unknown_field(field, Self::FIELDS)),
        }
        Ok(())
    }
}

fn unknown_field(field: &str, known: &[&str]) -> Error {
    Error::InvalidArgument(format!(
        "unknown field '{}': expected one of {}",
        field.trim(),
        known.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip_through_parse() {
        for category in DefectCategory::ALL {
            assert_eq!(category.label().parse::<DefectCategory>().expect("parse"), *category);
        }
        assert_eq!("workflow".parse::<DefectCategory>().expect("alias"), DefectCategory::Workflow);
        assert!("Cosmetic".parse::<DefectCategory>().is_err());
    }

    #[test]
    fn from_label_is_exact() {
        assert_eq!(DefectCategory::from_label("Logical Bugs"), Some(DefectCategory::Logical));
        assert_eq!(DefectCategory::from_label("Logical"), None);
        assert_eq!(DefectCategory::from_label("Performance Bugs"), None);
    }

    #[test]
    fn blank_records_start_in_initial_status() {
        let today = parse_date("2024-03-01").expect("date");
        let defect = Defect::blank("DEF-001".to_string(), today);
        assert_eq!(defect.status, DefectStatus::New);
        assert_eq!(defect.category, DefectCategory::Other);
        assert_eq!(defect.date_reported, today);
        let candidate = Candidate::blank("CAN-001".to_string(), today);
        assert_eq!(candidate.status, CandidateStatus::Applied);
        assert!(candidate.related_tasks.is_empty());
    }

    #[test]
    fn set_field_validates_enumerations() {
        let mut defect = Defect::blank("DEF-001".to_string(), crate::task::today());
        defect.set_field("status", "in progress").expect("status");
        assert_eq!(defect.status, DefectStatus::InProgress);
        assert!(defect.set_field("status", "closed").is_err());
        assert!(defect.set_field("severity", "high").is_err());
        defect.set_field("attach", "screenshot.png").expect("attach");
        assert_eq!(defect.attachments, vec!["screenshot.png".to_string()]);
    }

    #[test]
    fn candidate_context_names_role_and_status() {
        let mut candidate = Candidate::blank("CAN-007".to_string(), crate::task::today());
        candidate.set_field("name", "Ada").expect("name");
        candidate.set_field("role", "Compiler Engineer").expect("role");
        candidate.set_field("status", "screening").expect("status");
        assert_eq!(
            candidate.suggestion_context(),
            "Candidate: Ada, Role: Compiler Engineer, Status: Screening"
        );
    }

    #[test]
    fn defect_serializes_with_camel_case_fields() {
        let defect = Defect::blank("DEF-009".to_string(), parse_date("2024-03-01").expect("date"));
        let value = serde_json::to_value(&defect).expect("json");
        assert_eq!(value["dateReported"], "2024-03-01");
        assert_eq!(value["category"], "Other");
        assert_eq!(value["status"], "New");
    }
}
