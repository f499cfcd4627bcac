//! Prompt text and response schemas for the three suggestion calls.

use serde_json::{json, Value};

use crate::record::{DefectCategory, Domain};

/// Subject used by `procdesk doc` when none is given.
pub const DEFAULT_DOC_SUBJECT: &str = "Recruitment & Defect Management";

/// Process summary used by `procdesk doc` when no details are given.
pub const DEFAULT_DOC_DETAILS: &str = "\
Recruitment Process Fields: Candidate Name, Role, Email, Status (Applied, Screening, Interview, Offer, Hired), Interview Notes.
Related Tasks: Auto-generated tasks for hiring steps.
Defect Process Fields: Date, Customer, Description, Category (AI Classified), Feature Link, Status.
User Journeys:
1. Recruiter creates candidate -> AI suggests interview tasks -> Recruiter tracks status.
2. Support logs defect -> AI classifies it -> Dev works on tasks.";

pub fn classify(description: &str) -> String {
    let labels: Vec<String> = DefectCategory::ALL
        .iter()
        .map(|category| format!("\"{}\"", category.label()))
        .collect();
    format!(
        "Categorize the following software defect description into exactly one of these categories: {}.\n\nDescription: \"{}\"",
        labels.join(", "),
        description
    )
}

pub fn classify_schema() -> Value {
    let labels: Vec<&str> = DefectCategory::ALL
        .iter()
        .map(|category| category.label())
        .collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "category": {
                "type": "STRING",
                "enum": labels,
            }
        },
        "required": ["category"],
    })
}

pub fn suggest_tasks(context: &str, domain: Domain) -> String {
    match domain {
        Domain::Defect => format!(
            "Given this defect description: \"{context}\", suggest 3-5 specific, actionable tasks to resolve it. Return JSON."
        ),
        Domain::Recruitment => format!(
            "Given this recruitment context for candidate/role: \"{context}\", suggest 3-5 standard hiring tasks. Return JSON."
        ),
    }
}

pub fn tasks_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "owner": {
                    "type": "STRING",
                    "description": "Suggested role like 'Developer', 'QA', 'HR'",
                },
                "dueDateOffset": {
                    "type": "NUMBER",
                    "description": "Days from now, e.g. 1, 2, 7",
                },
            },
        },
    })
}

pub fn document(subject: &str, details: &str) -> String {
    format!(
        "Write a comprehensive solution design document for a \"{subject}\" process in a process management system.

The document should cover:
1. **Introduction**: What problem this solves.
2. **Process Flow**: A textual description of the user journey (e.g., \"Recruiter adds candidate -> System auto-assigns tasks -> Interview Scheduled\").
3. **Key Features**: Highlight the fields and logic configured (based on these details: {details}).
4. **Analytical Justification**: Why this structure works efficiently.

Format with Markdown."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_prompt_lists_every_label() {
        let prompt = classify("Totals off by a cent");
        for category in DefectCategory::ALL {
            assert!(prompt.contains(category.label()));
        }
        assert!(prompt.ends_with("\"Totals off by a cent\""));
    }

    #[test]
    fn classify_schema_enumerates_labels() {
        let schema = classify_schema();
        let labels = schema["properties"]["category"]["enum"]
            .as_array()
            .expect("enum");
        assert_eq!(labels.len(), 4);
        assert_eq!(labels[0], "Functional Bugs");
    }

    #[test]
    fn task_prompts_differ_by_domain() {
        let defect = suggest_tasks("crash on save", Domain::Defect);
        let hiring = suggest_tasks("crash on save", Domain::Recruitment);
        assert!(defect.contains("resolve"));
        assert!(hiring.contains("hiring"));
        assert_ne!(defect, hiring);
    }

    #[test]
    fn document_prompt_embeds_subject_and_details() {
        let prompt = document(DEFAULT_DOC_SUBJECT, "fields: a, b");
        assert!(prompt.contains("\"Recruitment & Defect Management\""));
        assert!(prompt.contains("fields: a, b"));
    }
}
