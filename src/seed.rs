//! Mock records loaded into a fresh store.

use chrono::NaiveDate;

use crate::record::{Candidate, CandidateStatus, Defect, DefectCategory, DefectStatus};
use crate::task::{Task, TaskStatus};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

pub fn defects() -> Vec<Defect> {
    vec![
        Defect {
            id: "DEF-001".to_string(),
            date_reported: date(2023, 10, 25),
            customer_name: "Acme Corp".to_string(),
            description: "Login button fails when password contains special characters."
                .to_string(),
            category: DefectCategory::Functional,
            feature_link: "Auth Module".to_string(),
            status: DefectStatus::InProgress,
            attachments: Vec::new(),
            related_tasks: vec![Task {
                id: "1".to_string(),
                title: "Check regex validation".to_string(),
                owner: "DevTeam".to_string(),
                status: TaskStatus::InProgress,
                due_date: date(2023, 10, 27),
            }],
        },
        Defect {
            id: "DEF-002".to_string(),
            date_reported: date(2023, 10, 26),
            customer_name: "Globex Inc".to_string(),
            description: "Invoice total calculation is off by 1 cent due to rounding.".to_string(),
            category: DefectCategory::Logical,
            feature_link: "Billing".to_string(),
            status: DefectStatus::New,
            attachments: Vec::new(),
            related_tasks: Vec::new(),
        },
    ]
}

pub fn candidates() -> Vec<Candidate> {
    vec![
        Candidate {
            id: "CAN-101".to_string(),
            name: "Jane Doe".to_string(),
            role: "Senior React Engineer".to_string(),
            email: "jane.d@example.com".to_string(),
            status: CandidateStatus::Interview,
            interview_notes: "Strong knowledge of Hooks. Weak on CSS Grid.".to_string(),
            related_tasks: vec![Task {
                id: "t1".to_string(),
                title: "Schedule Technical Round 2".to_string(),
                owner: "Hiring Mgr".to_string(),
                status: TaskStatus::Pending,
                due_date: date(2023, 11, 1),
            }],
            resume_url: None,
        },
        Candidate {
            id: "CAN-102".to_string(),
            name: "John Smith".to_string(),
            role: "Product Manager".to_string(),
            email: "john.s@example.com".to_string(),
            status: CandidateStatus::Applied,
            interview_notes: String::new(),
            related_tasks: Vec::new(),
            resume_url: None,
        },
    ]
}
