mod support;

use std::time::Duration;

use procdesk::record::{DefectCategory, Domain};
use procdesk::suggest::{SuggestError, DOC_EMPTY, DOC_FAILED, DOC_MISSING_KEY};

use support::{client, client_with_timeout, Reply, ScriptedBackend};

#[tokio::test]
async fn no_credential_means_no_calls() {
    let backend = ScriptedBackend::without_credential();
    let client = client(backend.clone());

    assert_eq!(client.classify("Checkout fails").await, DefectCategory::Other);
    assert!(client.suggest_tasks("Checkout fails", Domain::Defect).await.is_empty());
    assert_eq!(client.draft_document("Hiring", "fields").await, DOC_MISSING_KEY);
    assert_eq!(backend.calls(), 0);
    assert!(!client.has_credential());
}

#[tokio::test]
async fn failing_transport_classifies_as_other() {
    let backend = ScriptedBackend::new(Reply::Fail(SuggestError::Network(
        "connection refused".to_string(),
    )));
    let client = client(backend.clone());

    let category = client.classify("Login fails with special characters").await;
    assert_eq!(category, DefectCategory::Other);
    assert_eq!(backend.calls(), 1);
    assert!(backend.prompts()[0].contains("Login fails with special characters"));
}

#[tokio::test]
async fn slow_service_times_out_to_fallback() {
    let backend = ScriptedBackend::new(Reply::Slow(Duration::from_millis(500)));
    let client = client_with_timeout(backend.clone(), Duration::from_millis(20));

    assert_eq!(client.classify("Totals drift").await, DefectCategory::Other);
    assert_eq!(
        client.try_classify("Totals drift").await,
        Err(SuggestError::Timeout(20))
    );
}

#[tokio::test]
async fn classify_reads_structured_reply() {
    let backend = ScriptedBackend::new(Reply::Text(r#"{"category": "Logical Bugs"}"#.to_string()));
    let client = client(backend);

    assert_eq!(
        client.classify("Discount applied twice").await,
        DefectCategory::Logical
    );
}

#[tokio::test]
async fn unreadable_reply_falls_back() {
    let backend = ScriptedBackend::new(Reply::Text("Functional Bugs, probably".to_string()));
    let client = client(backend);

    assert_eq!(client.classify("Crash on save").await, DefectCategory::Other);
    assert!(client.suggest_tasks("Crash on save", Domain::Defect).await.is_empty());
}

#[tokio::test]
async fn recruitment_tasks_default_to_recruiter() {
    let reply = r#"[
        {"title": "Phone screen"},
        {"title": "Schedule onsite", "owner": "Hiring Manager", "dueDateOffset": 7},
        {"owner": "HR"}
    ]"#;
    let backend = ScriptedBackend::new(Reply::Text(reply.to_string()));
    let client = client(backend.clone());

    let drafts = client
        .suggest_tasks("Candidate: Ada, Role: Engineer, Status: Applied", Domain::Recruitment)
        .await;
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0].owner, "Recruiter");
    assert_eq!(drafts[0].due_date_offset_days, 2);
    assert_eq!(drafts[1].owner, "Hiring Manager");
    assert_eq!(drafts[1].due_date_offset_days, 7);
    assert!(backend.prompts()[0].contains("hiring tasks"));
}

#[tokio::test]
async fn document_fallbacks_are_readable() {
    let failing = ScriptedBackend::new(Reply::Fail(SuggestError::Http {
        status: 503,
        body: "unavailable".to_string(),
    }));
    assert_eq!(client(failing).draft_document("Hiring", "x").await, DOC_FAILED);

    let empty = ScriptedBackend::new(Reply::Text("   ".to_string()));
    assert_eq!(client(empty).draft_document("Hiring", "x").await, DOC_EMPTY);

    let ok = ScriptedBackend::new(Reply::Text("# Design\n\nBody".to_string()));
    assert_eq!(client(ok).draft_document("Hiring", "x").await, "# Design\n\nBody");
}
