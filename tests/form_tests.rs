use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use club_cms::core::form::{FieldErrors, FieldValue, Form, FormModel, SubmitError};

#[derive(Debug, Clone, PartialEq)]
struct EventDraft {
    title: String,
    location: String,
    notify_members: bool,
}

impl EventDraft {
    fn empty() -> Self {
        Self {
            title: String::new(),
            location: String::new(),
            notify_members: false,
        }
    }
}

impl FormModel for EventDraft {
    const FIELDS: &'static [&'static str] = &["title", "location", "notify_members"];

    fn set_field(&mut self, field: &str, value: FieldValue) {
        match (field, value) {
            ("title", FieldValue::Text(v)) => self.title = v,
            ("location", FieldValue::Text(v)) => self.location = v,
            ("notify_members", FieldValue::Flag(v)) => self.notify_members = v,
            _ => {}
        }
    }
}

fn validate_draft(values: &EventDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if values.title.trim().is_empty() {
        errors.insert("title".into(), "Title is required".into());
    }
    errors
}

#[tokio::test]
async fn test_submit_blocked_when_invalid() {
    let mut form = Form::with_validator(EventDraft::empty(), validate_draft);

    let called = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&called);
    let result: Result<(), SubmitError<String>> = form
        .submit(|_values| async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

    match result {
        Err(SubmitError::Invalid(errors)) => {
            assert_eq!(errors.get("title").map(String::as_str), Some("Title is required"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(!called.load(Ordering::SeqCst), "handler must not run");
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn test_failed_submit_does_not_mark_fields_touched() {
    // A failed submit fills `errors` but deliberately leaves `touched` alone;
    // a field never blurred shows no inline message even though it is invalid.
    let mut form = Form::with_validator(EventDraft::empty(), validate_draft);

    let result: Result<(), SubmitError<String>> = form.submit(|_| async { Ok(()) }).await;
    assert!(matches!(result, Err(SubmitError::Invalid(_))));

    assert!(!form.errors().is_empty());
    assert!(!form.is_touched("title"));
    assert!(!form.is_touched("location"));
}

#[tokio::test]
async fn test_submit_runs_after_fixing_validation_error() {
    let mut form = Form::with_validator(EventDraft::empty(), validate_draft);

    let first: Result<(), SubmitError<String>> = form.submit(|_| async { Ok(()) }).await;
    assert!(matches!(first, Err(SubmitError::Invalid(_))));

    form.handle_change("title", FieldValue::text("Support Circle"));
    let second: Result<String, SubmitError<String>> = form
        .submit(|values| async move { Ok(values.title) })
        .await;

    assert_eq!(second.unwrap(), "Support Circle");
    // The second validation pass replaced the stale error map
    assert!(form.errors().is_empty());
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn test_submit_without_validator_always_runs() {
    let mut form = Form::new(EventDraft::empty());

    let result: Result<bool, SubmitError<String>> = form.submit(|_| async { Ok(true) }).await;
    assert!(result.unwrap());
}

#[tokio::test]
async fn test_submitting_resets_when_handler_fails() {
    let mut form = Form::with_validator(
        EventDraft {
            title: "Exam Night".to_string(),
            ..EventDraft::empty()
        },
        validate_draft,
    );

    let result: Result<(), SubmitError<String>> = form
        .submit(|_| async { Err("storage offline".to_string()) })
        .await;

    match result {
        Err(SubmitError::Failed(message)) => assert_eq!(message, "storage offline"),
        other => panic!("expected handler failure, got {other:?}"),
    }
    // Reset even though the handler failed
    assert!(!form.is_submitting());
}

#[test]
fn test_handle_change_checkbox_stores_boolean() {
    let mut form = Form::new(EventDraft::empty());

    form.handle_change("notify_members", FieldValue::Flag(true));
    form.handle_change("title", FieldValue::text("Drop-in"));

    assert!(form.values().notify_members);
    assert_eq!(form.values().title, "Drop-in");
}

#[test]
fn test_handle_blur_marks_touched_without_validating() {
    let mut form = Form::with_validator(EventDraft::empty(), validate_draft);

    form.handle_blur("title");

    assert!(form.is_touched("title"));
    assert!(!form.is_touched("location"));
    // Blur alone never produces errors
    assert!(form.errors().is_empty());
}

#[test]
fn test_reset_restores_initial_values_and_clears_state() {
    let initial = EventDraft {
        title: "Original".to_string(),
        location: "Union 204".to_string(),
        notify_members: false,
    };
    let mut form = Form::with_validator(initial.clone(), validate_draft);

    form.handle_change("title", FieldValue::text(""));
    form.handle_blur("title");
    assert!(!form.validate());

    form.reset();

    assert_eq!(*form.values(), initial);
    assert!(form.errors().is_empty());
    assert!(!form.is_touched("title"));
}

#[test]
fn test_set_values_prepopulates_edit_form() {
    let mut form = Form::new(EventDraft::empty());

    form.set_values(EventDraft {
        title: "Loaded".to_string(),
        location: "Library Lawn".to_string(),
        notify_members: true,
    });

    assert_eq!(form.values().title, "Loaded");
    assert_eq!(form.values().location, "Library Lawn");
}

#[test]
fn test_set_field_value_bypasses_change_semantics() {
    let mut form = Form::new(EventDraft::empty());

    // Programmatic set, e.g. an uploaded file's resulting URL
    form.set_field_value("location", FieldValue::text("/static/covers/abc"));

    assert_eq!(form.values().location, "/static/covers/abc");
    assert!(!form.is_touched("location"));
}

#[test]
fn test_validate_replaces_error_map() {
    let mut form = Form::with_validator(EventDraft::empty(), validate_draft);

    assert!(!form.validate());
    assert_eq!(form.errors().len(), 1);

    form.handle_change("title", FieldValue::text("Fixed"));
    assert!(form.validate());
    assert!(form.errors().is_empty());
}
