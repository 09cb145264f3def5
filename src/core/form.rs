//! Generic form controller: field values, per-field errors and touched
//! flags, and validate-gated submission with a guaranteed `submitting`
//! reset.

use std::collections::BTreeMap;
use std::future::Future;

use thiserror::Error;

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, String>;

/// A single field input. Checkbox-style inputs carry booleans, everything
/// else carries the raw string.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }
}

/// Value records editable through [`Form::handle_change`]. `FIELDS` names
/// the full key set; errors and touched flags are keyed by the same names.
pub trait FormModel: Clone {
    const FIELDS: &'static [&'static str];

    fn set_field(&mut self, field: &str, value: FieldValue);
}

/// Why a submit did not produce a result.
#[derive(Debug, Error)]
pub enum SubmitError<E> {
    /// Validation failed; the submit handler was never invoked.
    #[error("validation failed: {}", format_fields(.0))]
    Invalid(FieldErrors),
    /// The submit handler itself failed. Not caught here; the caller owns
    /// the failure.
    #[error("{0}")]
    Failed(E),
}

fn format_fields(errors: &FieldErrors) -> String {
    errors
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Form state for a value record `T`.
///
/// `errors` is authoritative only immediately after a validation pass; it is
/// not recomputed on every change. `touched` is set per field on blur, and a
/// failed submit deliberately fills `errors` without force-marking fields
/// touched.
#[derive(Debug, Clone)]
pub struct Form<T: Clone> {
    initial: T,
    values: T,
    errors: FieldErrors,
    touched: BTreeMap<String, bool>,
    validator: Option<fn(&T) -> FieldErrors>,
    submitting: bool,
}

impl<T: Clone> Form<T> {
    pub fn new(initial: T) -> Self {
        Self {
            values: initial.clone(),
            initial,
            errors: FieldErrors::new(),
            touched: BTreeMap::new(),
            validator: None,
            submitting: false,
        }
    }

    pub fn with_validator(initial: T, validator: fn(&T) -> FieldErrors) -> Self {
        let mut form = Self::new(initial);
        form.validator = Some(validator);
        form
    }

    pub fn values(&self) -> &T {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.get(field).copied().unwrap_or(false)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Run the validator and replace `errors` with its result.
    /// Returns `true` when the values are valid (or no validator is set).
    pub fn validate(&mut self) -> bool {
        if let Some(validator) = self.validator {
            self.errors = validator(&self.values);
        }
        self.errors.is_empty()
    }

    /// Validate, then run the submit handler on a copy of the current values.
    ///
    /// On validation failure the handler is never invoked and the field
    /// errors are returned. `submitting` is reset before a handler failure
    /// propagates, so an error can never leave the form stuck in-flight.
    pub async fn submit<F, Fut, R, E>(&mut self, on_submit: F) -> Result<R, SubmitError<E>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        if !self.validate() {
            return Err(SubmitError::Invalid(self.errors.clone()));
        }

        self.submitting = true;
        let result = on_submit(self.values.clone()).await;
        self.submitting = false;
        result.map_err(SubmitError::Failed)
    }

    /// Restore `values` to the construction-time initial record and clear
    /// both `errors` and `touched`.
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.touched.clear();
    }

    /// Full replacement of the current values, e.g. to pre-populate an edit
    /// form from an existing record.
    pub fn set_values(&mut self, values: T) {
        self.values = values;
    }
}

impl<T: FormModel> Form<T> {
    /// Apply an edit to a single field. No validation runs on change.
    pub fn handle_change(&mut self, field: &str, value: FieldValue) {
        debug_assert!(
            T::FIELDS.iter().any(|f| *f == field),
            "unknown form field: {field}"
        );
        self.values.set_field(field, value);
    }

    /// Mark a field as touched. Does not trigger validation; the display
    /// layer combines `touched` and `errors` to decide what to show.
    pub fn handle_blur(&mut self, field: &str) {
        debug_assert!(
            T::FIELDS.iter().any(|f| *f == field),
            "unknown form field: {field}"
        );
        self.touched.insert(field.to_string(), true);
    }

    /// Direct single-field set for programmatic values (e.g. an uploaded
    /// file's resulting URL), bypassing change-event semantics.
    pub fn set_field_value(&mut self, field: &str, value: FieldValue) {
        self.values.set_field(field, value);
    }
}
