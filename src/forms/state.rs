//! Per-form editing state: values, errors, touched flags and submission.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::future::Future;

use crate::forms::validation::{Schema, validate_values};

/// Result of [`FormState::submit`]. Handler errors are carried here instead of
/// being returned as `Err`.
#[derive(Debug, PartialEq)]
pub enum SubmitOutcome<T, E> {
    /// At least one field failed validation; the handler did not run.
    Invalid,
    /// A submission is already in flight.
    Busy,
    Completed(T),
    Failed(E),
}

#[derive(Debug, Clone)]
pub struct FormState {
    schema: Schema,
    initial: HashMap<String, String>,
    values: HashMap<String, String>,
    errors: HashMap<String, String>,
    touched: HashSet<String>,
    submitting: bool,
}

impl FormState {
    pub fn new(schema: Schema, initial: HashMap<String, String>) -> Self {
        Self {
            schema,
            values: initial.clone(),
            initial,
            errors: HashMap::new(),
            touched: HashSet::new(),
            submitting: false,
        }
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or_default()
    }

    pub fn errors(&self) -> &HashMap<String, String> {
        &self.errors
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Updates a value and clears any stale error on that field.
    pub fn change(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
        self.errors.remove(field);
    }

    pub fn blur(&mut self, field: &str) {
        self.touched.insert(field.to_string());
        self.validate_field(field);
    }

    /// Re-runs one field's rule; fields outside the schema are always valid.
    pub fn validate_field(&mut self, field: &str) -> bool {
        let Some(rule) = self.schema.get(field) else {
            return true;
        };
        match rule.check(self.value(field)) {
            Some(error) => {
                self.errors.insert(field.to_string(), error);
                false
            }
            None => {
                self.errors.remove(field);
                true
            }
        }
    }

    /// Validates every schema field and marks all of them touched.
    pub fn validate_all(&mut self) -> bool {
        self.errors = validate_values(&self.values, &self.schema);
        self.touched = self.schema.keys().map(|field| field.to_string()).collect();
        self.errors.is_empty()
    }

    /// Runs `handler` with the current values if the form is valid.
    pub async fn submit<F, Fut, T, E>(&mut self, handler: F) -> SubmitOutcome<T, E>
    where
        F: FnOnce(HashMap<String, String>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        if self.submitting {
            return SubmitOutcome::Busy;
        }
        if !self.validate_all() {
            return SubmitOutcome::Invalid;
        }

        self.submitting = true;
        let result = handler(self.values.clone()).await;
        self.submitting = false;

        match result {
            Ok(value) => SubmitOutcome::Completed(value),
            Err(err) => {
                log::warn!("Form submission failed: {err}");
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Restores the initial values (or `values`) and clears all feedback.
    pub fn reset(&mut self, values: Option<HashMap<String, String>>) {
        self.values = values.unwrap_or_else(|| self.initial.clone());
        self.errors.clear();
        self.touched.clear();
        self.submitting = false;
    }

    pub fn set_value(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
    }

    pub fn set_values(&mut self, values: HashMap<String, String>) {
        self.values.extend(values);
    }

    pub fn set_field_error(&mut self, field: &str, error: impl Into<String>) {
        self.errors.insert(field.to_string(), error.into());
    }

    /// Error to display for `field`: only once the field has been touched.
    pub fn visible_error(&self, field: &str) -> Option<&str> {
        if !self.is_touched(field) {
            return None;
        }
        self.errors.get(field).map(String::as_str)
    }

    /// All errors that should currently be displayed.
    pub fn visible_errors(&self) -> HashMap<String, String> {
        self.errors
            .iter()
            .filter(|(field, _)| self.touched.contains(*field))
            .map(|(field, error)| (field.clone(), error.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::validation::{Rule, compose, email, required};

    fn login_state() -> FormState {
        let schema = Schema::from([
            ("email", compose([Rule::new(required), Rule::new(email)])),
            ("password", Rule::new(required)),
        ]);
        FormState::new(schema, HashMap::new())
    }

    #[test]
    fn change_clears_field_error() {
        let mut form = login_state();
        form.blur("email");
        assert_eq!(form.visible_error("email"), Some("This field is required"));

        form.change("email", "a");
        assert_eq!(form.visible_error("email"), None);
        assert_eq!(form.value("email"), "a");
    }

    #[test]
    fn errors_hidden_until_touched() {
        let mut form = login_state();
        form.set_field_error("password", "Wrong password");
        assert_eq!(form.visible_error("password"), None);

        form.blur("email");
        assert!(form.visible_errors().contains_key("email"));
        assert!(!form.visible_errors().contains_key("password"));
    }

    #[test]
    fn validate_all_touches_every_field() {
        let mut form = login_state();
        assert!(!form.validate_all());
        assert!(form.is_touched("email"));
        assert!(form.is_touched("password"));
        assert_eq!(form.errors().len(), 2);
    }

    #[test]
    fn unknown_field_is_valid() {
        let mut form = login_state();
        assert!(form.validate_field("nickname"));
    }

    #[actix_web::test]
    async fn invalid_form_never_runs_handler() {
        let mut form = login_state();
        form.change("email", "not-an-email");

        let mut called = false;
        let outcome: SubmitOutcome<(), String> = form
            .submit(|_| {
                called = true;
                async { Ok(()) }
            })
            .await;

        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert!(!called);
        assert!(!form.is_submitting());
    }

    #[actix_web::test]
    async fn completed_submission_passes_values() {
        let mut form = login_state();
        form.set_values(HashMap::from([
            ("email".to_string(), "a@b.co".to_string()),
            ("password".to_string(), "secret".to_string()),
        ]));

        let outcome = form
            .submit(|values| async move { Ok::<_, String>(values["email"].clone()) })
            .await;

        assert_eq!(outcome, SubmitOutcome::Completed("a@b.co".to_string()));
        assert!(!form.is_submitting());
    }

    #[actix_web::test]
    async fn failed_submission_is_reported_not_raised() {
        let mut form = login_state();
        form.set_value("email", "a@b.co");
        form.set_value("password", "secret");

        let outcome: SubmitOutcome<(), String> = form
            .submit(|_| async { Err("Invalid credentials".to_string()) })
            .await;

        assert_eq!(outcome, SubmitOutcome::Failed("Invalid credentials".to_string()));
        assert!(!form.is_submitting());
    }

    #[test]
    fn reset_restores_initial_values() {
        let schema = Schema::from([("name", Rule::new(required))]);
        let mut form = FormState::new(
            schema,
            HashMap::from([("name".to_string(), "Asha".to_string())]),
        );
        form.change("name", "");
        form.validate_all();

        form.reset(None);

        assert_eq!(form.value("name"), "Asha");
        assert!(form.errors().is_empty());
        assert!(!form.is_touched("name"));
    }
}
