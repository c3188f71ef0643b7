//! Store-level validation results.
//!
//! Entities declare their rules with `#[derive(Validate)]`; the unit of work
//! runs them at commit time and reports every violation of the batch as one
//! [`ValidationFailure`].

use std::fmt;

use serde::Serialize;
use validator::ValidationErrors;

/// One rejected field of one staged entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Table of the rejected entity
    pub table: &'static str,
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error raised by a single failed commit, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the field errors reported by `validator` for one entity.
    ///
    /// Fields are reported in name order so the rendering is stable.
    pub fn from_errors(table: &'static str, errors: &ValidationErrors) -> Self {
        let mut failure = Self::new();
        failure.record(table, errors);
        failure
    }

    /// Append the field errors of one more entity.
    pub fn record(&mut self, table: &'static str, errors: &ValidationErrors) {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.to_string().cmp(&b.to_string()));

        for (field, errs) in fields {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid ({})", field, err.code));
                self.errors.push(FieldError {
                    table,
                    field: field.to_string(),
                    message,
                });
            }
        }
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the rejected fields, duplicates removed, first-seen order.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for error in &self.errors {
            if !fields.contains(&error.field.as_str()) {
                fields.push(&error.field);
            }
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Newline-joined `field: message` lines.
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationFailure {}
