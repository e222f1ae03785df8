//! Field validation run before every listing write.

use serde::{Deserialize, Serialize};

use crate::{JobAttributes, JobField};

/// Maximum length, in characters, of every bounded text field.
pub const MAX_TEXT_LENGTH: usize = 255;

pub const BLANK: &str = "can't be blank";
pub const TAKEN: &str = "has already been taken";

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: JobField,
    pub message: String,
}

/// All constraints violated by one write attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors for a single field.
    pub fn single(field: JobField, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: JobField, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages recorded against `field`.
    pub fn on(&self, field: JobField) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn has(&self, field: JobField) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed: ")?;
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Message for a value longer than [`MAX_TEXT_LENGTH`].
pub fn too_long() -> String {
    format!("is too long (maximum is {MAX_TEXT_LENGTH} characters)")
}

/// Check presence and length constraints.
///
/// Uniqueness needs the store and is checked by the repository.
pub fn validate(attrs: &JobAttributes) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if attrs.title.trim().is_empty() {
        errors.add(JobField::Title, BLANK);
    }
    if attrs.description.trim().is_empty() {
        errors.add(JobField::Description, BLANK);
    }

    if exceeds_limit(&attrs.title) {
        errors.add(JobField::Title, too_long());
    }
    for (field, value) in attrs.optional_texts() {
        if value.is_some_and(exceeds_limit) {
            errors.add(field, too_long());
        }
    }

    errors.into_result()
}

fn exceeds_limit(value: &str) -> bool {
    value.chars().count() > MAX_TEXT_LENGTH
}
