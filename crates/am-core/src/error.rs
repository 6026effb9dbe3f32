//! Core error types for Asset Management RS

use std::collections::HashMap;
use thiserror::Error;

use crate::config::ConfigError;

/// Core error type shared by the service layers
#[derive(Error, Debug)]
pub enum AmError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AmError {
    pub fn status_code(&self) -> u16 {
        match self {
            AmError::Validation(_) | AmError::InvalidInput(_) => 400,
            AmError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AmError::Validation(_) => "validation_failed",
            AmError::InvalidInput(_) => "invalid_input",
            AmError::Config(_) => "configuration_error",
        }
    }
}

pub type AmResult<T> = Result<T, AmError>;

/// Validation errors collection, keyed by field name
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Messages in a stable order: base errors first, then fields alphabetically
    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        let mut fields: Vec<_> = self.errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        for (field, field_messages) in fields {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors = ValidationErrors::new();
        for (field, field_errors) in err.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("is invalid ({})", error.code));
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}

/// Run the derive-based validation rules of a request model
pub fn validate_model<T: validator::Validate>(model: &T) -> AmResult<()> {
    model
        .validate()
        .map_err(|e| AmError::Validation(ValidationErrors::from(e)))
}
