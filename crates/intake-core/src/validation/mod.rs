//! Input validation for patient, triage and user payloads.
//!
//! Every validator returns a [`ValidationResult`]; the pipelines compose them
//! with `?` instead of relying on panics or sentinel values.

mod fields;
mod pressure;
mod vitals;

pub use fields::*;
pub use pressure::*;
pub use vitals::*;

use thiserror::Error;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Malformed input shape.
    #[error("Invalid format for {field}: {reason}")]
    Format { field: &'static str, reason: String },

    /// Value outside its allowed bounds.
    #[error("Out of range for {field}: {reason}")]
    Range { field: &'static str, reason: String },

    /// Both pressure representations were supplied and they disagree.
    #[error("pressure and systolic/diastolic do not agree ({pressure} vs {expected})")]
    Mismatch { pressure: String, expected: String },

    /// Neither pressure representation was supplied.
    #[error("Blood pressure missing: supply pressure or systolic_mmHg and diastolic_mmHg")]
    MissingPressure,

    #[error("Phone number is empty")]
    EmptyPhone,

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),
}

impl ValidationError {
    pub(crate) fn format(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Format {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn range(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Range {
            field,
            reason: reason.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
