//! Patient models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{
    bounded_text, normalize_email, normalize_phone_br, parse_birth_date, BirthDateInput,
    ValidationResult,
};

/// Minimum patient name length, in characters.
pub const PATIENT_NAME_MIN: usize = 5;
/// Maximum patient name length, in characters.
pub const PATIENT_NAME_MAX: usize = 60;

/// A stored patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Store-assigned identifier
    pub id: i64,
    /// Full name
    pub name: String,
    /// Date of birth, if known
    pub birth_date: Option<NaiveDate>,
    /// Lower-cased e-mail, unique across patients
    pub email: String,
    /// Canonical `+55…` phone, unique across patients
    pub phone: String,
    /// Creation timestamp (assigned by the store)
    pub created_at: DateTime<Utc>,
}

/// Patient registration payload as received from a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientDraft {
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<BirthDateInput>,
    pub email: String,
    pub phone: String,
}

/// A validated patient, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub email: String,
    pub phone: String,
}

impl PatientDraft {
    /// Create a draft with the required fields.
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birth_date: None,
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Validate and normalize every field.
    pub fn validate(self) -> ValidationResult<NewPatient> {
        Ok(NewPatient {
            name: bounded_text("name", &self.name, PATIENT_NAME_MIN, PATIENT_NAME_MAX)?,
            birth_date: parse_birth_date(self.birth_date)?,
            email: normalize_email(&self.email)?,
            phone: normalize_phone_br(&self.phone)?,
        })
    }
}

/// Partial patient update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientUpdate {
    #[serde(default)]
    pub name: Option<String>,
    /// A blank birth date clears the stored one
    #[serde(default)]
    pub birth_date: Option<BirthDateInput>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Validated changes derived from a [`PatientUpdate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl PatientUpdate {
    pub fn validate(self) -> ValidationResult<PatientChanges> {
        Ok(PatientChanges {
            name: self
                .name
                .map(|n| bounded_text("name", &n, PATIENT_NAME_MIN, PATIENT_NAME_MAX))
                .transpose()?,
            birth_date: self
                .birth_date
                .map(|b| parse_birth_date(Some(b)))
                .transpose()?,
            email: self.email.map(|e| normalize_email(&e)).transpose()?,
            phone: self.phone.map(|p| normalize_phone_br(&p)).transpose()?,
        })
    }
}

impl PatientChanges {
    /// Apply the changes to a stored patient.
    pub fn apply_to(self, patient: &mut Patient) {
        if let Some(name) = self.name {
            patient.name = name;
        }
        if let Some(birth_date) = self.birth_date {
            patient.birth_date = birth_date;
        }
        if let Some(email) = self.email {
            patient.email = email;
        }
        if let Some(phone) = self.phone {
            patient.phone = phone;
        }
    }
}
