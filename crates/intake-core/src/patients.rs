//! Patient registry.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::db::{Database, DbError};
use crate::models::{Page, Patient, PatientDraft, PatientUpdate};
use crate::validation::{ValidationError, ValidationResult};

/// Shortest accepted name search, in characters.
pub const MIN_SEARCH_CHARS: usize = 2;

/// Patient registry errors.
#[derive(Error, Debug)]
pub enum PatientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Patient not found: {0}")]
    NotFound(i64),

    /// E-mail or phone already registered to another patient.
    #[error("Patient already registered: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(DbError),
}

impl From<DbError> for PatientError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Conflict(msg) => PatientError::Conflict(msg),
            other => PatientError::Database(other),
        }
    }
}

pub type PatientResult<T> = Result<T, PatientError>;

/// Create, read, search, update and delete patients.
pub struct PatientService<'a> {
    db: &'a Database,
}

impl<'a> PatientService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Validate and register a patient.
    pub fn create_patient(&self, draft: PatientDraft) -> PatientResult<Patient> {
        let patient = draft.validate()?;
        let stored = self.db.insert_patient(&patient, Utc::now())?;
        info!(patient_id = stored.id, "Patient registered");
        Ok(stored)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: i64) -> PatientResult<Patient> {
        debug!(patient_id = id, "Fetching patient");
        self.db.get_patient(id)?.ok_or(PatientError::NotFound(id))
    }

    /// List patients by ascending ID.
    pub fn list_patients(&self, page: Page) -> PatientResult<Vec<Patient>> {
        let (limit, offset) = page.limit_offset()?;
        Ok(self.db.list_patients(limit, offset)?)
    }

    /// Case-insensitive substring search on the patient name.
    pub fn search_patients(&self, query: &str) -> PatientResult<Vec<Patient>> {
        let query = check_search_query(query)?;
        Ok(self.db.search_patients_by_name(query)?)
    }

    /// Apply a partial update.
    pub fn update_patient(&self, id: i64, update: PatientUpdate) -> PatientResult<Patient> {
        let changes = update.validate()?;
        self.db.write_locked(|db| {
            let mut patient = db.get_patient(id)?.ok_or(PatientError::NotFound(id))?;
            changes.apply_to(&mut patient);
            db.update_patient(&patient)?;
            info!(patient_id = id, "Patient updated");
            Ok(patient)
        })
    }

    /// Delete a patient together with all of its triages.
    pub fn delete_patient(&self, id: i64) -> PatientResult<()> {
        if !self.db.delete_patient(id)? {
            return Err(PatientError::NotFound(id));
        }
        info!(patient_id = id, "Patient deleted");
        Ok(())
    }
}

fn check_search_query(query: &str) -> ValidationResult<&str> {
    let query = query.trim();
    if query.chars().count() < MIN_SEARCH_CHARS {
        return Err(ValidationError::format(
            "q",
            format!("search needs at least {MIN_SEARCH_CHARS} characters"),
        ));
    }
    Ok(query)
}
