//! Triage intake pipeline.
//!
//! Pipeline: Pressure Reconciliation → Range Checks → Duplicate Guard →
//! Assembly → Insert
//!
//! The guard's read and the insert share one immediate transaction, so two
//! submissions for the same patient cannot both pass the guard.

mod assembly;
mod guard;

pub use assembly::*;
pub use guard::*;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::IntakeConfig;
use crate::db::{Database, DbError};
use crate::models::{Page, Triage, TriageSubmission};
use crate::validation::ValidationError;

/// Triage errors.
#[derive(Error, Debug)]
pub enum TriageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Patient not found: {0}")]
    PatientNotFound(i64),

    #[error("Triage not found: {0}")]
    TriageNotFound(i64),

    /// Retriable once the window has elapsed.
    #[error("Recent triage {last_triage_id} already recorded for patient {patient_id} (window {window_minutes} min)")]
    RecentDuplicate {
        patient_id: i64,
        last_triage_id: i64,
        window_minutes: i64,
    },

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type TriageResult<T> = Result<T, TriageError>;

/// Submits, fetches, lists and removes triages.
pub struct TriageService<'a> {
    db: &'a Database,
    guard: DuplicateGuard,
}

impl<'a> TriageService<'a> {
    /// Create a service with the default three-minute window.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            guard: DuplicateGuard::default(),
        }
    }

    /// Create a service with a custom duplicate window.
    pub fn with_window(db: &'a Database, window: Duration) -> Self {
        Self {
            db,
            guard: DuplicateGuard::new(window),
        }
    }

    pub fn from_config(db: &'a Database, config: &IntakeConfig) -> Self {
        Self::with_window(db, config.duplicate_window())
    }

    /// Validate and store a triage submitted now.
    pub fn submit_triage(&self, submission: TriageSubmission) -> TriageResult<Triage> {
        self.submit_triage_at(submission, Utc::now())
    }

    /// Validate and store a triage as if submitted at `now`.
    pub fn submit_triage_at(
        &self,
        submission: TriageSubmission,
        now: DateTime<Utc>,
    ) -> TriageResult<Triage> {
        let validated = validate_submission(&submission)?;
        let patient_id = validated.patient_id;

        self.db.write_locked(|db| {
            if db.get_patient(patient_id)?.is_none() {
                return Err(TriageError::PatientNotFound(patient_id));
            }

            let latest = db.get_most_recent_triage(patient_id)?;
            let decision = self.guard.check(latest.as_ref(), now);
            if let GuardDecision::Conflict {
                last_triage_id,
                elapsed,
            } = decision
            {
                warn!(
                    patient_id,
                    last_triage_id,
                    elapsed_secs = elapsed.num_seconds(),
                    "Rejected triage inside duplicate window"
                );
                return Err(TriageError::RecentDuplicate {
                    patient_id,
                    last_triage_id,
                    window_minutes: self.guard.window().num_minutes(),
                });
            }
            debug!(patient_id, ?decision, "Duplicate guard passed");

            let stored = db.insert_triage(&assemble(validated, now))?;
            info!(triage_id = stored.id, patient_id, "Triage stored");
            Ok(stored)
        })
    }

    /// Get a triage by ID.
    pub fn fetch_triage(&self, id: i64) -> TriageResult<Triage> {
        debug!(triage_id = id, "Fetching triage");
        self.db
            .get_triage(id)?
            .ok_or(TriageError::TriageNotFound(id))
    }

    /// List triages, optionally for one patient, latest measurement first.
    pub fn list_triages(&self, patient_id: Option<i64>, page: Page) -> TriageResult<Vec<Triage>> {
        let (limit, offset) = page.limit_offset()?;
        Ok(self.db.list_triages(patient_id, limit, offset)?)
    }

    /// Delete a triage.
    pub fn remove_triage(&self, id: i64) -> TriageResult<()> {
        if !self.db.delete_triage(id)? {
            return Err(TriageError::TriageNotFound(id));
        }
        info!(triage_id = id, "Triage removed");
        Ok(())
    }
}
