//! Triage Intake Core Library
//!
//! Patient registration, vital-signs triage intake and staff authentication
//! for a clinic front desk.
//!
//! # Architecture
//!
//! ```text
//! Client submission
//!        │
//!        ▼
//! Pressure Reconciliation ── string and/or systolic/diastolic → "S/D"
//!        │
//!        ▼
//!   Range Checks ─────────── weight, height, glucose, heart rate, notes
//!        │
//!        ▼
//! ┌──────────────────────── BEGIN IMMEDIATE ───────────────────────┐
//! │  Patient lookup → Duplicate Guard (latest triage, 3 min window) │
//! │                         │                                       │
//! │                         ▼                                       │
//! │                 Assembly → Insert                               │
//! └──────────────────────────── COMMIT ────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`validation`]: field validators, vitals ranges, pressure reconciliation
//! - [`models`]: domain types (Patient, Triage, User, Page)
//! - [`db`]: SQLite schema, repositories and ordering policies
//! - [`triage`]: duplicate guard, assembly and the triage service
//! - [`patients`]: patient registry
//! - [`auth`]: password hashing, access tokens and the auth service
//! - [`config`]: JSON configuration and startup validation
//! - [`telemetry`]: tracing subscriber setup

pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod patients;
pub mod telemetry;
pub mod triage;
pub mod validation;

// Re-export commonly used types
pub use auth::{AuthError, AuthService};
pub use config::{AuthConfig, ConfigError, IntakeConfig};
pub use db::Database;
pub use models::{
    NewUser, Page, Patient, PatientDraft, PatientUpdate, Session, Triage, TriageSubmission, User,
};
pub use patients::{PatientError, PatientService};
pub use triage::{DuplicateGuard, GuardDecision, TriageError, TriageService};
pub use validation::ValidationError;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime, SecondsFormat};
use validation::BirthDateInput;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum IntakeError {
    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Out of range: {0}")]
    Range(String),

    #[error("Pressure mismatch: {0}")]
    Mismatch(String),

    #[error("Missing pressure: {0}")]
    MissingPressure(String),

    #[error("Invalid phone: {0}")]
    InvalidPhone(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Triage not found: {0}")]
    TriageNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Recent duplicate: {0}")]
    RecentDuplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<ValidationError> for IntakeError {
    fn from(e: ValidationError) -> Self {
        let msg = e.to_string();
        match e {
            ValidationError::Format { .. } => IntakeError::Format(msg),
            ValidationError::Range { .. } => IntakeError::Range(msg),
            ValidationError::Mismatch { .. } => IntakeError::Mismatch(msg),
            ValidationError::MissingPressure => IntakeError::MissingPressure(msg),
            ValidationError::EmptyPhone | ValidationError::InvalidPhone(_) => {
                IntakeError::InvalidPhone(msg)
            }
        }
    }
}

impl From<db::DbError> for IntakeError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::Conflict(msg) => IntakeError::Conflict(msg),
            other => IntakeError::Database(other.to_string()),
        }
    }
}

impl From<TriageError> for IntakeError {
    fn from(e: TriageError) -> Self {
        let msg = e.to_string();
        match e {
            TriageError::Validation(v) => v.into(),
            TriageError::PatientNotFound(_) => IntakeError::PatientNotFound(msg),
            TriageError::TriageNotFound(_) => IntakeError::TriageNotFound(msg),
            TriageError::RecentDuplicate { .. } => IntakeError::RecentDuplicate(msg),
            TriageError::Database(db) => db.into(),
        }
    }
}

impl From<PatientError> for IntakeError {
    fn from(e: PatientError) -> Self {
        let msg = e.to_string();
        match e {
            PatientError::Validation(v) => v.into(),
            PatientError::NotFound(_) => IntakeError::PatientNotFound(msg),
            PatientError::Conflict(_) => IntakeError::Conflict(msg),
            PatientError::Database(db) => db.into(),
        }
    }
}

impl From<AuthError> for IntakeError {
    fn from(e: AuthError) -> Self {
        let msg = e.to_string();
        match e {
            AuthError::Validation(v) => v.into(),
            AuthError::Conflict(_) => IntakeError::Conflict(msg),
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                IntakeError::Unauthorized(msg)
            }
            AuthError::UserNotFound(_) => IntakeError::UserNotFound(msg),
            AuthError::Config(_) => IntakeError::Config(msg),
            AuthError::Database(db) => db.into(),
        }
    }
}

impl From<ConfigError> for IntakeError {
    fn from(e: ConfigError) -> Self {
        IntakeError::Config(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for IntakeError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        IntakeError::Database(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the service from a JSON configuration document.
#[uniffi::export]
pub fn open_intake(config_json: String) -> Result<Arc<IntakeCore>, IntakeError> {
    let config = IntakeConfig::from_json_str(&config_json)?;
    IntakeCore::open(config)
}

/// Open an in-memory service (for testing).
#[uniffi::export]
pub fn open_intake_in_memory(secret_key: String) -> Result<Arc<IntakeCore>, IntakeError> {
    let config = IntakeConfig {
        auth: AuthConfig::with_secret(secret_key),
        ..IntakeConfig::default()
    };
    config.validate()?;
    IntakeCore::open(config)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe service handle for FFI.
#[derive(uniffi::Object)]
pub struct IntakeCore {
    db: Arc<Mutex<Database>>,
    config: IntakeConfig,
}

impl IntakeCore {
    /// Open the configured database; `config` must already be validated.
    pub fn open(config: IntakeConfig) -> Result<Arc<Self>, IntakeError> {
        telemetry::init_tracing(&config.log_filter);

        let db = match &config.database_path {
            Some(path) => Database::open_with_timeout(path, config.busy_timeout())?,
            None => Database::open_in_memory()?,
        };
        Ok(Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        }))
    }
}

#[uniffi::export]
impl IntakeCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient.
    pub fn create_patient(&self, input: FfiPatientInput) -> Result<FfiPatient, IntakeError> {
        let db = self.db.lock()?;
        let patient = PatientService::new(&db).create_patient(input.into())?;
        Ok(patient.into())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: i64) -> Result<FfiPatient, IntakeError> {
        let db = self.db.lock()?;
        Ok(PatientService::new(&db).get_patient(id)?.into())
    }

    /// List patients by ascending ID.
    pub fn list_patients(&self, page: u32, size: u32) -> Result<Vec<FfiPatient>, IntakeError> {
        let db = self.db.lock()?;
        let patients = PatientService::new(&db).list_patients(Page::new(page, size))?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Search patients by name.
    pub fn search_patients(&self, query: String) -> Result<Vec<FfiPatient>, IntakeError> {
        let db = self.db.lock()?;
        let patients = PatientService::new(&db).search_patients(&query)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Apply a partial update to a patient.
    pub fn update_patient(
        &self,
        id: i64,
        update: FfiPatientUpdate,
    ) -> Result<FfiPatient, IntakeError> {
        let db = self.db.lock()?;
        let patient = PatientService::new(&db).update_patient(id, update.into())?;
        Ok(patient.into())
    }

    /// Delete a patient and all of their triages.
    pub fn delete_patient(&self, id: i64) -> Result<(), IntakeError> {
        let db = self.db.lock()?;
        Ok(PatientService::new(&db).delete_patient(id)?)
    }

    // =========================================================================
    // Triage Operations
    // =========================================================================

    /// Validate and store a triage.
    pub fn submit_triage(&self, submission: FfiTriageSubmission) -> Result<FfiTriage, IntakeError> {
        let submission = TriageSubmission::try_from(submission)?;
        let db = self.db.lock()?;
        let triage = TriageService::from_config(&db, &self.config).submit_triage(submission)?;
        Ok(triage.into())
    }

    /// Get a triage by ID.
    pub fn get_triage(&self, id: i64) -> Result<FfiTriage, IntakeError> {
        let db = self.db.lock()?;
        Ok(TriageService::from_config(&db, &self.config)
            .fetch_triage(id)?
            .into())
    }

    /// List triages, optionally for one patient, latest measurement first.
    pub fn list_triages(
        &self,
        patient_id: Option<i64>,
        page: u32,
        size: u32,
    ) -> Result<Vec<FfiTriage>, IntakeError> {
        let db = self.db.lock()?;
        let triages = TriageService::from_config(&db, &self.config)
            .list_triages(patient_id, Page::new(page, size))?;
        Ok(triages.into_iter().map(|t| t.into()).collect())
    }

    /// Delete a triage.
    pub fn delete_triage(&self, id: i64) -> Result<(), IntakeError> {
        let db = self.db.lock()?;
        Ok(TriageService::from_config(&db, &self.config).remove_triage(id)?)
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Register a staff user.
    pub fn register_user(&self, input: FfiNewUser) -> Result<FfiUser, IntakeError> {
        let db = self.db.lock()?;
        let user = AuthService::new(&db, &self.config.auth)?.register(input.into())?;
        Ok(user.into())
    }

    /// Exchange e-mail and password for an access token.
    pub fn login(&self, email: String, password: String) -> Result<FfiSession, IntakeError> {
        let db = self.db.lock()?;
        let session = AuthService::new(&db, &self.config.auth)?.login(&email, &password)?;
        Ok(session.into())
    }

    /// Resolve an access token to its user.
    pub fn verify_token(&self, token: String) -> Result<FfiUser, IntakeError> {
        let db = self.db.lock()?;
        let user = AuthService::new(&db, &self.config.auth)?.verify_token(&token)?;
        Ok(user.into())
    }

    /// Delete a staff user.
    pub fn delete_user(&self, id: i64) -> Result<(), IntakeError> {
        let db = self.db.lock()?;
        Ok(AuthService::new(&db, &self.config.auth)?.delete_user(id)?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

const FFI_DATE_FORMAT: &str = "%Y-%m-%d";

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: i64,
    pub name: String,
    /// `YYYY-MM-DD`
    pub birth_date: Option<String>,
    pub email: String,
    pub phone: String,
    /// RFC 3339
    pub created_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            birth_date: patient
                .birth_date
                .map(|d| d.format(FFI_DATE_FORMAT).to_string()),
            email: patient.email,
            phone: patient.phone,
            created_at: patient.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// FFI-safe patient registration.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientInput {
    pub name: String,
    /// `DD/MM/YYYY`
    pub birth_date: Option<String>,
    pub email: String,
    pub phone: String,
}

impl From<FfiPatientInput> for PatientDraft {
    fn from(input: FfiPatientInput) -> Self {
        PatientDraft {
            name: input.name,
            birth_date: input.birth_date.map(BirthDateInput::Text),
            email: input.email,
            phone: input.phone,
        }
    }
}

/// FFI-safe partial patient update.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientUpdate {
    pub name: Option<String>,
    /// `DD/MM/YYYY`; blank clears the stored date
    pub birth_date: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<FfiPatientUpdate> for PatientUpdate {
    fn from(update: FfiPatientUpdate) -> Self {
        PatientUpdate {
            name: update.name,
            birth_date: update.birth_date.map(BirthDateInput::Text),
            email: update.email,
            phone: update.phone,
        }
    }
}

/// FFI-safe triage submission.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTriageSubmission {
    pub patient_id: i64,
    /// `YYYY-MM-DD`
    pub triage_date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub triage_time: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub glucose_mg_dl: f64,
    pub heart_rate_bpm: i64,
    pub pressure: Option<String>,
    pub systolic_mmhg: Option<i64>,
    pub diastolic_mmhg: Option<i64>,
    pub fasting: bool,
    pub notes: Option<String>,
}

impl TryFrom<FfiTriageSubmission> for TriageSubmission {
    type Error = ValidationError;

    fn try_from(sub: FfiTriageSubmission) -> Result<Self, Self::Error> {
        let triage_date = NaiveDate::parse_from_str(sub.triage_date.trim(), FFI_DATE_FORMAT)
            .map_err(|_| ValidationError::format("triage_date", "expected YYYY-MM-DD"))?;
        let time = sub.triage_time.trim();
        let triage_time = NaiveTime::parse_from_str(time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
            .map_err(|_| ValidationError::format("triage_time", "expected HH:MM"))?;

        Ok(TriageSubmission {
            patient_id: sub.patient_id,
            triage_date,
            triage_time,
            weight_kg: sub.weight_kg,
            height_cm: sub.height_cm,
            glucose_mg_dl: sub.glucose_mg_dl,
            heart_rate_bpm: sub.heart_rate_bpm,
            pressure: sub.pressure,
            systolic_mmhg: sub.systolic_mmhg,
            diastolic_mmhg: sub.diastolic_mmhg,
            fasting: sub.fasting,
            notes: sub.notes,
        })
    }
}

/// FFI-safe stored triage.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTriage {
    pub id: i64,
    pub patient_id: i64,
    pub triage_date: String,
    pub triage_time: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub glucose_mg_dl: f64,
    pub heart_rate_bpm: i64,
    pub pressure: String,
    pub systolic_mmhg: Option<i64>,
    pub diastolic_mmhg: Option<i64>,
    pub fasting: bool,
    pub notes: Option<String>,
    pub created_at: Option<String>,
}

impl From<Triage> for FfiTriage {
    fn from(triage: Triage) -> Self {
        Self {
            id: triage.id,
            patient_id: triage.patient_id,
            triage_date: triage.triage_date.format(FFI_DATE_FORMAT).to_string(),
            triage_time: triage.triage_time,
            weight_kg: triage.weight_kg,
            height_cm: triage.height_cm,
            glucose_mg_dl: triage.glucose_mg_dl,
            heart_rate_bpm: triage.heart_rate_bpm,
            pressure: triage.pressure,
            systolic_mmhg: triage.systolic_mmhg,
            diastolic_mmhg: triage.diastolic_mmhg,
            fasting: triage.fasting,
            notes: triage.notes,
            created_at: triage
                .created_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

/// FFI-safe staff registration.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl From<FfiNewUser> for NewUser {
    fn from(user: FfiNewUser) -> Self {
        NewUser {
            name: user.name,
            email: user.email,
            phone: user.phone,
            password: user.password,
        }
    }
}

/// FFI-safe staff user; never carries the password hash.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<User> for FfiUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
        }
    }
}

/// FFI-safe login result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSession {
    pub access_token: String,
    pub token_type: String,
    pub user: FfiUser,
}

impl From<Session> for FfiSession {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.access_token,
            token_type: session.token_type,
            user: session.user.into(),
        }
    }
}
