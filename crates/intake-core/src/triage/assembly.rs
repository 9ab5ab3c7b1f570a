//! Turn a raw submission into a persistable triage.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::models::{NewTriage, TriageSubmission, TRIAGE_TIME_FORMAT};
use crate::validation::{
    check_glucose_mg_dl, check_heart_rate_bpm, check_height_cm, check_notes, check_weight_kg,
    reconcile_pressure, ReconciledPressure, ValidationError, ValidationResult,
};

/// A submission whose every field passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTriage {
    pub patient_id: i64,
    pub triage_date: NaiveDate,
    pub triage_time: NaiveTime,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub glucose_mg_dl: f64,
    pub heart_rate_bpm: i64,
    pub pressure: ReconciledPressure,
    pub fasting: bool,
    pub notes: Option<String>,
}

/// Reconcile blood pressure, then range-check the remaining vitals.
pub fn validate_submission(submission: &TriageSubmission) -> ValidationResult<ValidatedTriage> {
    let pressure = reconcile_pressure(
        submission.pressure.as_deref(),
        submission.systolic_mmhg,
        submission.diastolic_mmhg,
    )?;

    if submission.patient_id < 1 {
        return Err(ValidationError::range("patient_id", "must be at least 1"));
    }

    Ok(ValidatedTriage {
        patient_id: submission.patient_id,
        triage_date: submission.triage_date,
        triage_time: submission.triage_time,
        weight_kg: check_weight_kg(submission.weight_kg)?,
        height_cm: check_height_cm(submission.height_cm)?,
        glucose_mg_dl: check_glucose_mg_dl(submission.glucose_mg_dl)?,
        heart_rate_bpm: check_heart_rate_bpm(submission.heart_rate_bpm)?,
        pressure,
        fasting: submission.fasting,
        notes: check_notes(submission.notes.as_deref())?,
    })
}

/// Zero-padded 24-hour `HH:MM`; seconds and below are dropped.
pub fn format_triage_time(time: NaiveTime) -> String {
    time.format(TRIAGE_TIME_FORMAT).to_string()
}

/// Build the record to insert. The canonical pressure string replaces
/// whatever form the client used; split values are kept only when sent.
pub fn assemble(triage: ValidatedTriage, created_at: DateTime<Utc>) -> NewTriage {
    let (systolic_mmhg, diastolic_mmhg) = if triage.pressure.from_components {
        (
            Some(triage.pressure.reading.systolic),
            Some(triage.pressure.reading.diastolic),
        )
    } else {
        (None, None)
    };

    NewTriage {
        patient_id: triage.patient_id,
        triage_date: triage.triage_date,
        triage_time: format_triage_time(triage.triage_time),
        weight_kg: triage.weight_kg,
        height_cm: triage.height_cm,
        glucose_mg_dl: triage.glucose_mg_dl,
        heart_rate_bpm: triage.heart_rate_bpm,
        pressure: triage.pressure.canonical(),
        systolic_mmhg,
        diastolic_mmhg,
        fasting: triage.fasting,
        notes: triage.notes,
        created_at,
    }
}
