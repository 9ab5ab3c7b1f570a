//! Triage models: one vital-signs snapshot per record.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored textual format of the triage wall-clock time.
pub const TRIAGE_TIME_FORMAT: &str = "%H:%M";

/// Triage payload as received from a client.
///
/// Blood pressure may come as `pressure` (`"120/80"`), as the split
/// `systolic_mmHg`/`diastolic_mmHg` integers, or both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriageSubmission {
    pub patient_id: i64,
    pub triage_date: NaiveDate,
    pub triage_time: NaiveTime,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub glucose_mg_dl: f64,
    pub heart_rate_bpm: i64,
    #[serde(default)]
    pub pressure: Option<String>,
    #[serde(default, rename = "systolic_mmHg")]
    pub systolic_mmhg: Option<i64>,
    #[serde(default, rename = "diastolic_mmHg")]
    pub diastolic_mmhg: Option<i64>,
    pub fasting: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An assembled triage, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTriage {
    pub patient_id: i64,
    pub triage_date: NaiveDate,
    /// Zero-padded 24-hour `HH:MM`
    pub triage_time: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub glucose_mg_dl: f64,
    pub heart_rate_bpm: i64,
    /// Canonical `"<systolic>/<diastolic>"`
    pub pressure: String,
    pub systolic_mmhg: Option<i64>,
    pub diastolic_mmhg: Option<i64>,
    pub fasting: bool,
    pub notes: Option<String>,
    /// Server-side creation time
    pub created_at: DateTime<Utc>,
}

/// A stored triage record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Triage {
    pub id: i64,
    pub patient_id: i64,
    pub triage_date: NaiveDate,
    pub triage_time: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub glucose_mg_dl: f64,
    pub heart_rate_bpm: i64,
    pub pressure: String,
    #[serde(rename = "systolic_mmHg")]
    pub systolic_mmhg: Option<i64>,
    #[serde(rename = "diastolic_mmHg")]
    pub diastolic_mmhg: Option<i64>,
    pub fasting: bool,
    pub notes: Option<String>,
    /// Absent only on rows imported without one
    pub created_at: Option<DateTime<Utc>>,
}

impl Triage {
    /// When this triage happened, for duplicate detection.
    ///
    /// The creation timestamp is authoritative; the recorded date and time
    /// (read as UTC) are used only when it is missing.
    pub fn effective_timestamp(&self) -> Option<DateTime<Utc>> {
        if let Some(created_at) = self.created_at {
            return Some(created_at);
        }
        NaiveTime::parse_from_str(&self.triage_time, TRIAGE_TIME_FORMAT)
            .ok()
            .map(|time| self.triage_date.and_time(time).and_utc())
    }
}
