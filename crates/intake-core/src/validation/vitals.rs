//! Physiological range checks for triage measurements.

use super::{ValidationError, ValidationResult};

/// Maximum length of triage notes, in characters.
pub const NOTES_MAX_CHARS: usize = 2000;

/// Which end of a bound is included.
#[derive(Debug, Clone, Copy)]
enum Bound {
    Inclusive(f64),
    Exclusive(f64),
}

impl Bound {
    fn describe_lower(self) -> String {
        match self {
            Bound::Inclusive(v) => format!("[{v}"),
            Bound::Exclusive(v) => format!("({v}"),
        }
    }

    fn describe_upper(self) -> String {
        match self {
            Bound::Inclusive(v) => format!("{v}]"),
            Bound::Exclusive(v) => format!("{v})"),
        }
    }
}

fn check_range(field: &'static str, value: f64, lower: Bound, upper: Bound) -> ValidationResult<f64> {
    let above = match lower {
        Bound::Inclusive(min) => value >= min,
        Bound::Exclusive(min) => value > min,
    };
    let below = match upper {
        Bound::Inclusive(max) => value <= max,
        Bound::Exclusive(max) => value < max,
    };
    // NaN fails both comparisons
    if !(above && below) {
        return Err(ValidationError::range(
            field,
            format!(
                "{value} not in {}, {}",
                lower.describe_lower(),
                upper.describe_upper()
            ),
        ));
    }
    Ok(value)
}

/// Body weight in kg, in (0, 500].
pub fn check_weight_kg(value: f64) -> ValidationResult<f64> {
    check_range("weight_kg", value, Bound::Exclusive(0.0), Bound::Inclusive(500.0))
}

/// Height in cm, in (20, 300].
pub fn check_height_cm(value: f64) -> ValidationResult<f64> {
    check_range("height_cm", value, Bound::Exclusive(20.0), Bound::Inclusive(300.0))
}

/// Capillary glucose in mg/dL, in [0, 1000].
pub fn check_glucose_mg_dl(value: f64) -> ValidationResult<f64> {
    check_range("glucose_mg_dl", value, Bound::Inclusive(0.0), Bound::Inclusive(1000.0))
}

/// Heart rate in beats per minute, in (20, 250].
pub fn check_heart_rate_bpm(value: i64) -> ValidationResult<i64> {
    if value <= 20 || value > 250 {
        return Err(ValidationError::range(
            "heart_rate_bpm",
            format!("{value} not in (20, 250]"),
        ));
    }
    Ok(value)
}

/// Optional notes, kept verbatim; only their length is checked.
pub fn check_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    let len = notes.chars().count();
    if len > NOTES_MAX_CHARS {
        return Err(ValidationError::range(
            "notes",
            format!("{len} characters exceeds {NOTES_MAX_CHARS}"),
        ));
    }
    Ok(Some(notes.to_string()))
}
