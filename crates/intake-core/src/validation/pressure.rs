//! Blood pressure parsing and reconciliation.
//!
//! Clients may send pressure as a composite `"120/80"` string, as separate
//! `systolic_mmHg`/`diastolic_mmHg` integers, or both. Reconciliation turns
//! whichever was supplied into one canonical string and refuses submissions
//! where the two forms disagree.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ValidationError, ValidationResult};

/// Lowest accepted systolic pressure (mmHg).
pub const SYSTOLIC_MIN: i64 = 60;
/// Highest accepted systolic pressure (mmHg).
pub const SYSTOLIC_MAX: i64 = 300;
/// Lowest accepted diastolic pressure (mmHg).
pub const DIASTOLIC_MIN: i64 = 30;
/// Highest accepted diastolic pressure (mmHg).
pub const DIASTOLIC_MAX: i64 = 200;

/// A range-checked blood pressure reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: i64,
    pub diastolic: i64,
}

impl BloodPressure {
    /// Build a reading, checking both components against their bounds.
    pub fn new(systolic: i64, diastolic: i64) -> ValidationResult<Self> {
        Ok(Self {
            systolic: check_systolic(systolic)?,
            diastolic: check_diastolic(diastolic)?,
        })
    }

    /// Canonical `"<systolic>/<diastolic>"` form.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

fn check_systolic(value: i64) -> ValidationResult<i64> {
    if !(SYSTOLIC_MIN..=SYSTOLIC_MAX).contains(&value) {
        return Err(ValidationError::range(
            "systolic_mmHg",
            format!("{value} not in [{SYSTOLIC_MIN}, {SYSTOLIC_MAX}]"),
        ));
    }
    Ok(value)
}

fn check_diastolic(value: i64) -> ValidationResult<i64> {
    if !(DIASTOLIC_MIN..=DIASTOLIC_MAX).contains(&value) {
        return Err(ValidationError::range(
            "diastolic_mmHg",
            format!("{value} not in [{DIASTOLIC_MIN}, {DIASTOLIC_MAX}]"),
        ));
    }
    Ok(value)
}

/// Parse a `"<systolic>/<diastolic>"` string into a range-checked reading.
pub fn parse_pressure(input: &str) -> ValidationResult<BloodPressure> {
    let parts: Vec<&str> = input.split('/').collect();
    let [systolic, diastolic] = parts.as_slice() else {
        return Err(ValidationError::format(
            "pressure",
            format!("expected \"<systolic>/<diastolic>\", got {input:?}"),
        ));
    };

    let parse = |part: &str| {
        part.trim().parse::<i64>().map_err(|_| {
            ValidationError::format("pressure", format!("{part:?} is not an integer"))
        })
    };

    BloodPressure::new(parse(*systolic)?, parse(*diastolic)?)
}

/// Validate a pressure string and return its canonical form.
///
/// `" 120 / 080"` becomes `"120/80"`.
pub fn validate_pressure(input: &str) -> ValidationResult<String> {
    parse_pressure(input).map(|bp| bp.canonical())
}

/// Outcome of reconciling the two pressure representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledPressure {
    /// The reading both representations agree on
    pub reading: BloodPressure,
    /// Whether the split integer fields were part of the submission
    pub from_components: bool,
}

impl ReconciledPressure {
    pub fn canonical(&self) -> String {
        self.reading.canonical()
    }
}

/// Resolve `pressure` and `systolic`/`diastolic` into one canonical reading.
///
/// A lone systolic or diastolic value is not a representation: without a
/// pressure string it reports missing pressure, next to one it is a format
/// error. Blank strings count as absent.
pub fn reconcile_pressure(
    pressure: Option<&str>,
    systolic: Option<i64>,
    diastolic: Option<i64>,
) -> ValidationResult<ReconciledPressure> {
    let pressure = pressure.map(str::trim).filter(|p| !p.is_empty());

    let components = match (systolic, diastolic) {
        (Some(s), Some(d)) => Some(BloodPressure::new(s, d)?),
        (None, None) => None,
        _ if pressure.is_none() => return Err(ValidationError::MissingPressure),
        _ => {
            return Err(ValidationError::format(
                "pressure",
                "systolic_mmHg and diastolic_mmHg must be supplied together",
            ))
        }
    };

    match (pressure, components) {
        (Some(text), None) => Ok(ReconciledPressure {
            reading: parse_pressure(text)?,
            from_components: false,
        }),
        (None, Some(reading)) => Ok(ReconciledPressure {
            reading,
            from_components: true,
        }),
        (Some(text), Some(reading)) => {
            let parsed = parse_pressure(text)?;
            if parsed != reading {
                return Err(ValidationError::Mismatch {
                    pressure: parsed.canonical(),
                    expected: reading.canonical(),
                });
            }
            Ok(ReconciledPressure {
                reading,
                from_components: true,
            })
        }
        (None, None) => Err(ValidationError::MissingPressure),
    }
}
