//! Property tests for blood pressure validation and reconciliation.

use proptest::prelude::*;
use triage_intake_core::validation::{
    reconcile_pressure, validate_pressure, ValidationError, DIASTOLIC_MAX, DIASTOLIC_MIN,
    SYSTOLIC_MAX, SYSTOLIC_MIN,
};

fn systolic() -> impl Strategy<Value = i64> {
    SYSTOLIC_MIN..=SYSTOLIC_MAX
}

fn diastolic() -> impl Strategy<Value = i64> {
    DIASTOLIC_MIN..=DIASTOLIC_MAX
}

proptest! {
    /// Every in-range reading is accepted and comes back unchanged
    #[test]
    fn valid_pressure_roundtrips(s in systolic(), d in diastolic()) {
        let input = format!("{s}/{d}");
        prop_assert_eq!(validate_pressure(&input).unwrap(), input);
    }

    /// Padding and surrounding whitespace never change the canonical form
    #[test]
    fn canonical_form_ignores_padding(s in systolic(), d in diastolic()) {
        let padded = format!(" {s:03} / {d:03} ");
        prop_assert_eq!(validate_pressure(&padded).unwrap(), format!("{s}/{d}"));
    }

    /// Either representation alone yields the same canonical string
    #[test]
    fn representations_agree(s in systolic(), d in diastolic()) {
        let text = format!("{s}/{d}");
        let from_string = reconcile_pressure(Some(&text), None, None).unwrap();
        let from_components = reconcile_pressure(None, Some(s), Some(d)).unwrap();

        prop_assert_eq!(from_string.canonical(), from_components.canonical());
        prop_assert!(!from_string.from_components);
        prop_assert!(from_components.from_components);
    }

    /// Both representations together must describe the same reading
    #[test]
    fn disagreeing_representations_rejected(
        s in systolic(),
        d in diastolic(),
        delta in 1i64..10,
    ) {
        let text = format!("{s}/{d}");
        let result = reconcile_pressure(Some(&text), Some(s), Some(d + delta));
        let is_mismatch = matches!(result, Err(ValidationError::Mismatch { .. }));
        let is_range = matches!(result, Err(ValidationError::Range { .. }));
        prop_assert!(is_mismatch || is_range, "unexpected {:?}", result);
    }

    /// Readings above the systolic ceiling are range errors, never format errors
    #[test]
    fn systolic_above_ceiling_rejected(s in (SYSTOLIC_MAX + 1)..1000, d in diastolic()) {
        let is_range = matches!(
            validate_pressure(&format!("{s}/{d}")),
            Err(ValidationError::Range { .. })
        );
        prop_assert!(is_range);
    }
}

#[test]
fn test_mismatch_example() {
    assert!(matches!(
        reconcile_pressure(Some("120/80"), Some(120), Some(81)),
        Err(ValidationError::Mismatch { .. })
    ));
}

#[test]
fn test_missing_example() {
    assert_eq!(
        reconcile_pressure(None, None, None).unwrap_err(),
        ValidationError::MissingPressure
    );
}
