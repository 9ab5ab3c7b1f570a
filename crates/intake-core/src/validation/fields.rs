//! Single-field normalizers.
//!
//! Handles:
//! - Birth dates (`DD/MM/YYYY` text or an already-parsed date)
//! - Brazilian phone numbers (canonical `+55` + 10/11 local digits)
//! - E-mail addresses (lower-cased, shape-checked)
//! - Bounded free-text fields (names, passwords)

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{ValidationError, ValidationResult};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9\-]+(\.[a-z0-9\-]+)*\.[a-z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// A birth date as it arrives from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BirthDateInput {
    /// Already structured (ISO `YYYY-MM-DD` on the wire)
    Date(NaiveDate),
    /// Free text, expected as `DD/MM/YYYY`
    Text(String),
}

impl From<NaiveDate> for BirthDateInput {
    fn from(date: NaiveDate) -> Self {
        BirthDateInput::Date(date)
    }
}

impl From<&str> for BirthDateInput {
    fn from(text: &str) -> Self {
        BirthDateInput::Text(text.to_string())
    }
}

impl From<String> for BirthDateInput {
    fn from(text: String) -> Self {
        BirthDateInput::Text(text)
    }
}

/// Parse a birth date.
///
/// Absent or blank input yields `None`, a structured date passes through and
/// text must be a real calendar date written as `DD/MM/YYYY`.
pub fn parse_birth_date(input: Option<BirthDateInput>) -> ValidationResult<Option<NaiveDate>> {
    match input {
        None => Ok(None),
        Some(BirthDateInput::Date(date)) => Ok(Some(date)),
        Some(BirthDateInput::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            NaiveDate::parse_from_str(text, "%d/%m/%Y")
                .map(Some)
                .map_err(|e| {
                    ValidationError::format("birth_date", format!("expected DD/MM/YYYY ({e})"))
                })
        }
    }
}

/// Normalize a Brazilian phone number to `+55` followed by 10 or 11 digits.
pub fn normalize_phone_br(input: &str) -> ValidationResult<String> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(ValidationError::EmptyPhone);
    }

    let mut local = if let Some(rest) = digits.strip_prefix("0055") {
        rest
    } else if let Some(rest) = digits.strip_prefix("55") {
        rest
    } else {
        digits.as_str()
    };

    // Carrier-selection zero
    if let Some(rest) = local.strip_prefix('0') {
        if matches!(rest.len(), 10 | 11) {
            local = rest;
        }
    }

    if !matches!(local.len(), 10 | 11) {
        return Err(ValidationError::InvalidPhone(format!(
            "expected 10 or 11 local digits, got {}",
            local.len()
        )));
    }

    Ok(format!("+55{local}"))
}

/// Lower-case and shape-check an e-mail address.
pub fn normalize_email(input: &str) -> ValidationResult<String> {
    let email = input.trim().to_lowercase();
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(ValidationError::format("email", "not a valid e-mail address"));
    }
    Ok(email)
}

/// Trim a text field and check its length in characters.
pub fn bounded_text(
    field: &'static str,
    input: &str,
    min: usize,
    max: usize,
) -> ValidationResult<String> {
    let text = input.trim();
    let len = text.chars().count();
    if len < min || len > max {
        return Err(ValidationError::range(
            field,
            format!("length must be between {min} and {max} characters, got {len}"),
        ));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_birth_date_absent_or_blank() {
        assert_eq!(parse_birth_date(None).unwrap(), None);
        assert_eq!(parse_birth_date(Some("".into())).unwrap(), None);
        assert_eq!(parse_birth_date(Some("   ".into())).unwrap(), None);
    }

    #[test]
    fn test_birth_date_passthrough() {
        let date = NaiveDate::from_ymd_opt(1990, 7, 15).unwrap();
        assert_eq!(parse_birth_date(Some(date.into())).unwrap(), Some(date));
    }

    #[test]
    fn test_birth_date_leap_day() {
        let parsed = parse_birth_date(Some("29/02/2020".into())).unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2020, 2, 29));
    }

    #[test]
    fn test_birth_date_impossible_day() {
        let err = parse_birth_date(Some("31/02/2020".into())).unwrap_err();
        assert!(matches!(err, ValidationError::Format { field: "birth_date", .. }));
    }

    #[test]
    fn test_birth_date_iso_text_rejected() {
        let err = parse_birth_date(Some("2020-02-29".into())).unwrap_err();
        assert!(matches!(err, ValidationError::Format { .. }));
    }

    #[test]
    fn test_birth_date_json_forms() {
        let iso: BirthDateInput = serde_json::from_str(r#""2001-03-09""#).unwrap();
        assert_eq!(iso, BirthDateInput::Date(NaiveDate::from_ymd_opt(2001, 3, 9).unwrap()));

        let text: BirthDateInput = serde_json::from_str(r#""09/03/2001""#).unwrap();
        assert_eq!(text, BirthDateInput::Text("09/03/2001".into()));
    }

    #[test]
    fn test_phone_with_country_code() {
        assert_eq!(
            normalize_phone_br("+55 (92) 98424-4668").unwrap(),
            "+5592984244668"
        );
        assert_eq!(normalize_phone_br("559298424668").unwrap(), "+559298424668");
    }

    #[test]
    fn test_phone_international_prefix() {
        assert_eq!(normalize_phone_br("0055 11 91234-5678").unwrap(), "+5511912345678");
    }

    #[test]
    fn test_phone_carrier_zero() {
        assert_eq!(normalize_phone_br("0 92 98424-4668").unwrap(), "+5592984244668");
        assert_eq!(normalize_phone_br("(092) 3234-5678").unwrap(), "+559232345678");
    }

    #[test]
    fn test_phone_without_country_code() {
        assert_eq!(normalize_phone_br("(11) 3456-7890").unwrap(), "+551134567890");
    }

    #[test]
    fn test_phone_empty() {
        assert_eq!(normalize_phone_br("").unwrap_err(), ValidationError::EmptyPhone);
        assert_eq!(normalize_phone_br("() - +").unwrap_err(), ValidationError::EmptyPhone);
    }

    #[test]
    fn test_phone_wrong_length() {
        assert!(matches!(
            normalize_phone_br("12345").unwrap_err(),
            ValidationError::InvalidPhone(_)
        ));
        assert!(matches!(
            normalize_phone_br("+55 92 98424-46681234").unwrap_err(),
            ValidationError::InvalidPhone(_)
        ));
    }

    #[test]
    fn test_email_normalized() {
        assert_eq!(
            normalize_email("  Maria.Silva@Example.COM ").unwrap(),
            "maria.silva@example.com"
        );
    }

    #[test]
    fn test_email_rejected() {
        for bad in ["", "maria", "maria@", "@example.com", "maria@example", "ma ria@example.com"] {
            assert!(normalize_email(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_bounded_text() {
        assert_eq!(bounded_text("name", "  Maria  ", 3, 10).unwrap(), "Maria");
        assert!(bounded_text("name", "Al", 3, 10).is_err());
        assert!(bounded_text("name", "João Çãoéí", 3, 10).is_ok());
    }
}
