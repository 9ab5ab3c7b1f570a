//! Staff user models.

use serde::{Deserialize, Serialize};

use crate::validation::{
    bounded_text, normalize_email, normalize_phone_br, ValidationError, ValidationResult,
};

/// A staff user. The password hash never leaves the crate in serialized form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    /// Unique display name
    pub name: String,
    /// Lower-cased e-mail, unique
    pub email: String,
    /// Canonical `+55…` phone, unique
    pub phone: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// A registration whose fields passed validation. The password is still plain.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl NewUser {
    pub fn validate(self) -> ValidationResult<ValidatedUser> {
        Ok(ValidatedUser {
            name: bounded_text("name", &self.name, 3, 50)?,
            email: normalize_email(&self.email)?,
            phone: normalize_phone_br(&self.phone)?,
            password: check_password(&self.password)?,
        })
    }
}

/// Passwords are 6 to 72 characters and kept verbatim (no trimming).
pub fn check_password(password: &str) -> ValidationResult<String> {
    let len = password.chars().count();
    if !(6..=72).contains(&len) {
        return Err(ValidationError::range(
            "password",
            format!("length must be between 6 and 72 characters, got {len}"),
        ));
    }
    Ok(password.to_string())
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}
