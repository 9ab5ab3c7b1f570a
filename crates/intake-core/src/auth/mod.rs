//! Staff registration, login and access tokens.

mod password;
mod token;

pub use password::*;
pub use token::*;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AuthConfig, ConfigError};
use crate::db::{Database, DbError};
use crate::models::{check_password, NewUser, Session, User};
use crate::validation::{normalize_email, ValidationError};

pub const TOKEN_TYPE: &str = "bearer";

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Name, e-mail or phone already taken.
    #[error("User already registered: {0}")]
    Conflict(String),

    /// Unknown e-mail or wrong password; deliberately indistinguishable.
    #[error("Invalid e-mail or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(DbError),
}

impl From<DbError> for AuthError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Conflict(msg) => AuthError::Conflict(msg),
            other => AuthError::Database(other),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Registers users, checks passwords and issues tokens.
pub struct AuthService<'a> {
    db: &'a Database,
    signer: TokenSigner,
    iterations: u32,
    /// Verified against when the e-mail is unknown.
    decoy_hash: String,
}

impl<'a> AuthService<'a> {
    /// Fails when the auth config is incomplete (e.g. no secret).
    pub fn new(db: &'a Database, config: &AuthConfig) -> AuthResult<Self> {
        config.validate()?;
        let signer = TokenSigner::new(
            config.secret_bytes()?,
            Duration::minutes(config.token_ttl_minutes),
        )
        .map_err(|e| ConfigError::Invalid(format!("auth.secret_key: {e}")))?;

        Ok(Self {
            db,
            signer,
            iterations: config.pbkdf2_iterations,
            decoy_hash: decoy_hash(config.pbkdf2_iterations),
        })
    }

    pub fn register(&self, new_user: NewUser) -> AuthResult<User> {
        let user = new_user.validate()?;
        let hash = hash_password(&user.password, self.iterations);
        let stored = self
            .db
            .insert_user(&user.name, &user.email, &user.phone, &hash)?;
        info!(user_id = stored.id, "User registered");
        Ok(stored)
    }

    pub fn login(&self, email: &str, password: &str) -> AuthResult<Session> {
        self.login_at(email, password, Utc::now())
    }

    pub fn login_at(&self, email: &str, password: &str, now: DateTime<Utc>) -> AuthResult<Session> {
        let email = normalize_email(email)?;
        check_password(password)?;

        // Unknown e-mails cost the same key derivation as wrong passwords
        let user = self.db.get_user_by_email(&email)?;
        let stored_hash = user
            .as_ref()
            .map_or(self.decoy_hash.as_str(), |u| u.password_hash.as_str());
        let password_ok = verify_password(password, stored_hash);

        let user = match user {
            Some(user) if password_ok => user,
            _ => {
                warn!("Rejected login");
                return Err(AuthError::InvalidCredentials);
            }
        };

        info!(user_id = user.id, "User logged in");
        Ok(Session {
            access_token: self.signer.issue(user.id, now),
            token_type: TOKEN_TYPE.to_string(),
            user,
        })
    }

    /// Resolve a token to the user it was issued for.
    pub fn verify_token(&self, token: &str) -> AuthResult<User> {
        self.verify_token_at(token, Utc::now())
    }

    pub fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<User> {
        let user_id = self
            .signer
            .verify(token, now)
            .ok_or(AuthError::InvalidToken)?;
        // Tokens of deleted users stop working
        self.db.get_user(user_id)?.ok_or(AuthError::InvalidToken)
    }

    pub fn delete_user(&self, id: i64) -> AuthResult<()> {
        if !self.db.delete_user(id)? {
            return Err(AuthError::UserNotFound(id));
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }
}
