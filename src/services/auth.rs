//! Password hashing, login sessions and role checks
//!
//! Passwords are stored as Argon2id PHC strings. A successful login writes a
//! session file whose lifetime depends on the user's type; commands read it
//! back to find out who is acting and whether their type is allowed.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::paths::LedgerPaths;
use crate::config::settings::SessionSettings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{AccessPolicy, User, UserId, UserType};
use crate::storage::{read_json, write_json_atomic};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password with Argon2id and a fresh random salt
pub fn hash_password(password: &str) -> LedgerResult<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(LedgerError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LedgerError::Auth(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, stored_hash: &str) -> LedgerResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| LedgerError::Auth(format!("Stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// The logged-in user, as persisted in `session.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub user_type: UserType,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session for `user` starting at `now`; admins get the longer lifetime
    pub fn issue(user: &User, lifetimes: &SessionSettings, now: DateTime<Utc>) -> Self {
        let minutes = if user.is_admin() {
            lifetimes.admin_ttl_minutes
        } else {
            lifetimes.user_ttl_minutes
        };
        Self {
            user_id: user.id,
            email: user.email.clone(),
            user_type: user.user_type,
            issued_at: now,
            expires_at: now + Duration::minutes(minutes),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Session file access
pub struct SessionStore<'a> {
    paths: &'a LedgerPaths,
}

impl<'a> SessionStore<'a> {
    pub fn new(paths: &'a LedgerPaths) -> Self {
        Self { paths }
    }

    pub fn save(&self, session: &Session) -> LedgerResult<()> {
        write_json_atomic(self.paths.session_file(), session)
    }

    /// The active session, if any; an expired session file is removed
    pub fn current(&self, now: DateTime<Utc>) -> LedgerResult<Option<Session>> {
        let session: Option<Session> = read_json(self.paths.session_file())?;
        match session {
            Some(s) if s.is_expired(now) => {
                tracing::debug!(email = %s.email, "session expired");
                self.clear()?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Remove the session file; returns whether there was one
    pub fn clear(&self) -> LedgerResult<bool> {
        let path = self.paths.session_file();
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)
            .map_err(|e| LedgerError::Io(format!("Failed to remove session file: {}", e)))?;
        Ok(true)
    }
}

/// Require a session whose user type the policy admits
pub fn authorize(session: Option<&Session>, policy: AccessPolicy) -> LedgerResult<&Session> {
    let session = session
        .ok_or_else(|| LedgerError::Unauthorized("Log in first with `ledger user login`".into()))?;

    if !policy.allows(session.user_type) {
        return Err(LedgerError::Forbidden(format!(
            "{} users may not do this (requires {})",
            session.user_type, policy
        )));
    }

    Ok(session)
}
