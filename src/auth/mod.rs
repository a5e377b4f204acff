//! Account registration, credential checks, and login sessions.

mod password;
mod session;

use thiserror::Error;

use crate::store::{RecordStore, StoreError, UserRecord};

pub use password::PasswordHash;
pub use session::SessionTable;

/// Default minimum password length in characters.
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 8;

/// Rules applied to new passwords at registration.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    /// Minimum length in characters (not bytes).
    pub min_len: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

impl PasswordPolicy {
    /// Checks `password` against the policy.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordTooShort` if the password has fewer than
    /// `min_len` characters.
    pub fn check(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_len {
            return Err(AuthError::PasswordTooShort {
                min_len: self.min_len,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user id must not be empty")]
    EmptyUserId,
    #[error("user already exists")]
    UserExists,
    #[error("password too short (minimum {min_len} characters)")]
    PasswordTooShort { min_len: usize },
    #[error("invalid credentials or user not found")]
    InvalidCredentials,
    #[error("user \"{0}\" is not registered")]
    UnknownUser(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Creates a new account.
///
/// An existing user id is reported before the password is checked.
///
/// # Errors
///
/// Returns `EmptyUserId`, `UserExists`, `PasswordTooShort`, or a wrapped
/// store error.
pub fn register(
    store: &dyn RecordStore,
    user_id: &str,
    password: &str,
    policy: &PasswordPolicy,
) -> Result<(), AuthError> {
    if user_id.trim().is_empty() {
        return Err(AuthError::EmptyUserId);
    }
    if store.user_exists(user_id)? {
        return Err(AuthError::UserExists);
    }
    policy.check(password)?;

    store.upsert_user(UserRecord {
        user_id: user_id.to_string(),
        password: PasswordHash::generate(password),
    })?;
    tracing::info!(user_id, "registered user");
    Ok(())
}

/// Verifies a user's credentials.
///
/// # Errors
///
/// Returns `InvalidCredentials` for an unknown user or a wrong password.
pub fn login(store: &dyn RecordStore, user_id: &str, password: &str) -> Result<(), AuthError> {
    match store.find_user(user_id)? {
        Some(user) if user.password.verify(password) => {
            tracing::info!(user_id, "login succeeded");
            Ok(())
        }
        _ => {
            tracing::warn!(user_id, "login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Fails unless `user_id` has an account.
///
/// # Errors
///
/// Returns `UnknownUser`, or a wrapped store error.
pub fn ensure_registered(store: &dyn RecordStore, user_id: &str) -> Result<(), AuthError> {
    if store.user_exists(user_id)? {
        Ok(())
    } else {
        Err(AuthError::UnknownUser(user_id.to_string()))
    }
}
