//! Failed-login counting and temporary account locks.

use jiff::{SignedDuration, Timestamp};
use psyscale_core::models::User;

use crate::error::AuthError;
use crate::password::verify_password;

#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Consecutive failures that lock the account.
    pub max_attempts: u32,
    /// How long a lock lasts before the next attempt clears it.
    pub unlock_after: SignedDuration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            unlock_after: SignedDuration::from_hours(1),
        }
    }
}

impl LockoutPolicy {
    pub fn locked_until(&self, user: &User) -> Option<Timestamp> {
        user.locked_at.map(|at| at + self.unlock_after)
    }

    pub fn is_locked(&self, user: &User, now: Timestamp) -> bool {
        self.locked_until(user).is_some_and(|until| now < until)
    }
}

/// Check `password` against `user`, updating the failure counter and lock in
/// place. The caller persists `user` whatever the outcome.
pub fn attempt_login(
    user: &mut User,
    password: &str,
    policy: &LockoutPolicy,
    now: Timestamp,
) -> Result<(), AuthError> {
    if let Some(until) = policy.locked_until(user) {
        if now < until {
            return Err(AuthError::Locked { until });
        }
        user.locked_at = None;
        user.failed_attempts = 0;
    }

    if verify_password(password, &user.password_hash)? {
        user.failed_attempts = 0;
        user.updated_at = now;
        return Ok(());
    }

    user.failed_attempts += 1;
    user.updated_at = now;
    if user.failed_attempts >= policy.max_attempts {
        user.locked_at = Some(now);
        tracing::warn!(user_id = %user.id, attempts = user.failed_attempts, "account locked");
        return Err(AuthError::Locked {
            until: now + policy.unlock_after,
        });
    }

    Err(AuthError::InvalidCredentials)
}
