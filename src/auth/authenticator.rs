//! Credential checking for login.

use crate::audit::AuditLogger;
use crate::auth::password::verify_password;
use crate::db::{DbPool, User, UserRepository};
use crate::Result;

/// Checks credentials and records every attempt.
#[derive(Clone)]
pub struct Authenticator {
    pool: DbPool,
    audit: AuditLogger,
}

impl Authenticator {
    /// Create an authenticator over the user store.
    pub fn new(pool: DbPool, audit: AuditLogger) -> Self {
        Self { pool, audit }
    }

    /// Verify `username` / `password`.
    ///
    /// Returns the user on success and `None` on any mismatch. Exactly one
    /// login attempt is recorded per call; if that write fails the login
    /// fails with it. Unknown usernames return without hashing.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> Result<Option<User>> {
        let user = UserRepository::new(&self.pool)
            .get_by_username(username)
            .await?
            .filter(|user| verify_password(password, &user.password_hash));

        self.audit
            .record_login(
                user.as_ref().map(|u| u.id),
                username,
                ip_address,
                user_agent,
                user.is_some(),
            )
            .await?;

        Ok(user)
    }
}
