//! Append-only storage for the audit trail.
//!
//! There is deliberately no update or delete here.

use super::types::{LoginAttempt, NewLoginAttempt, NewRequestRecord, RequestRecord};
use crate::db::DbPool;
use crate::{RecipeBoxError, Result};

/// Repository for login attempt records.
pub struct LoginLogRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> LoginLogRepository<'a> {
    /// Create a new LoginLogRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Append an attempt stamped with `created_at`.
    pub async fn insert(&self, attempt: &NewLoginAttempt<'_>, created_at: &str) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO login_log (user_id, username, ip_address, user_agent, success, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(attempt.user_id)
        .bind(attempt.username)
        .bind(attempt.ip_address)
        .bind(attempt.user_agent)
        .bind(attempt.success)
        .bind(created_at)
        .execute(self.pool)
        .await
        .map_err(|e| RecipeBoxError::Database(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    /// Count failed attempts from `ip_address` at or after `since`.
    pub async fn count_failed_since(&self, ip_address: &str, since: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM login_log
             WHERE ip_address = ? AND success = 0 AND created_at >= ?",
        )
        .bind(ip_address)
        .bind(since)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RecipeBoxError::Database(e.to_string()))?;
        Ok(count.0)
    }

    /// Most recent attempts, newest first.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<LoginAttempt>> {
        let attempts = sqlx::query_as::<_, LoginAttempt>(
            "SELECT id, user_id, username, ip_address, user_agent, success, created_at
             FROM login_log ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| RecipeBoxError::Database(e.to_string()))?;
        Ok(attempts)
    }
}

/// Repository for request records.
pub struct RequestLogRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> RequestLogRepository<'a> {
    /// Create a new RequestLogRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Append a request record.
    pub async fn insert(
        &self,
        record: &NewRequestRecord<'_>,
        is_suspicious: bool,
        created_at: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO request_log
                (ip_address, method, path, status_code, user_agent, is_suspicious, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.ip_address)
        .bind(record.method)
        .bind(record.path)
        .bind(i64::from(record.status_code))
        .bind(record.user_agent)
        .bind(is_suspicious)
        .bind(created_at)
        .execute(self.pool)
        .await
        .map_err(|e| RecipeBoxError::Database(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent requests, newest first.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<RequestRecord>> {
        let records = sqlx::query_as::<_, RequestRecord>(
            "SELECT id, ip_address, method, path, status_code, user_agent, is_suspicious, created_at
             FROM request_log ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| RecipeBoxError::Database(e.to_string()))?;
        Ok(records)
    }
}
