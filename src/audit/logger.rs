//! Audit logger: stamps and appends login and request records.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::repository::{LoginLogRepository, RequestLogRepository};
use super::types::{LoginAttempt, NewLoginAttempt, NewRequestRecord, RequestRecord};
use crate::clock::{format_timestamp, Clock};
use crate::db::DbPool;
use crate::Result;

/// Path fragments of common scanner and exploit probes.
pub const SUSPICIOUS_PATH_FRAGMENTS: &[&str] = &[
    "/wp-admin",
    "/admin.php",
    "/config.php",
    "/autodiscover",
    "/.env",
    "/phpmyadmin",
];

/// Whether `path` looks like a scanner probe.
///
/// Advisory only: flagged requests are still served.
///
/// ```
/// use recipebox::audit::is_suspicious_path;
///
/// assert!(is_suspicious_path("/WP-Admin/setup.php"));
/// assert!(!is_suspicious_path("/recipes/5"));
/// ```
pub fn is_suspicious_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    SUSPICIOUS_PATH_FRAGMENTS
        .iter()
        .any(|fragment| lower.contains(fragment))
}

/// Writes the audit trail.
#[derive(Clone)]
pub struct AuditLogger {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl AuditLogger {
    /// Create a logger writing to `pool`, stamping records with `clock`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Append a login attempt.
    ///
    /// Callers must treat an error as a failed login: the brute-force
    /// guard is only as good as this trail.
    pub async fn record_login(
        &self,
        user_id: Option<i64>,
        username: &str,
        ip_address: &str,
        user_agent: Option<&str>,
        success: bool,
    ) -> Result<()> {
        let attempt = NewLoginAttempt {
            user_id,
            username,
            ip_address,
            user_agent,
            success,
        };
        let created_at = format_timestamp(&self.clock.now());
        LoginLogRepository::new(&self.pool)
            .insert(&attempt, &created_at)
            .await?;

        if success {
            info!(username = %username, ip = %ip_address, "Login succeeded");
        } else {
            warn!(username = %username, ip = %ip_address, "Login failed");
        }
        Ok(())
    }

    /// Append a request record, flagging scanner probes.
    pub async fn record_request(
        &self,
        ip_address: &str,
        method: &str,
        path: &str,
        status_code: u16,
        user_agent: Option<&str>,
    ) -> Result<()> {
        let suspicious = is_suspicious_path(path);
        if suspicious {
            warn!(ip = %ip_address, path = %path, "Suspicious request");
        }

        let record = NewRequestRecord {
            ip_address,
            method,
            path,
            status_code,
            user_agent,
        };
        let created_at = format_timestamp(&self.clock.now());
        RequestLogRepository::new(&self.pool)
            .insert(&record, suspicious, &created_at)
            .await?;
        Ok(())
    }

    /// Failed attempts from `ip_address` at or after `since`.
    pub async fn count_failed_logins_since(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        LoginLogRepository::new(&self.pool)
            .count_failed_since(ip_address, &format_timestamp(&since))
            .await
    }

    /// Most recent login attempts, newest first.
    pub async fn recent_logins(&self, limit: u32) -> Result<Vec<LoginAttempt>> {
        LoginLogRepository::new(&self.pool).list_recent(limit).await
    }

    /// Most recent requests, newest first.
    pub async fn recent_requests(&self, limit: u32) -> Result<Vec<RequestRecord>> {
        RequestLogRepository::new(&self.pool).list_recent(limit).await
    }

    /// The clock records are stamped with.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
