//! Brute-force guard for login attempts.
//!
//! Blocks an address once it has too many failed logins inside a trailing
//! window. No counter is kept: every check recounts the login trail, so a
//! block lifts on its own as old failures slide out of the window.

use std::time::Duration;

use tracing::warn;

use crate::audit::AuditLogger;
use crate::clock::Clock;
use crate::{RecipeBoxError, Result};

/// Configuration for the brute-force guard.
#[derive(Debug, Clone, Copy)]
pub struct GuardConfig {
    /// Failed attempts that trigger a block.
    pub max_failed_attempts: u32,
    /// Trailing window for counting failures.
    pub window: Duration,
}

impl GuardConfig {
    /// Create a new guard configuration.
    pub fn new(max_failed_attempts: u32, window_secs: u64) -> Self {
        Self {
            max_failed_attempts,
            window: Duration::from_secs(window_secs),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new(5, 300)
    }
}

impl From<&crate::config::GuardConfig> for GuardConfig {
    fn from(config: &crate::config::GuardConfig) -> Self {
        Self::new(config.max_failed_attempts, config.window_secs)
    }
}

/// Decides whether an address is currently blocked.
#[derive(Clone)]
pub struct BruteForceGuard {
    audit: AuditLogger,
    config: GuardConfig,
}

impl BruteForceGuard {
    /// Create a guard reading failures from `audit`'s login trail.
    pub fn new(audit: AuditLogger, config: GuardConfig) -> Self {
        Self { audit, config }
    }

    /// Whether `ip_address` has reached the failure threshold.
    ///
    /// Failures stamped exactly at the window start still count.
    pub async fn is_blocked(&self, ip_address: &str) -> Result<bool> {
        let window = chrono::Duration::from_std(self.config.window)
            .map_err(|e| RecipeBoxError::Config(format!("guard window out of range: {e}")))?;
        let since = self.audit.clock().now() - window;

        let failures = self
            .audit
            .count_failed_logins_since(ip_address, since)
            .await?;
        let blocked = failures >= i64::from(self.config.max_failed_attempts);
        if blocked {
            warn!(ip = %ip_address, failures, "Address blocked");
        }
        Ok(blocked)
    }

    /// Return `Blocked` if `ip_address` is currently blocked.
    pub async fn check(&self, ip_address: &str) -> Result<()> {
        if self.is_blocked(ip_address).await? {
            return Err(RecipeBoxError::Blocked);
        }
        Ok(())
    }
}
