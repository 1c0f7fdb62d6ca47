//! Time source and timestamp formatting for RecipeBox.
//!
//! Every timestamp written by the application comes from a [`Clock`], so
//! tests can pin and advance time when checking token expiry and the
//! brute-force window.

use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Storage format for timestamps (UTC, second precision).
///
/// Fixed width, so lexical order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Create a clock frozen at the current wall-clock second.
    pub fn starting_now() -> Self {
        let now = Utc::now();
        Self::new(parse_timestamp(&format_timestamp(&now)).unwrap_or(now))
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard = instant;
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Format an instant in the storage format.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp back into an instant.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Convert a stored timestamp (YYYY-MM-DD HH:MM:SS) to RFC3339.
///
/// Used for API responses. Stored times are UTC, so a `Z` suffix is appended.
pub fn to_rfc3339(datetime_str: &str) -> String {
    format!("{}Z", datetime_str.replace(' ', "T"))
}
