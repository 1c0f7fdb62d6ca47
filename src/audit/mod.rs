//! Audit trail for RecipeBox.
//!
//! Append-only records of login attempts and inbound HTTP requests.

mod logger;
mod repository;
mod types;

pub use logger::{is_suspicious_path, AuditLogger, SUSPICIOUS_PATH_FRAGMENTS};
pub use repository::{LoginLogRepository, RequestLogRepository};
pub use types::{LoginAttempt, NewLoginAttempt, NewRequestRecord, RequestRecord};
