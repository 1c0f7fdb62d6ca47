//! Audit record types.

/// One login attempt, successful or not.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LoginAttempt {
    pub id: i64,
    /// Matched account, or None when the username is unknown.
    pub user_id: Option<i64>,
    /// Username as submitted.
    pub username: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub success: bool,
    pub created_at: String,
}

/// Data for appending a login attempt.
#[derive(Debug, Clone)]
pub struct NewLoginAttempt<'a> {
    pub user_id: Option<i64>,
    pub username: &'a str,
    pub ip_address: &'a str,
    pub user_agent: Option<&'a str>,
    pub success: bool,
}

/// One inbound HTTP request.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RequestRecord {
    pub id: i64,
    pub ip_address: String,
    pub method: String,
    pub path: String,
    pub status_code: i64,
    pub user_agent: Option<String>,
    /// Path matched a known scanner probe.
    pub is_suspicious: bool,
    pub created_at: String,
}

/// Data for appending a request record.
#[derive(Debug, Clone)]
pub struct NewRequestRecord<'a> {
    pub ip_address: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub status_code: u16,
    pub user_agent: Option<&'a str>,
}
