//! Database schema and migrations for RecipeBox.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.
//!
//! Timestamp columns have no SQL default: the application writes them from
//! its clock so that window queries compare against the same time source.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Users table
    r#"
CREATE TABLE users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,      -- case-sensitive
    password_hash   TEXT NOT NULL,             -- Argon2 PHC string
    role            TEXT NOT NULL DEFAULT 'user'
                    CHECK (role IN ('user', 'admin', 'super_admin')),
    created_at      TEXT NOT NULL
);
"#,
    // v2: Recipes owned by users
    r#"
CREATE TABLE recipes (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name            TEXT NOT NULL,
    description     TEXT,
    ingredients     TEXT,
    instructions    TEXT,
    is_public       INTEGER NOT NULL DEFAULT 0,
    image           TEXT,                      -- public URL of the stored image
    created_at      TEXT NOT NULL
);

CREATE INDEX idx_recipes_user_id ON recipes(user_id);
CREATE INDEX idx_recipes_is_public ON recipes(is_public);
"#,
    // v3: Login attempt audit trail (append-only)
    r#"
CREATE TABLE login_log (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id         INTEGER,                   -- NULL when the username is unknown
    username        TEXT NOT NULL,
    ip_address      TEXT NOT NULL,
    user_agent      TEXT,
    success         INTEGER NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE INDEX idx_login_log_ip_failed ON login_log(ip_address, success, created_at);
CREATE INDEX idx_login_log_created_at ON login_log(created_at);
"#,
    // v4: Request audit trail (append-only)
    r#"
CREATE TABLE request_log (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    ip_address      TEXT NOT NULL,
    method          TEXT NOT NULL,
    path            TEXT NOT NULL,
    status_code     INTEGER NOT NULL,
    user_agent      TEXT,
    is_suspicious   INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE INDEX idx_request_log_created_at ON request_log(created_at);
CREATE INDEX idx_request_log_suspicious ON request_log(is_suspicious);
"#,
];
