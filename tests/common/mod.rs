//! Shared helpers for the web API tests.
//!
//! Every request goes through the full router. Requests are attributed to
//! a client address through `X-Forwarded-For`, which the test config trusts.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::{HeaderName, COOKIE};
use axum::http::StatusCode;
use axum_test::{TestRequest, TestResponse, TestServer};
use recipebox::clock::ManualClock;
use recipebox::storage::ImageStorage;
use recipebox::web::{create_router, AppState};
use recipebox::{Config, Database, Role, User, UserRepository};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Address used by requests that do not pick one.
pub const CLIENT_IP: &str = "203.0.113.10";

/// Password used for every test account.
pub const PASSWORD: &str = "password123";

/// Proxy header carrying the client address.
pub fn x_forwarded_for() -> HeaderName {
    HeaderName::from_static("x-forwarded-for")
}

/// Test configuration: trusted proxy headers, fixed secret.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.trust_forwarded_for = true;
    config.auth.secret_key = "test-secret-key-for-testing-only".to_string();
    config
}

/// A router over an in-memory database, a temp upload dir and a manual clock.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");
        let uploads = TempDir::new().expect("Failed to create upload dir");
        let images = ImageStorage::new(
            uploads.path(),
            &config.uploads.public_prefix,
            config.uploads.max_upload_size_mb * 1024 * 1024,
        )
        .expect("Failed to create image storage");
        let clock = Arc::new(ManualClock::starting_now());

        let state = Arc::new(AppState::new(db, &config, images, clock.clone()));
        let server =
            TestServer::new(create_router(state.clone())).expect("Failed to create test server");

        Self {
            server,
            state,
            clock,
            uploads,
        }
    }

    pub fn get(&self, path: &str, token: &str) -> TestRequest {
        with_session(self.server.get(path), token)
    }

    pub fn post(&self, path: &str, token: &str) -> TestRequest {
        with_session(self.server.post(path), token)
    }

    pub fn put(&self, path: &str, token: &str) -> TestRequest {
        with_session(self.server.put(path), token)
    }

    pub fn patch(&self, path: &str, token: &str) -> TestRequest {
        with_session(self.server.patch(path), token)
    }

    pub fn delete(&self, path: &str, token: &str) -> TestRequest {
        with_session(self.server.delete(path), token)
    }

    /// Register through the API; returns the raw response.
    pub async fn register_response(&self, username: &str, password: &str) -> TestResponse {
        self.server
            .post("/api/auth/register")
            .add_header(x_forwarded_for(), CLIENT_IP)
            .json(&json!({ "username": username, "password": password }))
            .await
    }

    /// Log in from `ip`; returns the raw response.
    pub async fn login_from(&self, ip: &str, username: &str, password: &str) -> TestResponse {
        self.server
            .post("/api/auth/login")
            .add_header(x_forwarded_for(), ip)
            .json(&json!({ "username": username, "password": password }))
            .await
    }

    /// Register a user with `role` and return it with a session token.
    pub async fn create_user(&self, username: &str, role: Role) -> (User, String) {
        let response = self.register_response(username, PASSWORD).await;
        response.assert_status_ok();
        let token = session_token(&response);

        let repo = UserRepository::new(self.state.db.pool());
        let mut user = repo
            .get_by_username(username)
            .await
            .unwrap()
            .expect("registered user");
        if role != Role::User {
            user = repo.update_role(user.id, role).await.unwrap().unwrap();
        }
        (user, token)
    }

    /// Create a recipe through the API and return its JSON.
    pub async fn create_recipe(&self, token: &str, name: &str, is_public: bool) -> Value {
        let response = self
            .post("/api/recipes", token)
            .json(&json!({ "name": name, "is_public": is_public }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }
}

/// Attach the client address and the session cookie.
pub fn with_session(request: TestRequest, token: &str) -> TestRequest {
    request
        .add_header(x_forwarded_for(), CLIENT_IP)
        .add_header(COOKIE, format!("access_token={}", token))
}

/// Session token from a response's `Set-Cookie`.
pub fn session_token(response: &TestResponse) -> String {
    response.cookie("access_token").value().to_string()
}
