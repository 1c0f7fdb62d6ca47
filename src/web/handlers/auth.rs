//! Authentication handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::audit::AuditLogger;
use crate::auth::{
    register as register_user, Authenticator, BruteForceGuard, RegistrationRequest, SessionCodec,
};
use crate::clock::Clock;
use crate::config::Config;
use crate::db::User;
use crate::recipe::RecipeService;
use crate::storage::ImageStorage;
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserInfo,
};
use crate::web::error::ApiError;
use crate::web::middleware::{ClientInfo, CurrentUser};
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Session token codec.
    pub sessions: SessionCodec,
    /// Credential checker; records every attempt.
    pub authenticator: Authenticator,
    /// Audit trail writer.
    pub audit: AuditLogger,
    /// Failed-login gate.
    pub guard: BruteForceGuard,
    /// Uploaded image store.
    pub images: ImageStorage,
    /// Clock for every timestamp the app writes.
    pub clock: Arc<dyn Clock>,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Whether the session cookie carries `Secure`.
    pub cookie_secure: bool,
    /// Whether proxy headers name the client.
    pub trust_forwarded_for: bool,
    /// Upper bound on audit listing sizes.
    pub audit_list_limit: u32,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, config: &Config, images: ImageStorage, clock: Arc<dyn Clock>) -> Self {
        let audit = AuditLogger::new(db.pool().clone(), clock.clone());
        let sessions = SessionCodec::new(
            &config.auth.secret_key,
            Duration::from_secs(config.auth.access_token_expiry_secs),
            clock.clone(),
        );
        Self {
            authenticator: Authenticator::new(db.pool().clone(), audit.clone()),
            guard: BruteForceGuard::new(audit.clone(), (&config.guard).into()),
            db,
            sessions,
            audit,
            images,
            clock,
            cookie_name: config.auth.cookie_name.clone(),
            cookie_secure: config.auth.cookie_secure(),
            trust_forwarded_for: config.server.trust_forwarded_for,
            audit_list_limit: config.audit.list_limit,
        }
    }

    /// Recipe operations bound to this state.
    pub fn recipes(&self) -> RecipeService<'_> {
        RecipeService::new(self.db.pool(), &self.images, self.clock.as_ref())
    }

    /// Session cookie carrying `token`.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .path("/")
            .build()
    }

    /// Cookie that clears the session.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), "")).path("/").build()
    }

    fn login_response(&self, user: &User) -> LoginResponse {
        LoginResponse {
            expires_in: self.sessions.ttl().as_secs(),
            user: UserInfo::from(user),
        }
    }
}

/// POST /api/auth/register - Create a `user` account and sign it in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let request = RegistrationRequest::new(req.username, req.password);
    let user = register_user(state.db.pool(), request, state.clock.now()).await?;

    let token = state.sessions.issue_session(&user)?;
    let response = state.login_response(&user);

    Ok((
        jar.add(state.session_cookie(token)),
        Json(ApiResponse::new(response)),
    ))
}

/// POST /api/auth/login - Check credentials and set the session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    client: ClientInfo,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let user = state
        .authenticator
        .authenticate(
            &req.username,
            &req.password,
            &client.ip,
            client.user_agent.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    let token = state.sessions.issue_session(&user)?;
    let response = state.login_response(&user);

    Ok((
        jar.add(state.session_cookie(token)),
        Json(ApiResponse::new(response)),
    ))
}

/// POST /api/auth/logout - Clear the session cookie.
///
/// The token itself stays valid until it expires.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<MessageResponse>>) {
    (
        jar.remove(state.removal_cookie()),
        Json(ApiResponse::new(MessageResponse::new("Logged out"))),
    )
}

/// GET /api/auth/me - Current user.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<ApiResponse<UserInfo>> {
    Json(ApiResponse::new(UserInfo::from(&user)))
}
