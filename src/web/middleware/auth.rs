//! Session resolution.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;

use crate::db::{User, UserRepository};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Extractor for the authenticated user.
///
/// The token is read from the session cookie, falling back to an
/// `Authorization: Bearer` header. Every failure is a plain 401, whether
/// the token was missing, forged, expired or names a deleted account.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn session_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(cookie_name) {
        return Some(cookie.value().to_string());
    }
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| value.starts_with("Bearer "))
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, &state.cookie_name)
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        let user_id = state.sessions.resolve(&token).map_err(|_| {
            tracing::debug!("Session token rejected");
            ApiError::unauthorized("Not authenticated")
        })?;

        let user = UserRepository::new(state.db.pool())
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        Ok(CurrentUser(user))
    }
}
