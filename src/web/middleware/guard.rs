//! Brute-force gate.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::client_ip::{client_ip, ClientIp};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Reject every request from a blocked address before any handler runs.
///
/// Runs inside the audit scope, so rejected requests are still recorded.
/// If the guard cannot reach the login trail the request fails closed.
pub async fn brute_force_gate(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let ip = match req.extensions().get::<ClientIp>() {
        Some(ClientIp(ip)) => ip.clone(),
        None => client_ip(&req, state.trust_forwarded_for),
    };

    match state.guard.is_blocked(&ip).await {
        Ok(false) => next.run(req).await,
        Ok(true) => ApiError::blocked().into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
