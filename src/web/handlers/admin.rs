//! Admin handlers for Web API.
//!
//! Everything here is restricted to `super_admin`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::auth::policy::require_super_admin;
use crate::db::{Role, UserRepository};
use crate::web::dto::{
    ApiResponse, LimitQuery, LoginAttemptResponse, RequestRecordResponse, UpdateRoleRequest,
    UserInfo,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentUser;

fn effective_limit(state: &AppState, query: &LimitQuery) -> u32 {
    query
        .limit
        .unwrap_or(state.audit_list_limit)
        .min(state.audit_list_limit)
}

// ============================================================================
// Audit Trail
// ============================================================================

/// GET /api/admin/login-logs - Recent login attempts, newest first.
pub async fn list_login_logs(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<LoginAttemptResponse>>>, ApiError> {
    require_super_admin(&user)?;

    let attempts = state
        .audit
        .recent_logins(effective_limit(&state, &query))
        .await?;
    Ok(Json(ApiResponse::new(
        attempts.into_iter().map(LoginAttemptResponse::from).collect(),
    )))
}

/// GET /api/admin/requests - Recent requests, newest first.
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<RequestRecordResponse>>>, ApiError> {
    require_super_admin(&user)?;

    let records = state
        .audit
        .recent_requests(effective_limit(&state, &query))
        .await?;
    Ok(Json(ApiResponse::new(
        records.into_iter().map(RequestRecordResponse::from).collect(),
    )))
}

// ============================================================================
// User Management
// ============================================================================

/// GET /api/admin/users - List all users.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<UserInfo>>>, ApiError> {
    require_super_admin(&user)?;

    let users = UserRepository::new(state.db.pool()).list_all().await?;
    Ok(Json(ApiResponse::new(
        users.iter().map(UserInfo::from).collect(),
    )))
}

/// PUT /api/admin/users/:id/role - Change a user's role.
pub async fn update_user_role(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    require_super_admin(&user)?;

    let role: Role = req
        .role
        .parse()
        .map_err(|_| ApiError::unprocessable(format!("Invalid role: {}", req.role)))?;

    if id == user.id {
        return Err(ApiError::bad_request("Cannot change your own role"));
    }

    let updated = UserRepository::new(state.db.pool())
        .update_role(id, role)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    tracing::info!(
        user_id = updated.id,
        role = %updated.role,
        by = user.id,
        "User role changed"
    );
    Ok(Json(ApiResponse::new(UserInfo::from(&updated))))
}

/// DELETE /api/admin/users/:id - Delete a user, their recipes and images.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_super_admin(&user)?;

    if id == user.id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }

    let repo = UserRepository::new(state.db.pool());
    if repo.get_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("user not found"));
    }

    state.recipes().discard_images_of_owner(id).await?;
    if !repo.delete(id).await? {
        return Err(ApiError::not_found("user not found"));
    }

    tracing::info!(user_id = id, by = user.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
