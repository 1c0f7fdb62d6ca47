//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};

use super::error::ApiError;
use super::handlers::{
    create_recipe, delete_image, delete_recipe, delete_user, get_recipe, list_login_logs,
    list_my_recipes, list_recipes, list_requests, list_users, login, logout, me, register,
    set_visibility, update_recipe, update_user_role, upload_image, AppState,
};
use super::middleware::{brute_force_gate, request_audit};

/// Room for multipart framing on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the application router.
///
/// Layers, outermost first: request audit, panic catcher, brute-force
/// gate, tracing. The audit scope therefore sees blocked requests and
/// the 500 a panic turns into.
pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = usize::try_from(state.images.max_size())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me));

    let recipe_routes = Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/mine", get(list_my_recipes))
        .route(
            "/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/:id/visibility", patch(set_visibility))
        .route(
            "/:id/image",
            put(upload_image)
                .delete(delete_image)
                .layer(DefaultBodyLimit::max(upload_limit)),
        );

    let admin_routes = Router::new()
        .route("/login-logs", get(list_login_logs))
        .route("/requests", get(list_requests))
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/role", put(update_user_role));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/recipes", recipe_routes)
        .nest("/admin", admin_routes);

    let uploads = ServeDir::new(state.images.base_path());
    let uploads_prefix = state.images.public_prefix().to_string();

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .nest_service(&uploads_prefix, uploads)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(state.clone(), request_audit))
                .layer(CatchPanicLayer::new())
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    brute_force_gate,
                ))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
