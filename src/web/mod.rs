//! Web API module for RecipeBox.
//!
//! JSON API over axum with cookie sessions. Every request passes the
//! request audit and the brute-force gate before reaching a handler.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
