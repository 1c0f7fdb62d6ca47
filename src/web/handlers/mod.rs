//! API handlers.

pub mod admin;
pub mod auth;
pub mod recipes;

pub use admin::*;
pub use auth::*;
pub use recipes::*;
