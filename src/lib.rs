//! RecipeBox - multi-user recipe sharing service
//!
//! Recipes are private to their owner unless published. Sessions are
//! signed tokens in an HTTP-only cookie; every login attempt and every
//! request lands in an audit trail that also drives per-address
//! brute-force blocking.

pub mod audit;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod recipe;
pub mod storage;
pub mod web;

pub use auth::{hash_password, validate_password, verify_password};
pub use config::Config;
pub use db::{Database, NewUser, Role, User, UserRepository};
pub use error::{RecipeBoxError, Result};
