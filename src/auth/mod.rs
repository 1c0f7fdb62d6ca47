//! Authentication and authorization for RecipeBox.
//!
//! This module provides password hashing, session tokens, credential
//! checking, role and ownership policy, registration and the brute-force
//! guard.

mod authenticator;
pub mod guard;
mod password;
pub mod policy;
mod registration;
pub mod token;

pub use authenticator::Authenticator;
pub use guard::{BruteForceGuard, GuardConfig};
pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use policy::OwnedResource;
pub use registration::{register, validate_username, RegistrationRequest};
pub use token::{SessionClaims, SessionCodec, TokenError};
