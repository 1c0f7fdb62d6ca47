//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// User registration request. New accounts always get the `user` role.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Create recipe request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeRequest {
    /// Recipe name.
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10000, message = "Ingredients are too long"))]
    pub ingredients: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10000, message = "Instructions are too long"))]
    pub instructions: Option<String>,
    /// Defaults to private.
    #[serde(default)]
    pub is_public: bool,
}

/// Update recipe request.
///
/// Omitted fields are left alone; an empty string clears an optional field.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecipeRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10000, message = "Ingredients are too long"))]
    pub ingredients: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10000, message = "Instructions are too long"))]
    pub instructions: Option<String>,
}

/// Visibility change request.
#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    /// New visibility.
    pub is_public: bool,
}

/// Role change request.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// One of `user`, `admin`, `super_admin`.
    pub role: String,
}

/// Query parameters for audit listings.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    /// Maximum number of records (capped by configuration).
    pub limit: Option<u32>,
}
