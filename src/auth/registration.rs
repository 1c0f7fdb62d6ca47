//! User registration for RecipeBox.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::auth::password::{hash_password, validate_password};
use crate::db::{DbPool, NewUser, Role, User, UserRepository};
use crate::{RecipeBoxError, Result};

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Desired username (3-32 alphanumeric + underscore).
    pub username: String,
    /// Password (8-128 characters).
    pub password: String,
    /// Role to assign.
    pub role: Role,
}

impl RegistrationRequest {
    /// Create a new registration request for a regular user.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: Role::User,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Validate a username: 3-32 characters of `[A-Za-z0-9_]`.
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if len < MIN_USERNAME_LENGTH {
        return Err(RecipeBoxError::Validation(format!(
            "username must be at least {MIN_USERNAME_LENGTH} characters"
        )));
    }
    if len > MAX_USERNAME_LENGTH {
        return Err(RecipeBoxError::Validation(format!(
            "username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(RecipeBoxError::Validation(
            "username can only contain alphanumeric characters and underscores".to_string(),
        ));
    }
    Ok(())
}

/// Register a new user.
///
/// Validates the input, hashes the password and stores the account.
/// A taken username is `Conflict`.
pub async fn register(
    pool: &DbPool,
    request: RegistrationRequest,
    created_at: DateTime<Utc>,
) -> Result<User> {
    validate_username(&request.username)?;
    validate_password(&request.password)?;

    let repo = UserRepository::new(pool);
    if repo.username_exists(&request.username).await? {
        return Err(RecipeBoxError::Conflict("username already exists".to_string()));
    }

    let password_hash = hash_password(&request.password)?;
    let new_user = NewUser::new(&request.username, password_hash).with_role(request.role);

    // The UNIQUE constraint still catches a concurrent registration.
    let user = repo.create(&new_user, created_at).await?;

    info!(
        username = %user.username,
        user_id = user.id,
        role = %user.role,
        "New user registered"
    );

    Ok(user)
}
