//! Response DTOs for Web API.

use serde::Serialize;

use crate::audit::{LoginAttempt, RequestRecord};
use crate::auth::policy::is_owner;
use crate::clock::to_rfc3339;
use crate::db::User;
use crate::recipe::Recipe;

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Plain message payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Users
// ============================================================================

/// User information in responses. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// User role.
    pub role: String,
    /// Registration time (RFC3339).
    pub created_at: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            created_at: to_rfc3339(&user.created_at),
        }
    }
}

/// Login response. The token itself travels in the session cookie.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session lifetime in seconds.
    pub expires_in: u64,
    /// User information.
    pub user: UserInfo,
}

// ============================================================================
// Recipes
// ============================================================================

/// Recipe in responses.
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub is_public: bool,
    /// Public URL of the image.
    pub image: Option<String>,
    pub created_at: String,
    /// Whether the requesting user owns this recipe.
    pub is_owner: bool,
}

impl RecipeResponse {
    /// Build the response as seen by `viewer`.
    pub fn for_viewer(recipe: Recipe, viewer: &User) -> Self {
        let owned = is_owner(viewer, &recipe);
        Self {
            id: recipe.id,
            user_id: recipe.user_id,
            name: recipe.name,
            description: recipe.description,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            is_public: recipe.is_public,
            image: recipe.image,
            created_at: to_rfc3339(&recipe.created_at),
            is_owner: owned,
        }
    }
}

// ============================================================================
// Audit
// ============================================================================

/// Login attempt in responses.
#[derive(Debug, Serialize)]
pub struct LoginAttemptResponse {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub success: bool,
    pub created_at: String,
}

impl From<LoginAttempt> for LoginAttemptResponse {
    fn from(attempt: LoginAttempt) -> Self {
        Self {
            id: attempt.id,
            user_id: attempt.user_id,
            username: attempt.username,
            ip_address: attempt.ip_address,
            user_agent: attempt.user_agent,
            success: attempt.success,
            created_at: to_rfc3339(&attempt.created_at),
        }
    }
}

/// Request record in responses.
#[derive(Debug, Serialize)]
pub struct RequestRecordResponse {
    pub id: i64,
    pub ip_address: String,
    pub method: String,
    pub path: String,
    pub status_code: i64,
    pub user_agent: Option<String>,
    pub is_suspicious: bool,
    pub created_at: String,
}

impl From<RequestRecord> for RequestRecordResponse {
    fn from(record: RequestRecord) -> Self {
        Self {
            id: record.id,
            ip_address: record.ip_address,
            method: record.method,
            path: record.path,
            status_code: record.status_code,
            user_agent: record.user_agent,
            is_suspicious: record.is_suspicious,
            created_at: to_rfc3339(&record.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Role;

    #[test]
    fn test_user_info_omits_hash() {
        let user = User {
            id: 3,
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::SuperAdmin,
            created_at: "2024-01-15 10:30:00".to_string(),
        };
        let json = serde_json::to_value(ApiResponse::new(UserInfo::from(&user))).unwrap();

        assert_eq!(json["data"]["id"], 3);
        assert_eq!(json["data"]["role"], "super_admin");
        assert_eq!(json["data"]["created_at"], "2024-01-15T10:30:00Z");
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_recipe_response() {
        let recipe = Recipe {
            id: 1,
            user_id: 2,
            name: "Bread".to_string(),
            description: None,
            ingredients: Some("Flour".to_string()),
            instructions: None,
            is_public: true,
            image: Some("/static/uploads/x.png".to_string()),
            created_at: "2024-01-15 10:30:00".to_string(),
        };
        let mut viewer = User {
            id: 2,
            username: "baker".to_string(),
            password_hash: String::new(),
            role: Role::User,
            created_at: "2024-01-01 00:00:00".to_string(),
        };

        let json = serde_json::to_value(RecipeResponse::for_viewer(recipe.clone(), &viewer)).unwrap();
        assert_eq!(json["name"], "Bread");
        assert_eq!(json["is_public"], true);
        assert_eq!(json["image"], "/static/uploads/x.png");
        assert!(json["description"].is_null());
        assert_eq!(json["is_owner"], true);

        viewer.id = 7;
        let json = serde_json::to_value(RecipeResponse::for_viewer(recipe, &viewer)).unwrap();
        assert_eq!(json["is_owner"], false);
    }
}
