//! User repository for RecipeBox.
//!
//! This module provides CRUD operations for users in the database.

use chrono::{DateTime, Utc};

use super::user::{NewUser, Role, User};
use super::DbPool;
use crate::clock::format_timestamp;
use crate::{RecipeBoxError, Result};

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID, or `Conflict` if the
    /// username is already taken.
    pub async fn create(&self, new_user: &NewUser, created_at: DateTime<Utc>) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, role, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(format_timestamp(&created_at))
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RecipeBoxError::Conflict("username already exists".to_string())
            }
            other => RecipeBoxError::Database(other.to_string()),
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| RecipeBoxError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a user by username (exact, case-sensitive match).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;

        Ok(result)
    }

    /// List all users ordered by ID.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;

        Ok(users)
    }

    /// Change a user's role.
    ///
    /// Returns the updated user, or None if not found.
    pub async fn update_role(&self, id: i64, role: Role) -> Result<Option<User>> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a user by ID. Their recipes are removed by cascade.
    ///
    /// Returns true if a user was deleted, false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;
        Ok(count.0)
    }

    /// Check if a username is already taken (case-sensitive).
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
            .bind(username)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;
        Ok(exists.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::TimeZone;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo.create(&NewUser::new("testuser", "hashedpw"), t0()).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.username, "testuser");
        assert_eq!(user.password_hash, "hashedpw");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.created_at, "2024-03-01 09:00:00");
    }

    #[tokio::test]
    async fn test_create_user_with_role() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("boss", "pw").with_role(Role::SuperAdmin), t0())
            .await
            .unwrap();
        assert_eq!(user.role, Role::SuperAdmin);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("alice", "pw"), t0()).await.unwrap();
        let result = repo.create(&NewUser::new("alice", "pw2"), t0()).await;

        assert!(matches!(result, Err(RecipeBoxError::Conflict(_))));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_username_is_case_sensitive() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("Alice", "pw"), t0()).await.unwrap();
        repo.create(&NewUser::new("alice", "pw"), t0()).await.unwrap();

        assert!(repo.get_by_username("ALICE").await.unwrap().is_none());
        assert_eq!(
            repo.get_by_username("Alice").await.unwrap().unwrap().username,
            "Alice"
        );
        assert!(repo.username_exists("alice").await.unwrap());
        assert!(!repo.username_exists("ALICE").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("zed", "pw"), t0()).await.unwrap();
        repo.create(&NewUser::new("amy", "pw"), t0()).await.unwrap();

        let users = repo.list_all().await.unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["zed", "amy"]);
    }

    #[tokio::test]
    async fn test_update_role() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo.create(&NewUser::new("mod", "pw"), t0()).await.unwrap();
        let updated = repo.update_role(user.id, Role::Admin).await.unwrap().unwrap();
        assert_eq!(updated.role, Role::Admin);

        assert!(repo.update_role(999, Role::Admin).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo.create(&NewUser::new("gone", "pw"), t0()).await.unwrap();
        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
