//! Recipe repository for RecipeBox.

use sqlx::QueryBuilder;

use super::types::{NewRecipe, Recipe, RecipeUpdate};
use crate::db::DbPool;
use crate::{RecipeBoxError, Result};

const RECIPE_COLUMNS: &str =
    "id, user_id, name, description, ingredients, instructions, is_public, image, created_at";

/// Repository for recipe CRUD operations.
///
/// No access checks happen here; see [`super::RecipeService`].
pub struct RecipeRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> RecipeRepository<'a> {
    /// Create a new RecipeRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a recipe owned by `user_id`.
    pub async fn create(&self, user_id: i64, recipe: &NewRecipe, created_at: &str) -> Result<Recipe> {
        let result = sqlx::query(
            "INSERT INTO recipes (user_id, name, description, ingredients, instructions, is_public, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&recipe.name)
        .bind(&recipe.description)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(recipe.is_public)
        .bind(created_at)
        .execute(self.pool)
        .await
        .map_err(|e| RecipeBoxError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| RecipeBoxError::NotFound("recipe".to_string()))
    }

    /// Get a recipe by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Recipe>> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?");
        let result = sqlx::query_as::<_, Recipe>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;
        Ok(result)
    }

    /// Recipes `user_id` may see: their own plus every public one, newest first.
    pub async fn list_visible(&self, user_id: i64) -> Result<Vec<Recipe>> {
        let sql = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes
             WHERE user_id = ? OR is_public = 1
             ORDER BY created_at DESC, id DESC"
        );
        let recipes = sqlx::query_as::<_, Recipe>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;
        Ok(recipes)
    }

    /// Recipes owned by `user_id`, newest first.
    pub async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Recipe>> {
        let sql = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE user_id = ?
             ORDER BY created_at DESC, id DESC"
        );
        let recipes = sqlx::query_as::<_, Recipe>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;
        Ok(recipes)
    }

    /// Apply content changes.
    ///
    /// Returns the updated recipe, or None if not found.
    pub async fn update(&self, id: i64, update: &RecipeUpdate) -> Result<Option<Recipe>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE recipes SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.clone());
        }
        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }
        if let Some(ref ingredients) = update.ingredients {
            separated.push("ingredients = ");
            separated.push_bind_unseparated(ingredients.clone());
        }
        if let Some(ref instructions) = update.instructions {
            separated.push("instructions = ");
            separated.push_bind_unseparated(instructions.clone());
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Set the visibility flag.
    pub async fn set_visibility(&self, id: i64, is_public: bool) -> Result<Option<Recipe>> {
        let result = sqlx::query("UPDATE recipes SET is_public = ? WHERE id = ?")
            .bind(is_public)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Set or clear the image URL.
    pub async fn set_image(&self, id: i64, image: Option<&str>) -> Result<Option<Recipe>> {
        let result = sqlx::query("UPDATE recipes SET image = ? WHERE id = ?")
            .bind(image)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Delete a recipe by ID.
    ///
    /// Returns true if a recipe was deleted, false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RecipeBoxError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Image URLs of every recipe owned by `user_id`.
    pub async fn images_of_owner(&self, user_id: i64) -> Result<Vec<String>> {
        let images: Vec<String> = sqlx::query_scalar(
            "SELECT image FROM recipes WHERE user_id = ? AND image IS NOT NULL",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| RecipeBoxError::Database(e.to_string()))?;
        Ok(images)
    }
}
