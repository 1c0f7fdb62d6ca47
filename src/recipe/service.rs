//! Recipe service for RecipeBox.
//!
//! Every operation on an existing recipe loads it first and only then
//! checks the caller's rights, so a missing recipe is always `NotFound`
//! and never `Forbidden`.

use tracing::{info, warn};

use super::repository::RecipeRepository;
use super::types::{NewRecipe, Recipe, RecipeUpdate};
use crate::auth::policy::{require_access, require_modify, require_owner};
use crate::clock::{format_timestamp, Clock};
use crate::db::{DbPool, User};
use crate::storage::ImageStorage;
use crate::{RecipeBoxError, Result};

/// Maximum length for recipe names (in characters).
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length for description, ingredients and instructions (in characters).
pub const MAX_TEXT_LENGTH: usize = 10_000;

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RecipeBoxError::Validation("name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(RecipeBoxError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_text(field: &str, text: Option<&str>) -> Result<()> {
    if text.is_some_and(|t| t.chars().count() > MAX_TEXT_LENGTH) {
        return Err(RecipeBoxError::Validation(format!(
            "{field} must be at most {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Service for recipe operations with access checks.
pub struct RecipeService<'a> {
    pool: &'a DbPool,
    storage: &'a ImageStorage,
    clock: &'a dyn Clock,
}

impl<'a> RecipeService<'a> {
    /// Create a new RecipeService.
    pub fn new(pool: &'a DbPool, storage: &'a ImageStorage, clock: &'a dyn Clock) -> Self {
        Self {
            pool,
            storage,
            clock,
        }
    }

    fn repo(&self) -> RecipeRepository<'a> {
        RecipeRepository::new(self.pool)
    }

    async fn load(&self, recipe_id: i64) -> Result<Recipe> {
        self.repo()
            .get_by_id(recipe_id)
            .await?
            .ok_or_else(|| RecipeBoxError::NotFound("recipe".to_string()))
    }

    /// The user's own recipes plus every public one, newest first.
    ///
    /// Super admins see the same listing; their read bypass applies to
    /// fetching a single recipe by id.
    pub async fn list(&self, user: &User) -> Result<Vec<Recipe>> {
        self.repo().list_visible(user.id).await
    }

    /// The user's own recipes, newest first.
    pub async fn list_mine(&self, user: &User) -> Result<Vec<Recipe>> {
        self.repo().list_by_owner(user.id).await
    }

    /// Create a recipe owned by `user`.
    pub async fn create(&self, user: &User, recipe: &NewRecipe) -> Result<Recipe> {
        validate_name(&recipe.name)?;
        validate_text("description", recipe.description.as_deref())?;
        validate_text("ingredients", recipe.ingredients.as_deref())?;
        validate_text("instructions", recipe.instructions.as_deref())?;

        let created_at = format_timestamp(&self.clock.now());
        let created = self.repo().create(user.id, recipe, &created_at).await?;
        info!(recipe_id = created.id, user_id = user.id, "Recipe created");
        Ok(created)
    }

    /// Get a recipe the user may read.
    pub async fn get(&self, user: &User, recipe_id: i64) -> Result<Recipe> {
        let recipe = self.load(recipe_id).await?;
        require_access(user, &recipe)?;
        Ok(recipe)
    }

    /// Change a recipe's content.
    pub async fn update(&self, user: &User, recipe_id: i64, update: &RecipeUpdate) -> Result<Recipe> {
        let recipe = self.load(recipe_id).await?;
        require_modify(user, &recipe)?;

        if let Some(ref name) = update.name {
            validate_name(name)?;
        }
        validate_text("description", update.description.as_ref().and_then(|d| d.as_deref()))?;
        validate_text("ingredients", update.ingredients.as_ref().and_then(|d| d.as_deref()))?;
        validate_text("instructions", update.instructions.as_ref().and_then(|d| d.as_deref()))?;

        self.repo()
            .update(recipe_id, update)
            .await?
            .ok_or_else(|| RecipeBoxError::NotFound("recipe".to_string()))
    }

    /// Make a recipe public or private.
    pub async fn set_visibility(&self, user: &User, recipe_id: i64, is_public: bool) -> Result<Recipe> {
        let recipe = self.load(recipe_id).await?;
        require_modify(user, &recipe)?;

        let updated = self
            .repo()
            .set_visibility(recipe_id, is_public)
            .await?
            .ok_or_else(|| RecipeBoxError::NotFound("recipe".to_string()))?;
        info!(recipe_id, user_id = user.id, is_public, "Recipe visibility changed");
        Ok(updated)
    }

    /// Delete a recipe and its image.
    pub async fn delete(&self, user: &User, recipe_id: i64) -> Result<()> {
        let recipe = self.load(recipe_id).await?;
        require_modify(user, &recipe)?;

        if !self.repo().delete(recipe_id).await? {
            return Err(RecipeBoxError::NotFound("recipe".to_string()));
        }
        if let Some(ref image) = recipe.image {
            self.discard_image(image);
        }
        info!(recipe_id, user_id = user.id, "Recipe deleted");
        Ok(())
    }

    /// Attach an image, replacing any previous one. Owner only.
    pub async fn set_image(
        &self,
        user: &User,
        recipe_id: i64,
        original_name: &str,
        declared_type: Option<&str>,
        content: &[u8],
    ) -> Result<Recipe> {
        let recipe = self.load(recipe_id).await?;
        require_owner(user, &recipe)?;

        let url = self.storage.save(content, original_name, declared_type)?;
        let updated = match self.repo().set_image(recipe_id, Some(&url)).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                self.discard_image(&url);
                return Err(RecipeBoxError::NotFound("recipe".to_string()));
            }
            Err(e) => {
                self.discard_image(&url);
                return Err(e);
            }
        };

        if let Some(ref old) = recipe.image {
            self.discard_image(old);
        }
        Ok(updated)
    }

    /// Remove the image. Owner only.
    pub async fn clear_image(&self, user: &User, recipe_id: i64) -> Result<Recipe> {
        let recipe = self.load(recipe_id).await?;
        require_owner(user, &recipe)?;

        let updated = self
            .repo()
            .set_image(recipe_id, None)
            .await?
            .ok_or_else(|| RecipeBoxError::NotFound("recipe".to_string()))?;
        if let Some(ref old) = recipe.image {
            self.discard_image(old);
        }
        Ok(updated)
    }

    /// Delete stored images of every recipe owned by `user_id`.
    ///
    /// Run before deleting the account; the rows go by cascade.
    pub async fn discard_images_of_owner(&self, user_id: i64) -> Result<()> {
        for image in self.repo().images_of_owner(user_id).await? {
            self.discard_image(&image);
        }
        Ok(())
    }

    fn discard_image(&self, url: &str) {
        if let Err(e) = self.storage.delete(url) {
            warn!(url = %url, error = %e, "Failed to delete image");
        }
    }
}
