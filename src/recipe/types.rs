//! Recipe model for RecipeBox.

use crate::auth::OwnedResource;

/// Recipe entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Recipe {
    /// Unique recipe ID.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Recipe name.
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    /// Visible to every signed-in user when true.
    pub is_public: bool,
    /// Public URL of the attached image.
    pub image: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

impl OwnedResource for Recipe {
    fn owner_id(&self) -> i64 {
        self.user_id
    }

    fn is_public(&self) -> bool {
        self.is_public
    }
}

/// Data for creating a new recipe.
#[derive(Debug, Clone, Default)]
pub struct NewRecipe {
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    /// Recipes are private unless asked otherwise.
    pub is_public: bool,
}

impl NewRecipe {
    /// Create a private recipe with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the ingredients.
    pub fn with_ingredients(mut self, ingredients: impl Into<String>) -> Self {
        self.ingredients = Some(ingredients.into());
        self
    }

    /// Set the instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set the visibility.
    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }
}

/// Content changes to a recipe.
///
/// Visibility is not part of this; it has its own operation.
#[derive(Debug, Clone, Default)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub ingredients: Option<Option<String>>,
    pub instructions: Option<Option<String>>,
}

impl RecipeUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set or clear the description.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set or clear the ingredients.
    pub fn ingredients(mut self, ingredients: Option<String>) -> Self {
        self.ingredients = Some(ingredients);
        self
    }

    /// Set or clear the instructions.
    pub fn instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = Some(instructions);
        self
    }

    /// Check if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
    }
}
