//! Recipes for RecipeBox.
//!
//! Owned, optionally public recipes with an attached image.

mod repository;
mod service;
mod types;

pub use repository::RecipeRepository;
pub use service::{RecipeService, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};
pub use types::{NewRecipe, Recipe, RecipeUpdate};
