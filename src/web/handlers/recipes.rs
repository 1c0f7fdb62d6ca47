//! Recipe handlers.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};

use crate::recipe::{NewRecipe, RecipeUpdate};
use crate::web::dto::{
    ApiResponse, CreateRecipeRequest, RecipeResponse, UpdateRecipeRequest, ValidatedJson,
    VisibilityRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentUser;

/// Empty strings clear an optional field.
fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.is_empty() { None } else { Some(v) })
}

/// GET /api/recipes - Recipes the caller may read.
pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<RecipeResponse>>>, ApiError> {
    let recipes = state.recipes().list(&user).await?;
    Ok(Json(ApiResponse::new(
        recipes
            .into_iter()
            .map(|r| RecipeResponse::for_viewer(r, &user))
            .collect(),
    )))
}

/// GET /api/recipes/mine - The caller's own recipes.
pub async fn list_my_recipes(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<RecipeResponse>>>, ApiError> {
    let recipes = state.recipes().list_mine(&user).await?;
    Ok(Json(ApiResponse::new(
        recipes
            .into_iter()
            .map(|r| RecipeResponse::for_viewer(r, &user))
            .collect(),
    )))
}

/// POST /api/recipes - Create a recipe.
pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RecipeResponse>>), ApiError> {
    let mut recipe = NewRecipe::new(req.name).with_public(req.is_public);
    recipe.description = req.description.filter(|d| !d.is_empty());
    recipe.ingredients = req.ingredients.filter(|i| !i.is_empty());
    recipe.instructions = req.instructions.filter(|i| !i.is_empty());

    let created = state.recipes().create(&user, &recipe).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(RecipeResponse::for_viewer(created, &user))),
    ))
}

/// GET /api/recipes/:id - Get a recipe.
pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RecipeResponse>>, ApiError> {
    let recipe = state.recipes().get(&user, id).await?;
    Ok(Json(ApiResponse::new(RecipeResponse::for_viewer(recipe, &user))))
}

/// PUT /api/recipes/:id - Update a recipe's content.
pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateRecipeRequest>,
) -> Result<Json<ApiResponse<RecipeResponse>>, ApiError> {
    let update = RecipeUpdate {
        name: req.name,
        description: clearable(req.description),
        ingredients: clearable(req.ingredients),
        instructions: clearable(req.instructions),
    };

    let recipe = state.recipes().update(&user, id, &update).await?;
    Ok(Json(ApiResponse::new(RecipeResponse::for_viewer(recipe, &user))))
}

/// PATCH /api/recipes/:id/visibility - Make a recipe public or private.
pub async fn set_visibility(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<VisibilityRequest>,
) -> Result<Json<ApiResponse<RecipeResponse>>, ApiError> {
    let recipe = state
        .recipes()
        .set_visibility(&user, id, req.is_public)
        .await?;
    Ok(Json(ApiResponse::new(RecipeResponse::for_viewer(recipe, &user))))
}

/// DELETE /api/recipes/:id - Delete a recipe and its image.
pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.recipes().delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/recipes/:id/image - Attach an image.
///
/// Request body: multipart/form-data with a "file" field.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<RecipeResponse>>, ApiError> {
    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("Missing filename"))?;
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;
        upload = Some((filename, content_type, data.to_vec()));
    }

    let (filename, content_type, data) =
        upload.ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let recipe = state
        .recipes()
        .set_image(&user, id, &filename, content_type.as_deref(), &data)
        .await?;
    Ok(Json(ApiResponse::new(RecipeResponse::for_viewer(recipe, &user))))
}

/// DELETE /api/recipes/:id/image - Remove the image.
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RecipeResponse>>, ApiError> {
    let recipe = state.recipes().clear_image(&user, id).await?;
    Ok(Json(ApiResponse::new(RecipeResponse::for_viewer(recipe, &user))))
}
