//! Pantry and Recipe Routes
//!
//! - GET /api/v1/pantry - Ingredient list
//! - POST /api/v1/pantry - Add an ingredient
//! - DELETE /api/v1/pantry/:item - Remove an ingredient
//! - GET /api/v1/recipes - Saved recipes
//! - POST /api/v1/recipes - Save a recipe
//! - DELETE /api/v1/recipes/:id - Remove a recipe

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::PantryItemRequest;
use crate::api::error::ApiResult;
use crate::api::routes::history::require_text;
use crate::api::state::AppState;
use crate::tracker::UserRecipe;

/// GET /api/v1/pantry
pub async fn get_pantry(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    let pantry = state.run(|tracker| tracker.get_pantry()).await?;
    Ok(Json(pantry))
}

/// POST /api/v1/pantry
pub async fn add_to_pantry(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PantryItemRequest>,
) -> ApiResult<Json<Vec<String>>> {
    require_text("item", &req.item)?;
    let pantry = state
        .run(move |tracker| tracker.add_to_pantry(&req.item))
        .await?;
    Ok(Json(pantry))
}

/// DELETE /api/v1/pantry/:item
pub async fn remove_from_pantry(
    State(state): State<Arc<AppState>>,
    Path(item): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    let pantry = state
        .run(move |tracker| tracker.remove_from_pantry(&item))
        .await?;
    Ok(Json(pantry))
}

/// GET /api/v1/recipes
pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<UserRecipe>>> {
    let recipes = state.run(|tracker| tracker.get_user_recipes()).await?;
    Ok(Json(recipes))
}

/// POST /api/v1/recipes
///
/// A blank id is replaced with a fresh one.
pub async fn add_recipe(
    State(state): State<Arc<AppState>>,
    Json(recipe): Json<UserRecipe>,
) -> ApiResult<(StatusCode, Json<Vec<UserRecipe>>)> {
    require_text("title", &recipe.title)?;
    let recipes = state
        .run(move |tracker| tracker.add_user_recipe(recipe))
        .await?;
    Ok((StatusCode::CREATED, Json(recipes)))
}

/// DELETE /api/v1/recipes/:id
pub async fn remove_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<UserRecipe>>> {
    let recipes = state
        .run(move |tracker| tracker.remove_user_recipe(&id))
        .await?;
    Ok(Json(recipes))
}
