//! # REST API for Recipes
//!
//! Endpoints for the recipe catalog: listing with free-text search, creation,
//! detail with line items, deletion and adding ingredients.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::{AddRecipeIngredientRequest, CreateRecipeRequest, RecipeListRequest};
use tracing::info;

use crate::backend::domain::commands::recipes::{
    AddRecipeIngredientCommand, CreateRecipeCommand, RecipeListQuery,
};
use crate::backend::io::rest::errors::error_response;
use crate::backend::io::rest::mappers::RecipeMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/:id", get(get_recipe).delete(delete_recipe))
        .route("/:id/ingredients", post(add_recipe_ingredient))
}

/// List recipes, with search results when `q` is given
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(request): Query<RecipeListRequest>,
) -> impl IntoResponse {
    info!("GET /api/recipes - query: {:?}", request);

    let query = RecipeListQuery { q: request.q };

    match state.recipe_service.list_recipes(query).await {
        Ok(result) => (StatusCode::OK, Json(RecipeMapper::to_recipe_list_dto(result))).into_response(),
        Err(e) => error_response("Failed to list recipes", e, "Error listing recipes"),
    }
}

pub async fn create_recipe(
    State(state): State<AppState>,
    Json(request): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    info!("POST /api/recipes - request: {:?}", request);

    let command = CreateRecipeCommand {
        title: request.title,
        description: request.description,
        servings: request.servings,
        prep_minutes: request.prep_minutes,
        cook_minutes: request.cook_minutes,
    };

    match state.recipe_service.create_recipe(command).await {
        Ok(recipe) => (
            StatusCode::CREATED,
            Json(RecipeMapper::to_recipe_response_dto(recipe)),
        )
            .into_response(),
        Err(e) => error_response("Failed to create recipe", e, "Error creating recipe"),
    }
}

pub async fn get_recipe(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/recipes/{}", id);

    match state.recipe_service.get_recipe(id).await {
        Ok(detail) => (StatusCode::OK, Json(RecipeMapper::to_recipe_detail_dto(detail))).into_response(),
        Err(e) => error_response("Failed to get recipe", e, "Error retrieving recipe"),
    }
}

/// Delete a recipe; plan entries pointing at it become TBD
pub async fn delete_recipe(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("DELETE /api/recipes/{}", id);

    match state.recipe_service.delete_recipe(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete recipe", e, "Error deleting recipe"),
    }
}

/// Add an ingredient line to a recipe
pub async fn add_recipe_ingredient(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
    Json(request): Json<AddRecipeIngredientRequest>,
) -> impl IntoResponse {
    info!("POST /api/recipes/{}/ingredients - request: {:?}", recipe_id, request);

    let command = AddRecipeIngredientCommand {
        recipe_id,
        ingredient_id: request.ingredient_id,
        quantity: request.quantity,
    };

    match state.recipe_service.add_ingredient(command).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(RecipeMapper::to_add_ingredient_dto(result)),
        )
            .into_response(),
        Err(e) => error_response("Failed to add recipe ingredient", e, "Error adding ingredient"),
    }
}
