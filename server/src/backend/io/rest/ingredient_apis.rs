//! # REST API for Ingredients
//!
//! Endpoints for creating, listing, inspecting and deleting catalog ingredients.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::CreateIngredientRequest;
use tracing::info;

use crate::backend::domain::commands::ingredients::CreateIngredientCommand;
use crate::backend::io::rest::errors::error_response;
use crate::backend::io::rest::mappers::IngredientMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ingredients).post(create_ingredient))
        .route("/:id", get(get_ingredient).delete(delete_ingredient))
}

/// Create a new ingredient
pub async fn create_ingredient(
    State(state): State<AppState>,
    Json(request): Json<CreateIngredientRequest>,
) -> impl IntoResponse {
    info!("POST /api/ingredients - request: {:?}", request);

    let command = CreateIngredientCommand {
        name: request.name,
        unit: request.unit,
    };

    match state.ingredient_service.create_ingredient(command).await {
        Ok(ingredient) => (
            StatusCode::CREATED,
            Json(IngredientMapper::to_ingredient_response_dto(ingredient)),
        )
            .into_response(),
        Err(e) => error_response("Failed to create ingredient", e, "Error creating ingredient"),
    }
}

/// List all ingredients by name
pub async fn list_ingredients(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/ingredients");

    match state.ingredient_service.list_ingredients().await {
        Ok(ingredients) => (
            StatusCode::OK,
            Json(IngredientMapper::to_ingredient_list_dto(ingredients)),
        )
            .into_response(),
        Err(e) => error_response("Failed to list ingredients", e, "Error listing ingredients"),
    }
}

/// Get an ingredient with the recipes that use it
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/ingredients/{}", id);

    match state.ingredient_service.get_ingredient(id).await {
        Ok(detail) => (
            StatusCode::OK,
            Json(IngredientMapper::to_ingredient_detail_dto(detail)),
        )
            .into_response(),
        Err(e) => error_response("Failed to get ingredient", e, "Error retrieving ingredient"),
    }
}

/// Delete an ingredient that no recipe uses
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/ingredients/{}", id);

    match state.ingredient_service.delete_ingredient(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete ingredient", e, "Error deleting ingredient"),
    }
}
