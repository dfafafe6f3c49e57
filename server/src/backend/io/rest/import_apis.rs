//! # REST API for Recipe Import
//!
//! Searching the external recipe service and importing a result into the catalog.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::{ImportRecipeRequest, RecipeSearchRequest, RecipeSearchResponse};
use tracing::info;

use crate::backend::io::rest::errors::error_response;
use crate::backend::io::rest::mappers::ImportMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(import_recipe))
        .route("/search", get(search_recipes))
}

/// Candidate meals from the external service
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(request): Query<RecipeSearchRequest>,
) -> impl IntoResponse {
    info!("GET /api/imports/search - query: {:?}", request.q);

    let query = request.q.unwrap_or_default();

    match state.import_service.search(&query).await {
        Ok(meals) => (
            StatusCode::OK,
            Json(RecipeSearchResponse {
                query: query.trim().to_string(),
                meals,
            }),
        )
            .into_response(),
        Err(e) => error_response("Failed to search external recipes", e, "Error searching recipes"),
    }
}

/// Import one external recipe into the catalog
pub async fn import_recipe(
    State(state): State<AppState>,
    Json(request): Json<ImportRecipeRequest>,
) -> impl IntoResponse {
    info!("POST /api/imports - request: {:?}", request);

    let command = ImportMapper::to_import_command(request);

    match state.import_service.import(command).await {
        Ok(result) => (StatusCode::OK, Json(ImportMapper::to_import_response_dto(result))).into_response(),
        Err(e) => error_response("Failed to import recipe", e, "Error importing recipe"),
    }
}
