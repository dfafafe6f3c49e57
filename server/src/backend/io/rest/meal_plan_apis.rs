//! # REST API for Meal Plans
//!
//! Endpoints for plans, their slot entries, the plan summary exports and the
//! cross-plan "this week" view.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, put},
    Router,
};
use chrono::Local;
use shared::{CreateMealPlanRequest, MealPlanListRequest, UpsertEntryRequest};
use tracing::info;

use crate::backend::domain::commands::meal_plans::MealPlanListQuery;
use crate::backend::domain::{ExportDocument, ExportFormat};
use crate::backend::io::rest::errors::error_response;
use crate::backend::io::rest::mappers::MealPlanMapper;
use crate::backend::AppState;

/// Routes nested under `/api/meal-plans`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_meal_plans).post(create_meal_plan))
        .route("/export.csv", get(export_csv))
        .route("/export.json", get(export_json))
        .route("/:id", get(get_meal_plan).delete(delete_meal_plan))
        .route("/:id/entries", put(upsert_entry))
        .route("/:id/entries/:entry_id", delete(delete_entry))
}

/// Routes nested under `/api/entries`
pub fn entries_router() -> Router<AppState> {
    Router::new().route("/week", get(week_entries))
}

pub async fn list_meal_plans(
    State(state): State<AppState>,
    Query(request): Query<MealPlanListRequest>,
) -> impl IntoResponse {
    info!("GET /api/meal-plans - page: {:?}", request.page);

    let query = MealPlanListQuery { page: request.page };

    match state.meal_plan_service.list_plans(query).await {
        Ok(page) => (StatusCode::OK, Json(MealPlanMapper::to_plan_list_dto(page))).into_response(),
        Err(e) => error_response("Failed to list meal plans", e, "Error listing meal plans"),
    }
}

pub async fn create_meal_plan(
    State(state): State<AppState>,
    Json(request): Json<CreateMealPlanRequest>,
) -> impl IntoResponse {
    info!("POST /api/meal-plans - request: {:?}", request);

    let command = MealPlanMapper::to_create_command(request);

    match state.meal_plan_service.create_plan(command).await {
        Ok(plan) => (
            StatusCode::CREATED,
            Json(MealPlanMapper::to_plan_response_dto(plan)),
        )
            .into_response(),
        Err(e) => error_response("Failed to create meal plan", e, "Error creating meal plan"),
    }
}

/// Get a plan with its entries and coverage
pub async fn get_meal_plan(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/meal-plans/{}", id);

    match state.meal_plan_service.get_plan(id).await {
        Ok(detail) => (StatusCode::OK, Json(MealPlanMapper::to_plan_detail_dto(detail))).into_response(),
        Err(e) => error_response("Failed to get meal plan", e, "Error retrieving meal plan"),
    }
}

pub async fn delete_meal_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/meal-plans/{}", id);

    match state.meal_plan_service.delete_plan(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete meal plan", e, "Error deleting meal plan"),
    }
}

/// Assign a recipe to a (date, meal type) slot of a plan
///
/// Answers 201 when a new entry was created and 200 when an existing slot was
/// overwritten or the idempotency key had already been processed.
pub async fn upsert_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpsertEntryRequest>,
) -> impl IntoResponse {
    info!("PUT /api/meal-plans/{}/entries - request: {:?}", id, request);

    let command = MealPlanMapper::to_upsert_command(id, request);

    match state.meal_plan_service.upsert_entry(command).await {
        Ok(result) => {
            let status = if result.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(MealPlanMapper::to_upsert_response_dto(result))).into_response()
        }
        Err(e) => error_response("Failed to upsert meal plan entry", e, "Error saving entry"),
    }
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    info!("DELETE /api/meal-plans/{}/entries/{}", id, entry_id);

    match state.meal_plan_service.delete_entry(id, entry_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete meal plan entry", e, "Error deleting entry"),
    }
}

/// Entries of every plan from today through the next six days
pub async fn week_entries(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/entries/week");

    match state.meal_plan_service.week_entries().await {
        Ok(week) => (StatusCode::OK, Json(MealPlanMapper::to_week_entries_dto(week))).into_response(),
        Err(e) => error_response("Failed to load this week's entries", e, "Error loading entries"),
    }
}

pub async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/meal-plans/export.csv");
    export(state, ExportFormat::Csv).await
}

pub async fn export_json(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/meal-plans/export.json");
    export(state, ExportFormat::Json).await
}

async fn export(state: AppState, format: ExportFormat) -> Response {
    let today = Local::now().date_naive();

    match state.export_service.export_plan_summaries(format, today).await {
        Ok(document) => download(document),
        Err(e) => error_response("Failed to export meal plans", e, "Error exporting meal plans"),
    }
}

/// Send a document as a file attachment
fn download(document: ExportDocument) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", document.filename);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.body,
    )
        .into_response()
}
