//! # REST API for Reports
//!
//! Read-only summaries backing the dashboard charts.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use crate::backend::io::rest::errors::error_response;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(recipe_stats))
        .route("/total-time", get(total_time_chart))
        .route("/plan-completion", get(plan_completion))
        .route("/plan-status", get(plan_status_breakdown))
}

/// Recipe count, most planned recipes and ingredient counts
pub async fn recipe_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/recipes");

    match state.reporting_service.recipe_stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => error_response("Failed to compute recipe stats", e, "Error computing recipe stats"),
    }
}

/// Histogram of total (prep + cook) minutes
pub async fn total_time_chart(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/total-time");

    match state.reporting_service.total_time_chart().await {
        Ok(chart) => (StatusCode::OK, Json(chart)).into_response(),
        Err(e) => error_response("Failed to build total time chart", e, "Error building chart"),
    }
}

pub async fn plan_completion(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/plan-completion");

    match state.reporting_service.plan_completion().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response("Failed to compute plan completion", e, "Error computing plan completion"),
    }
}

pub async fn plan_status_breakdown(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/plan-status");

    match state.reporting_service.plan_status_breakdown().await {
        Ok(breakdown) => (StatusCode::OK, Json(breakdown)).into_response(),
        Err(e) => error_response("Failed to compute plan statuses", e, "Error computing plan statuses"),
    }
}
