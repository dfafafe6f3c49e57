//! # Backend Module
//!
//! Contains all non-UI logic of the meal planner.
//!
//! The backend follows a layered architecture:
//! ```text
//! HTTP clients
//!     ↓
//! IO Layer (REST handlers, DTO mappers)
//!     ↓
//! Domain Layer (services, coverage and measurement rules)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! This module wires the layers together: it builds the services on top of a
//! database connection and exposes them to the handlers through [`AppState`].

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::backend::domain::{
    ExportService, ImportService, IngredientService, MealDbClient, MealPlanService, RecipeSearch,
    RecipeService, ReportingService,
};
use crate::backend::io::rest::{
    health_apis, import_apis, ingredient_apis, meal_plan_apis, recipe_apis, report_apis,
};
use crate::backend::storage::DbConnection;
use crate::config::ServerConfig;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub ingredient_service: IngredientService,
    pub recipe_service: RecipeService,
    pub meal_plan_service: MealPlanService,
    pub import_service: ImportService,
    pub reporting_service: ReportingService,
    pub export_service: ExportService,
}

impl AppState {
    /// Build every service on one shared database handle
    pub fn new(db: DbConnection, search: Arc<dyn RecipeSearch>) -> Self {
        Self {
            ingredient_service: IngredientService::new(db.clone()),
            recipe_service: RecipeService::new(db.clone()),
            meal_plan_service: MealPlanService::new(db.clone()),
            import_service: ImportService::new(db.clone(), search),
            reporting_service: ReportingService::new(db.clone()),
            export_service: ExportService::new(db),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &ServerConfig) -> Result<AppState> {
    info!("Setting up database");
    let db = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    info!("Setting up recipe search client for {}", config.recipe_api_url);
    let search = MealDbClient::new(
        config.recipe_api_url.clone(),
        Duration::from_secs(config.recipe_api_timeout_secs),
    )
    .context("Failed to build recipe search client")?;

    info!("Setting up application state");
    Ok(AppState::new(db, Arc::new(search)))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(health_apis::health))
        .nest("/ingredients", ingredient_apis::router())
        .nest("/recipes", recipe_apis::router())
        .nest("/meal-plans", meal_plan_apis::router())
        .nest("/entries", meal_plan_apis::entries_router())
        .nest("/reports", report_apis::router())
        .nest("/imports", import_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
