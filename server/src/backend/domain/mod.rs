//! # Domain Module
//!
//! Contains the business logic of the meal planner.
//!
//! ## Module Organization
//!
//! - **measurement**: parsing free-text amounts such as `"1 1/2 cup"`
//! - **plan_coverage**: day coverage, weekly grouping and completion status of plans
//! - **ingredient_service** / **recipe_service**: the ingredient and recipe catalog
//! - **meal_plan_service**: plans, slot upserts and the week view
//! - **recipe_search** / **recipe_import**: external recipe search and reconciliation
//! - **reporting_service** / **export_service**: summaries, charts and downloads
//!
//! ## Business Rules
//!
//! - Ingredient names and recipe titles are unique
//! - A recipe lists each ingredient at most once
//! - A plan slot (plan, date, meal type) holds at most one entry; writes to a
//!   taken slot overwrite it
//! - An ingredient used by a recipe cannot be deleted
//! - Deleting a recipe leaves its plan entries in place without a recipe (TBD)
//! - An import either applies completely or not at all

pub mod commands;
pub mod errors;
pub mod export_service;
pub mod ingredient_service;
pub mod meal_plan_service;
pub mod measurement;
pub mod models;
pub mod plan_coverage;
pub mod recipe_import;
pub mod recipe_search;
pub mod recipe_service;
pub mod reporting_service;

pub use errors::DomainError;
pub use export_service::{ExportDocument, ExportFormat, ExportService};
pub use ingredient_service::IngredientService;
pub use meal_plan_service::MealPlanService;
pub use recipe_import::{ImportService, RecipeImportReconciler};
pub use recipe_search::{MealDbClient, RecipeSearch, RecipeSearchError};
pub use recipe_service::RecipeService;
pub use reporting_service::ReportingService;
