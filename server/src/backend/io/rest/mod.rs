//! # REST API Interface Layer
//!
//! HTTP endpoints of the meal planner, one module per resource. Handlers log
//! the request, call a domain service and turn its result into JSON; failures
//! go through [`errors::error_response`] which picks the status code.

pub mod errors;
pub mod health_apis;
pub mod import_apis;
pub mod ingredient_apis;
pub mod mappers;
pub mod meal_plan_apis;
pub mod recipe_apis;
pub mod report_apis;
