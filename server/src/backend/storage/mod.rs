//! # Storage Module
//!
//! Handles all data persistence for the meal planner.
//!
//! Everything lives in a single SQLite database accessed through SQLx. The
//! schema enforces the catalog and plan invariants itself: unique ingredient
//! names and recipe titles, one line item per (recipe, ingredient), one entry
//! per (plan, date, meal type) slot, cascading plan and recipe deletes, and a
//! restricting foreign key that keeps referenced ingredients alive.
//!
//! ## Repository Pattern
//!
//! Repositories are stateless and take a `&mut SqliteConnection`, so the same
//! method runs against a pooled connection for reads or inside a transaction
//! for writes. Services decide the transaction boundaries.

pub mod connection;
pub mod repositories;

// Re-export the main types that other modules need
pub use connection::{is_foreign_key_violation, is_unique_violation, DbConnection};
pub use repositories::{
    DatedEntry, IngredientRepository, MealPlanEntryRepository, MealPlanRepository,
    ProcessedActionRepository, RecipeIngredientRepository, RecipeRepository, ReportRepository,
};
