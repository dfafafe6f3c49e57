// Repository modules
pub mod ingredient_repository;
pub mod meal_plan_entry_repository;
pub mod meal_plan_repository;
pub mod processed_action_repository;
pub mod recipe_ingredient_repository;
pub mod recipe_repository;
pub mod report_repository;

// Re-export repository types
pub use ingredient_repository::IngredientRepository;
pub use meal_plan_entry_repository::{DatedEntry, MealPlanEntryRepository};
pub use meal_plan_repository::MealPlanRepository;
pub use processed_action_repository::ProcessedActionRepository;
pub use recipe_ingredient_repository::RecipeIngredientRepository;
pub use recipe_repository::RecipeRepository;
pub use report_repository::{IngredientCountRow, PlanCoveredDays, RecipeUsageRow, ReportRepository};
