//! Conversions between domain models and the shared wire DTOs.

pub mod import_mapper;
pub mod ingredient_mapper;
pub mod meal_plan_mapper;
pub mod recipe_mapper;

pub use import_mapper::ImportMapper;
pub use ingredient_mapper::IngredientMapper;
pub use meal_plan_mapper::MealPlanMapper;
pub use recipe_mapper::RecipeMapper;
