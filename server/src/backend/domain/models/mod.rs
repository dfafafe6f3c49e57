pub mod ingredient;
pub mod meal_plan;
pub mod recipe;
