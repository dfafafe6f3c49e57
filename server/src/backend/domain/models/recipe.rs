use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::UnitOfMeasure;

pub const MIN_TITLE_LENGTH: usize = 5;
pub const MAX_TITLE_LENGTH: usize = 150;
pub const MIN_QUANTITY: f64 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub servings: i64,
    pub prep_minutes: i64,
    pub cook_minutes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    pub fn total_minutes(&self) -> i64 {
        self.prep_minutes + self.cook_minutes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub servings: i64,
    pub prep_minutes: i64,
    pub cook_minutes: i64,
}

/// Join row between a recipe and one of its ingredients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub quantity: f64,
    pub unit_label: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A recipe ingredient joined with the ingredient it points to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeLine {
    pub id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub ingredient_unit: Option<UnitOfMeasure>,
    pub quantity: f64,
    pub unit_label: Option<String>,
}

/// Quantities are kept with two decimal places
pub fn round_quantity(quantity: f64) -> f64 {
    (quantity * 100.0).round() / 100.0
}
