use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::UnitOfMeasure;

pub const MAX_NAME_LENGTH: usize = 120;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub unit: Option<UnitOfMeasure>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a not yet stored ingredient
#[derive(Debug, Clone, PartialEq)]
pub struct NewIngredient {
    pub name: String,
    pub unit: Option<UnitOfMeasure>,
}
