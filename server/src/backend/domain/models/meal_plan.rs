use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::MealType;

pub const MAX_PLAN_NAME_LENGTH: usize = 120;
pub const MAX_NOTES_LENGTH: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealPlan {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MealPlan {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealPlanEntry {
    pub id: i64,
    pub meal_plan_id: i64,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub recipe_id: Option<i64>,
    /// Joined from the recipe; `None` renders as TBD
    pub recipe_title: Option<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The (plan, date, meal type) triple an entry occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub meal_plan_id: i64,
    pub date: NaiveDate,
    pub meal_type: MealType,
}
