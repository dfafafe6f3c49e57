use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit of measure an ingredient is stocked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "kg")]
    Kilograms,
    #[serde(rename = "ml")]
    Millilitres,
    #[serde(rename = "l")]
    Litres,
    #[serde(rename = "pcs")]
    Pieces,
}

/// Meal type tag of a meal plan slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// Strict completion classification of a meal plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Exactly seven days long with every day covered
    Complete,
    /// At least one covered day but not complete
    InProgress,
    /// Nothing planned yet
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    /// Unique ingredient name (max 120 characters)
    pub name: String,
    /// Unset for ingredients created by a recipe import that carried no usable unit
    pub unit: Option<UnitOfMeasure>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub unit: UnitOfMeasure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientResponse {
    pub ingredient: Ingredient,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientListResponse {
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientDetailResponse {
    pub ingredient: Ingredient,
    pub recipes: Vec<RecipeSummary>,
    pub total_recipes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    /// Unique recipe title (5 to 150 characters)
    pub title: String,
    pub description: String,
    pub servings: i64,
    pub prep_minutes: i64,
    pub cook_minutes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal recipe reference used in listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub id: i64,
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub quantity: f64,
    pub unit: Option<UnitOfMeasure>,
    /// Free-text unit from an imported measurement (e.g. "cup")
    pub unit_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to 1
    #[serde(default)]
    pub servings: Option<i64>,
    pub prep_minutes: i64,
    pub cook_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub recipe: Recipe,
    pub success_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeListRequest {
    /// Free-text search over title and description
    pub q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeListResponse {
    pub recipes: Vec<Recipe>,
    pub query: String,
    /// `None` when no search was requested
    pub search_results: Option<Vec<Recipe>>,
    pub results_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetailResponse {
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRecipeIngredientRequest {
    pub ingredient_id: i64,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRecipeIngredientResponse {
    pub line: RecipeLine,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dates arrive as `YYYY-MM-DD` strings so malformed input can be reported as a validation error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMealPlanRequest {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanResponse {
    pub plan: MealPlan,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanSummary {
    pub plan: MealPlan,
    pub total_days: u32,
    pub covered_days: u32,
    pub coverage_percent: u32,
    pub status: PlanStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealPlanListRequest {
    /// 1-based page number
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanListResponse {
    pub plans: Vec<MealPlanSummary>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanEntry {
    pub id: i64,
    pub meal_plan_id: i64,
    pub date: NaiveDate,
    pub meal_type: MealType,
    /// `None` once the planned recipe has been deleted
    pub recipe: Option<RecipeSummary>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    pub date: NaiveDate,
    pub entries: Vec<MealPlanEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanWeek {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<PlanDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCoverage {
    pub total_days: u32,
    pub covered_days: u32,
    pub coverage_percent: u32,
    pub status: PlanStatus,
    pub weeks: Vec<PlanWeek>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanDetailResponse {
    pub plan: MealPlan,
    pub entries: Vec<MealPlanEntry>,
    pub total_entries: usize,
    pub coverage: PlanCoverage,
}

/// Every field is optional on the wire so a missing value is reported as a validation error
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsertEntryRequest {
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub recipe_id: Option<i64>,
    pub notes: Option<String>,
    /// Caller-chosen token; resubmitting the same token is a no-op
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertEntryResponse {
    pub entry: Option<MealPlanEntry>,
    pub created: bool,
    pub replayed: bool,
    /// Omitted for replayed submissions
    pub success_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekEntry {
    pub plan_name: String,
    pub entry: MealPlanEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekEntriesResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub entries: Vec<WeekEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeUsage {
    pub recipe_id: i64,
    pub title: String,
    pub uses: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredientCount {
    pub recipe_id: i64,
    pub title: String,
    pub ingredient_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStatsResponse {
    pub total_recipes: i64,
    pub top_used_recipes: Vec<RecipeUsage>,
    pub recipes_by_ingredient_count: Vec<RecipeIngredientCount>,
}

/// One bar of the total time (prep + cook) histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub label: String,
    pub min_minutes: i64,
    pub max_minutes: i64,
    pub count: i64,
    pub titles: Vec<String>,
    /// Titles left out of `titles`
    pub more: i64,
    pub hover_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalTimeChartResponse {
    pub title: String,
    pub buckets: Vec<TimeBucket>,
}

/// Plans with at least seven covered days versus the rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCompletionResponse {
    pub complete: u64,
    pub incomplete: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStatusBreakdownResponse {
    pub complete: u64,
    pub in_progress: u64,
    pub empty: u64,
    pub total: u64,
}

/// Flat plan summary row used by the CSV and JSON exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummaryRecord {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: u32,
    pub covered_days: u32,
    pub coverage_percent: u32,
    pub status: PlanStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalIngredient {
    pub name: String,
    pub measure: String,
}

/// Recipe candidate returned by the external search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalMeal {
    pub id: String,
    pub name: String,
    pub instructions: String,
    pub category: Option<String>,
    pub area: Option<String>,
    pub thumbnail: Option<String>,
    pub ingredients: Vec<ExternalIngredient>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeSearchRequest {
    pub q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSearchResponse {
    pub query: String,
    pub meals: Vec<ExternalMeal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecipeRequest {
    pub query: String,
    /// Pick this meal from the search results instead of the first one
    #[serde(default)]
    pub meal_id: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecipeResponse {
    pub recipe: Option<RecipeSummary>,
    pub recipe_created: bool,
    pub ingredients_created: u32,
    pub links_created: u32,
    pub links_updated: u32,
    pub replayed: bool,
    pub success_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl UnitOfMeasure {
    pub const ALL: [UnitOfMeasure; 5] = [
        UnitOfMeasure::Grams,
        UnitOfMeasure::Kilograms,
        UnitOfMeasure::Millilitres,
        UnitOfMeasure::Litres,
        UnitOfMeasure::Pieces,
    ];

    /// Short code stored in the database
    pub fn code(&self) -> &'static str {
        match self {
            UnitOfMeasure::Grams => "g",
            UnitOfMeasure::Kilograms => "kg",
            UnitOfMeasure::Millilitres => "ml",
            UnitOfMeasure::Litres => "l",
            UnitOfMeasure::Pieces => "pcs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UnitOfMeasure::Grams => "grams",
            UnitOfMeasure::Kilograms => "kilograms",
            UnitOfMeasure::Millilitres => "millilitres",
            UnitOfMeasure::Litres => "litres",
            UnitOfMeasure::Pieces => "pieces",
        }
    }

    /// Map a free-text measurement unit (e.g. "Grams", "litre") onto the fixed set
    pub fn from_measure_unit(text: &str) -> Option<Self> {
        let normalized = text.trim().trim_end_matches('.').to_lowercase();
        match normalized.as_str() {
            "g" | "gr" | "gram" | "grams" | "gramme" | "grammes" => Some(UnitOfMeasure::Grams),
            "kg" | "kilo" | "kilos" | "kilogram" | "kilograms" => Some(UnitOfMeasure::Kilograms),
            "ml" | "millilitre" | "millilitres" | "milliliter" | "milliliters" => {
                Some(UnitOfMeasure::Millilitres)
            }
            "l" | "litre" | "litres" | "liter" | "liters" => Some(UnitOfMeasure::Litres),
            "pc" | "pcs" | "piece" | "pieces" => Some(UnitOfMeasure::Pieces),
            _ => None,
        }
    }
}

impl FromStr for UnitOfMeasure {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.code() == s)
            .ok_or_else(|| ParseEnumError::new("unit of measure", s))
    }
}

impl fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl FromStr for MealType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|meal_type| meal_type.as_str() == normalized)
            .ok_or_else(|| ParseEnumError::new("meal type", s))
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl PlanStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PlanStatus::Complete => "Complete",
            PlanStatus::InProgress => "In-Progress",
            PlanStatus::Empty => "Empty",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl MealPlanEntry {
    /// Title of the planned recipe, or "TBD" when the slot has none
    pub fn recipe_label(&self) -> &str {
        self.recipe.as_ref().map(|r| r.title.as_str()).unwrap_or("TBD")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}
