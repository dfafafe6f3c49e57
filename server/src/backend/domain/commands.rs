//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod ingredients {
    use crate::backend::domain::models::ingredient::Ingredient;
    use crate::backend::domain::models::recipe::Recipe;
    use shared::UnitOfMeasure;

    /// Input for creating an ingredient by hand.
    #[derive(Debug, Clone)]
    pub struct CreateIngredientCommand {
        pub name: String,
        pub unit: UnitOfMeasure,
    }

    /// An ingredient and the recipes using it.
    #[derive(Debug, Clone)]
    pub struct IngredientDetail {
        pub ingredient: Ingredient,
        pub recipes: Vec<Recipe>,
    }
}

pub mod recipes {
    use crate::backend::domain::models::recipe::{Recipe, RecipeLine};

    /// Input for creating a recipe.
    #[derive(Debug, Clone)]
    pub struct CreateRecipeCommand {
        pub title: String,
        pub description: Option<String>,
        pub servings: Option<i64>,
        pub prep_minutes: i64,
        pub cook_minutes: i64,
    }

    /// Query parameters for the recipe list.
    #[derive(Debug, Clone, Default)]
    pub struct RecipeListQuery {
        pub q: Option<String>,
    }

    /// Every recipe plus the search hits when a query was given.
    #[derive(Debug, Clone)]
    pub struct RecipeListResult {
        pub recipes: Vec<Recipe>,
        pub query: String,
        pub search_results: Option<Vec<Recipe>>,
    }

    impl RecipeListResult {
        pub fn results_count(&self) -> usize {
            self.search_results.as_ref().map_or(0, Vec::len)
        }
    }

    /// A recipe with its line items.
    #[derive(Debug, Clone)]
    pub struct RecipeDetail {
        pub recipe: Recipe,
        pub lines: Vec<RecipeLine>,
    }

    /// Input for adding a line item to a recipe.
    #[derive(Debug, Clone)]
    pub struct AddRecipeIngredientCommand {
        pub recipe_id: i64,
        pub ingredient_id: i64,
        pub quantity: f64,
    }

    #[derive(Debug, Clone)]
    pub struct AddRecipeIngredientResult {
        pub line: RecipeLine,
        pub success_message: String,
    }
}

pub mod meal_plans {
    use chrono::NaiveDate;
    use shared::PlanStatus;

    use crate::backend::domain::models::meal_plan::{MealPlan, MealPlanEntry};
    use crate::backend::domain::plan_coverage::PlanCoverage;
    use crate::backend::storage::DatedEntry;

    /// Input for creating a meal plan; dates are `YYYY-MM-DD` text.
    #[derive(Debug, Clone)]
    pub struct CreateMealPlanCommand {
        pub name: String,
        pub start_date: String,
        pub end_date: String,
    }

    /// Query parameters for the plan list; pages start at 1.
    #[derive(Debug, Clone, Default)]
    pub struct MealPlanListQuery {
        pub page: Option<u32>,
    }

    /// A plan with its coverage numbers.
    #[derive(Debug, Clone)]
    pub struct MealPlanSummary {
        pub plan: MealPlan,
        pub total_days: u32,
        pub covered_days: u32,
        pub coverage_percent: u32,
        pub status: PlanStatus,
    }

    /// One page of plan summaries.
    #[derive(Debug, Clone)]
    pub struct MealPlanPage {
        pub plans: Vec<MealPlanSummary>,
        pub page: u32,
        pub per_page: u32,
        pub total: u64,
        pub has_next: bool,
    }

    #[derive(Debug, Clone)]
    pub struct MealPlanDetail {
        pub plan: MealPlan,
        pub entries: Vec<MealPlanEntry>,
        pub coverage: PlanCoverage,
    }

    /// Input for assigning a recipe to a slot. Fields are optional so that
    /// missing values are reported as validation errors.
    #[derive(Debug, Clone, Default)]
    pub struct UpsertEntryCommand {
        pub meal_plan_id: i64,
        pub date: Option<String>,
        pub meal_type: Option<String>,
        pub recipe_id: Option<i64>,
        pub notes: Option<String>,
        pub idempotency_key: Option<String>,
    }

    /// Outcome of a slot upsert.
    #[derive(Debug, Clone)]
    pub struct UpsertEntryResult {
        pub entry: Option<MealPlanEntry>,
        pub created: bool,
        pub replayed: bool,
        pub success_message: Option<String>,
    }

    /// Entries of all plans in a seven-day window.
    #[derive(Debug, Clone)]
    pub struct WeekEntries {
        pub start: NaiveDate,
        pub end: NaiveDate,
        pub entries: Vec<DatedEntry>,
    }
}

pub mod imports {
    use crate::backend::domain::models::recipe::Recipe;

    /// One ingredient line of an external recipe.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ImportIngredient {
        pub name: String,
        pub measure: String,
    }

    /// An external recipe ready for reconciliation.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ImportPayload {
        pub name: String,
        pub description: String,
        pub ingredients: Vec<ImportIngredient>,
    }

    /// What a reconciliation changed in the catalog.
    #[derive(Debug, Clone)]
    pub struct ImportReport {
        pub recipe: Recipe,
        pub recipe_created: bool,
        pub ingredients_created: u32,
        pub links_created: u32,
        pub links_updated: u32,
    }

    /// Input for importing a recipe found by the external search.
    #[derive(Debug, Clone)]
    pub struct ImportRecipeCommand {
        pub query: String,
        pub meal_id: Option<String>,
        pub idempotency_key: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct ImportRecipeResult {
        pub report: Option<ImportReport>,
        pub replayed: bool,
        pub success_message: Option<String>,
    }
}
