//! Importing external recipes into the local catalog.
//!
//! [`RecipeImportReconciler`] folds one external recipe into the catalog:
//! the recipe is found by title or created, each ingredient is matched by
//! case-insensitive name or created, and each recipe/ingredient link is
//! created or has its quantity refreshed. It works on a caller-provided
//! connection so that [`ImportService`] can run the whole reconciliation in
//! one transaction; a failure anywhere rolls every write back.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use shared::{ExternalMeal, UnitOfMeasure};
use sqlx::SqliteConnection;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::backend::domain::commands::imports::{
    ImportIngredient, ImportPayload, ImportRecipeCommand, ImportRecipeResult, ImportReport,
};
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::measurement::parse_measure;
use crate::backend::domain::models::ingredient::NewIngredient;
use crate::backend::domain::models::recipe::{round_quantity, NewRecipe, MIN_QUANTITY};
use crate::backend::domain::recipe_search::RecipeSearch;
use crate::backend::storage::{
    DbConnection, IngredientRepository, ProcessedActionRepository, RecipeIngredientRepository,
    RecipeRepository,
};

/// Quantity used for a new link when the measure has no usable number
pub const DEFAULT_QUANTITY: f64 = 1.0;

const IMPORT_ACTION: &str = "import_recipe";

/// Reason reported to callers when the catalog write fails; details go to the log
const RECONCILE_FAILED: &str = "the recipe could not be saved to the catalog";

impl From<&ExternalMeal> for ImportPayload {
    fn from(meal: &ExternalMeal) -> Self {
        ImportPayload {
            name: meal.name.clone(),
            description: meal.instructions.clone(),
            ingredients: meal
                .ingredients
                .iter()
                .map(|i| ImportIngredient {
                    name: i.name.clone(),
                    measure: i.measure.clone(),
                })
                .collect(),
        }
    }
}

/// Create-or-update logic for one imported recipe
#[derive(Clone, Default)]
pub struct RecipeImportReconciler {
    recipes: RecipeRepository,
    ingredients: IngredientRepository,
    links: RecipeIngredientRepository,
}

impl RecipeImportReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reconcile(
        &self,
        conn: &mut SqliteConnection,
        payload: &ImportPayload,
        now: DateTime<Utc>,
    ) -> Result<ImportReport> {
        let title = payload.name.trim();
        if title.is_empty() {
            return Err(anyhow!("External recipe has no name"));
        }
        let description = payload.description.trim();

        let (recipe, recipe_created) = match self.recipes.find_by_title(conn, title).await? {
            Some(mut recipe) => {
                if recipe.description.trim().is_empty() && !description.is_empty() {
                    self.recipes
                        .set_description(conn, recipe.id, description, now)
                        .await?;
                    recipe.description = description.to_string();
                    recipe.updated_at = now;
                }
                (recipe, false)
            }
            None => {
                let new_recipe = NewRecipe {
                    title: title.to_string(),
                    description: description.to_string(),
                    servings: 1,
                    prep_minutes: 0,
                    cook_minutes: 0,
                };
                (self.recipes.insert(conn, &new_recipe, now).await?, true)
            }
        };

        let mut report = ImportReport {
            recipe,
            recipe_created,
            ingredients_created: 0,
            links_created: 0,
            links_updated: 0,
        };

        for item in &payload.ingredients {
            let name = item.name.trim();
            if name.is_empty() {
                continue;
            }
            self.reconcile_ingredient(conn, report.recipe.id, name, &item.measure, now, &mut report)
                .await?;
        }

        Ok(report)
    }

    async fn reconcile_ingredient(
        &self,
        conn: &mut SqliteConnection,
        recipe_id: i64,
        name: &str,
        measure: &str,
        now: DateTime<Utc>,
        report: &mut ImportReport,
    ) -> Result<()> {
        let measurement = parse_measure(measure);
        let unit_label = measurement.unit_text();
        let unit = unit_label.and_then(UnitOfMeasure::from_measure_unit);

        let ingredient = match self.ingredients.find_by_name_ignore_case(conn, name).await? {
            Some(existing) => {
                if existing.unit.is_none() {
                    if let Some(unit) = unit {
                        self.ingredients.set_unit(conn, existing.id, unit, now).await?;
                    }
                }
                existing
            }
            None => {
                report.ingredients_created += 1;
                let new_ingredient = NewIngredient {
                    name: name.to_string(),
                    unit,
                };
                self.ingredients.insert(conn, &new_ingredient, now).await?
            }
        };

        let quantity = measurement
            .positive_quantity()
            .map(|q| round_quantity(q).max(MIN_QUANTITY));

        match self.links.find(conn, recipe_id, ingredient.id).await? {
            Some(link) => {
                if let Some(quantity) = quantity {
                    self.links
                        .update_quantity(conn, link.id, quantity, unit_label, now)
                        .await?;
                    report.links_updated += 1;
                }
            }
            None => {
                self.links
                    .insert(
                        conn,
                        recipe_id,
                        ingredient.id,
                        quantity.unwrap_or(DEFAULT_QUANTITY),
                        unit_label,
                        now,
                    )
                    .await?;
                report.links_created += 1;
            }
        }

        Ok(())
    }
}

/// Searches the external catalog and imports a chosen result
#[derive(Clone)]
pub struct ImportService {
    db: DbConnection,
    search: Arc<dyn RecipeSearch>,
    reconciler: RecipeImportReconciler,
    processed: ProcessedActionRepository,
}

impl ImportService {
    pub fn new(db: DbConnection, search: Arc<dyn RecipeSearch>) -> Self {
        Self {
            db,
            search,
            reconciler: RecipeImportReconciler::new(),
            processed: ProcessedActionRepository::new(),
        }
    }

    /// Candidate meals for a query; a blank query yields nothing
    pub async fn search(&self, query: &str) -> Result<Vec<ExternalMeal>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        info!("Searching external recipes: '{}'", query);
        let meals = self.search.search(query).await.map_err(|e| {
            error!("External recipe search failed: {}", e);
            DomainError::ImportFailed(e.to_string())
        })?;
        info!("External search '{}' returned {} meals", query, meals.len());
        Ok(meals)
    }

    /// Search, pick a meal and reconcile it into the catalog in one transaction
    pub async fn import(&self, command: ImportRecipeCommand) -> Result<ImportRecipeResult> {
        let query = command.query.trim();
        if query.is_empty() {
            return Err(DomainError::validation("Search query cannot be empty").into());
        }

        let meals = self.search(query).await?;
        let meal = match command.meal_id.as_deref() {
            Some(meal_id) => meals.iter().find(|m| m.id == meal_id),
            None => meals.first(),
        }
        .ok_or_else(|| DomainError::not_found(format!("No external recipe found for '{}'", query)))?;
        let payload = ImportPayload::from(meal);

        info!("Importing external recipe {} '{}'", meal.id, meal.name);
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        if let Some(key) = command.idempotency_key.as_deref() {
            if !self.processed.record(&mut *tx, key, IMPORT_ACTION, now).await? {
                tx.rollback().await?;
                info!("Idempotency key {} already processed, skipping import", key);
                return Ok(ImportRecipeResult {
                    report: None,
                    replayed: true,
                    success_message: None,
                });
            }
        }

        let report = match self.reconciler.reconcile(&mut *tx, &payload, now).await {
            Ok(report) => report,
            Err(e) => {
                error!("Import of '{}' failed, rolling back: {}", payload.name, e);
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback after failed import also failed: {}", rollback_err);
                }
                return Err(DomainError::ImportFailed(RECONCILE_FAILED.to_string()).into());
            }
        };
        tx.commit().await?;

        let success_message = import_message(&report);
        info!("{}", success_message);

        Ok(ImportRecipeResult {
            report: Some(report),
            replayed: false,
            success_message: Some(success_message),
        })
    }
}

fn import_message(report: &ImportReport) -> String {
    let verb = if report.recipe_created { "Imported" } else { "Updated" };
    format!(
        "{} \"{}\": {} new ingredient(s), {} link(s) created, {} updated.",
        verb,
        report.recipe.title,
        report.ingredients_created,
        report.links_created,
        report.links_updated
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::recipe_search::RecipeSearchError;
    use async_trait::async_trait;
    use shared::ExternalIngredient;

    /// Search double returning canned meals or a canned failure
    struct FakeSearch {
        meals: Vec<ExternalMeal>,
        fail: bool,
    }

    #[async_trait]
    impl RecipeSearch for FakeSearch {
        async fn search(&self, _query: &str) -> Result<Vec<ExternalMeal>, RecipeSearchError> {
            if self.fail {
                Err(RecipeSearchError::Timeout)
            } else {
                Ok(self.meals.clone())
            }
        }
    }

    fn meal(id: &str, name: &str, ingredients: &[(&str, &str)]) -> ExternalMeal {
        ExternalMeal {
            id: id.to_string(),
            name: name.to_string(),
            instructions: "Mix and bake.".to_string(),
            category: Some("Dessert".to_string()),
            area: None,
            thumbnail: None,
            ingredients: ingredients
                .iter()
                .map(|(name, measure)| ExternalIngredient {
                    name: name.to_string(),
                    measure: measure.to_string(),
                })
                .collect(),
        }
    }

    fn import_service(db: &DbConnection, meals: Vec<ExternalMeal>, fail: bool) -> ImportService {
        ImportService::new(db.clone(), Arc::new(FakeSearch { meals, fail }))
    }

    fn command(query: &str) -> ImportRecipeCommand {
        ImportRecipeCommand {
            query: query.to_string(),
            meal_id: None,
            idempotency_key: None,
        }
    }

    async fn count(db: &DbConnection, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    fn domain_error(err: &anyhow::Error) -> Option<&DomainError> {
        err.downcast_ref::<DomainError>()
    }

    #[tokio::test]
    async fn test_import_creates_catalog_rows() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let meals = vec![meal(
            "1",
            "Apple Crumble",
            &[("Apples", "4"), ("Flour", "200g"), ("Butter", "1 1/2 sticks"), ("", "1 cup")],
        )];
        let service = import_service(&db, meals, false);

        let result = service.import(command("crumble")).await.unwrap();
        let report = result.report.unwrap();

        assert!(report.recipe_created);
        assert_eq!(report.recipe.title, "Apple Crumble");
        assert_eq!(report.recipe.description, "Mix and bake.");
        assert_eq!(report.ingredients_created, 3);
        assert_eq!(report.links_created, 3);
        assert_eq!(report.links_updated, 0);
        assert_eq!(
            result.success_message.as_deref(),
            Some("Imported \"Apple Crumble\": 3 new ingredient(s), 3 link(s) created, 0 updated.")
        );

        let flour_unit: Option<String> =
            sqlx::query_scalar("SELECT unit FROM ingredients WHERE name = 'Flour'")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(flour_unit.as_deref(), Some("g"));

        let butter: (f64, Option<String>) = sqlx::query_as(
            "SELECT ri.quantity, ri.unit_label FROM recipe_ingredients ri JOIN ingredients i ON i.id = ri.ingredient_id WHERE i.name = 'Butter'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(butter, (1.5, Some("sticks".to_string())));
    }

    #[tokio::test]
    async fn test_importing_twice_updates_instead_of_duplicating() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");

        let first = import_service(
            &db,
            vec![meal("7", "Pancakes", &[("Milk", "300ml"), ("Eggs", "2"), ("Salt", "pinch")])],
            false,
        );
        first.import(command("pancakes")).await.unwrap();

        let second = import_service(
            &db,
            vec![meal("7", "Pancakes", &[("milk", "350 ml"), ("Eggs", "3"), ("Salt", "to taste")])],
            false,
        );
        let report = second.import(command("pancakes")).await.unwrap().report.unwrap();

        assert!(!report.recipe_created);
        assert_eq!(report.ingredients_created, 0);
        assert_eq!(report.links_created, 0);
        // Salt has no parseable quantity the second time either
        assert_eq!(report.links_updated, 2);

        assert_eq!(count(&db, "recipes").await, 1);
        assert_eq!(count(&db, "ingredients").await, 3);
        assert_eq!(count(&db, "recipe_ingredients").await, 3);

        let milk: f64 = sqlx::query_scalar(
            "SELECT ri.quantity FROM recipe_ingredients ri JOIN ingredients i ON i.id = ri.ingredient_id WHERE i.name = 'Milk'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(milk, 350.0);

        let salt: f64 = sqlx::query_scalar(
            "SELECT ri.quantity FROM recipe_ingredients ri JOIN ingredients i ON i.id = ri.ingredient_id WHERE i.name = 'Salt'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(salt, DEFAULT_QUANTITY);
    }

    #[tokio::test]
    async fn test_existing_recipe_gets_description_backfilled() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let reconciler = RecipeImportReconciler::new();
        RecipeRepository::new()
            .insert(
                &mut conn,
                &NewRecipe {
                    title: "Shepherd's pie".to_string(),
                    description: String::new(),
                    servings: 4,
                    prep_minutes: 20,
                    cook_minutes: 40,
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let payload = ImportPayload {
            name: "Shepherd's pie".to_string(),
            description: "Brown the lamb.".to_string(),
            ingredients: vec![],
        };
        let report = reconciler.reconcile(&mut conn, &payload, Utc::now()).await.unwrap();

        assert!(!report.recipe_created);
        assert_eq!(report.recipe.description, "Brown the lamb.");
        assert_eq!(report.recipe.servings, 4);
    }

    #[tokio::test]
    async fn test_existing_ingredient_unit_is_filled_once() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let reconciler = RecipeImportReconciler::new();
        let ingredients = IngredientRepository::new();
        let sugar = ingredients
            .insert(&mut conn, &NewIngredient { name: "Sugar".to_string(), unit: None }, Utc::now())
            .await
            .unwrap();

        let payload = ImportPayload {
            name: "Lemonade".to_string(),
            description: String::new(),
            ingredients: vec![ImportIngredient {
                name: "SUGAR".to_string(),
                measure: "100 grams".to_string(),
            }],
        };
        reconciler.reconcile(&mut conn, &payload, Utc::now()).await.unwrap();

        let sugar = ingredients.get(&mut conn, sugar.id).await.unwrap().unwrap();
        assert_eq!(sugar.name, "Sugar");
        assert_eq!(sugar.unit, Some(UnitOfMeasure::Grams));
    }

    #[tokio::test]
    async fn test_accented_ingredient_matches_regardless_of_case() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let reconciler = RecipeImportReconciler::new();
        let ingredients = IngredientRepository::new();
        ingredients
            .insert(
                &mut conn,
                &NewIngredient { name: "Crème fraîche".to_string(), unit: None },
                Utc::now(),
            )
            .await
            .unwrap();

        let payload = ImportPayload {
            name: "Mushroom tart".to_string(),
            description: String::new(),
            ingredients: vec![ImportIngredient {
                name: "CRÈME FRAÎCHE".to_string(),
                measure: "200 ml".to_string(),
            }],
        };
        let report = reconciler.reconcile(&mut conn, &payload, Utc::now()).await.unwrap();

        assert_eq!(report.ingredients_created, 0);
        assert_eq!(report.links_created, 1);
        let names: Vec<String> = ingredients
            .list(&mut conn)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Crème fraîche"]);
    }

    #[tokio::test]
    async fn test_search_failure_is_import_failed_and_changes_nothing() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let service = import_service(&db, vec![], true);

        let err = service.import(command("anything")).await.unwrap_err();

        assert!(matches!(domain_error(&err), Some(DomainError::ImportFailed(_))));
        assert_eq!(count(&db, "recipes").await, 0);
    }

    #[tokio::test]
    async fn test_no_match_is_not_found() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let service = import_service(&db, vec![meal("1", "Flan", &[])], false);

        let err = service
            .import(ImportRecipeCommand {
                meal_id: Some("999".to_string()),
                ..command("flan")
            })
            .await
            .unwrap_err();
        assert!(matches!(domain_error(&err), Some(DomainError::NotFound(_))));

        let service = import_service(&db, vec![], false);
        let err = service.import(command("flan")).await.unwrap_err();
        assert!(matches!(domain_error(&err), Some(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_reconciliation_rolls_back_everything() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        // A trigger makes the third ingredient insert fail midway through the import
        sqlx::query(
            r#"
            CREATE TRIGGER reject_poison BEFORE INSERT ON ingredients
            WHEN NEW.name = 'Poison'
            BEGIN SELECT RAISE(ABORT, 'poisoned ingredient'); END;
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let service = import_service(
            &db,
            vec![meal("3", "Suspicious stew", &[("Carrot", "2"), ("Onion", "1"), ("Poison", "1 tsp")])],
            false,
        );
        let err = service.import(command("stew")).await.unwrap_err();

        assert_eq!(
            domain_error(&err),
            Some(&DomainError::ImportFailed(RECONCILE_FAILED.to_string()))
        );
        assert!(!err.to_string().contains("poisoned"));
        assert_eq!(count(&db, "recipes").await, 0);
        assert_eq!(count(&db, "ingredients").await, 0);
        assert_eq!(count(&db, "recipe_ingredients").await, 0);
    }

    #[tokio::test]
    async fn test_replayed_import_key_skips_write() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let service = import_service(&db, vec![meal("5", "Gazpacho", &[("Tomato", "6")])], false);
        let keyed = ImportRecipeCommand {
            idempotency_key: Some("import-1".to_string()),
            ..command("gazpacho")
        };

        let first = service.import(keyed.clone()).await.unwrap();
        let second = service.import(keyed).await.unwrap();

        assert!(!first.replayed);
        assert!(second.replayed);
        assert!(second.report.is_none());
        assert!(second.success_message.is_none());
        assert_eq!(count(&db, "recipe_ingredients").await, 1);
    }

    #[tokio::test]
    async fn test_blank_search_returns_nothing() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let service = import_service(&db, vec![meal("1", "Flan", &[])], false);

        assert!(service.search("   ").await.unwrap().is_empty());
        assert_eq!(service.search("flan").await.unwrap().len(), 1);
    }
}
