use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::backend::domain::commands::ingredients::{CreateIngredientCommand, IngredientDetail};
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::ingredient::{Ingredient, NewIngredient, MAX_NAME_LENGTH};
use crate::backend::storage::{
    is_foreign_key_violation, is_unique_violation, DbConnection, IngredientRepository,
    RecipeRepository,
};

/// Service for the ingredient catalog
#[derive(Clone)]
pub struct IngredientService {
    db: DbConnection,
    ingredients: IngredientRepository,
    recipes: RecipeRepository,
}

impl IngredientService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            db,
            ingredients: IngredientRepository::new(),
            recipes: RecipeRepository::new(),
        }
    }

    /// Create a new ingredient
    pub async fn create_ingredient(&self, command: CreateIngredientCommand) -> Result<Ingredient> {
        let name = command.name.trim().to_string();
        info!("Creating ingredient: name={}, unit={}", name, command.unit.code());

        if name.is_empty() {
            return Err(DomainError::validation("Ingredient name cannot be empty").into());
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Ingredient name cannot exceed {} characters",
                MAX_NAME_LENGTH
            ))
            .into());
        }

        let mut conn = self.db.acquire().await?;
        let new_ingredient = NewIngredient {
            name,
            unit: Some(command.unit),
        };
        let ingredient = match self.ingredients.insert(&mut conn, &new_ingredient, Utc::now()).await {
            Ok(ingredient) => ingredient,
            Err(e) if is_unique_violation(&e) => {
                warn!("Duplicate ingredient name: {}", new_ingredient.name);
                return Err(DomainError::conflict(format!(
                    "Ingredient '{}' already exists",
                    new_ingredient.name
                ))
                .into());
            }
            Err(e) => return Err(e),
        };

        info!("Created ingredient {} with ID {}", ingredient.name, ingredient.id);
        Ok(ingredient)
    }

    /// List all ingredients ordered by name
    pub async fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        let mut conn = self.db.acquire().await?;
        let ingredients = self.ingredients.list(&mut conn).await?;
        info!("Found {} ingredients", ingredients.len());
        Ok(ingredients)
    }

    /// An ingredient with the recipes that use it
    pub async fn get_ingredient(&self, id: i64) -> Result<IngredientDetail> {
        let mut conn = self.db.acquire().await?;
        let ingredient = self
            .ingredients
            .get(&mut conn, id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Ingredient {} not found", id)))?;
        let recipes = self.recipes.list_using_ingredient(&mut conn, id).await?;

        Ok(IngredientDetail { ingredient, recipes })
    }

    /// Delete an ingredient that no recipe references
    ///
    /// References are counted inside the delete transaction; the RESTRICT
    /// foreign key still rejects a line added in between.
    pub async fn delete_ingredient(&self, id: i64) -> Result<()> {
        info!("Deleting ingredient: {}", id);

        let mut tx = self.db.begin().await?;
        let ingredient = match self.ingredients.get(&mut *tx, id).await? {
            Some(ingredient) => ingredient,
            None => {
                tx.rollback().await?;
                return Err(DomainError::not_found(format!("Ingredient {} not found", id)).into());
            }
        };

        let references = self.ingredients.count_references(&mut *tx, id).await?;
        if references > 0 {
            tx.rollback().await?;
            return Err(in_use_error(ingredient.name, references));
        }

        match self.ingredients.delete(&mut *tx, id).await {
            Ok(true) => {
                tx.commit().await?;
                info!("Deleted ingredient {}", ingredient.name);
                Ok(())
            }
            Ok(false) => Err(DomainError::not_found(format!("Ingredient {} not found", id)).into()),
            Err(e) if is_foreign_key_violation(&e) => {
                tx.rollback().await?;
                let mut conn = self.db.acquire().await?;
                let references = self.ingredients.count_references(&mut conn, id).await?;
                Err(in_use_error(ingredient.name, references))
            }
            Err(e) => Err(e),
        }
    }
}

fn in_use_error(ingredient: String, references: i64) -> anyhow::Error {
    warn!("Refusing to delete ingredient {} with {} references", ingredient, references);
    DomainError::IngredientInUse {
        ingredient,
        references,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::commands::recipes::{AddRecipeIngredientCommand, CreateRecipeCommand};
    use crate::backend::domain::recipe_service::RecipeService;
    use shared::UnitOfMeasure;

    async fn setup_test() -> (IngredientService, RecipeService, DbConnection) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        (IngredientService::new(db.clone()), RecipeService::new(db.clone()), db)
    }

    fn create_command(name: &str) -> CreateIngredientCommand {
        CreateIngredientCommand {
            name: name.to_string(),
            unit: UnitOfMeasure::Grams,
        }
    }

    fn domain_error(err: &anyhow::Error) -> Option<&DomainError> {
        err.downcast_ref::<DomainError>()
    }

    #[tokio::test]
    async fn test_create_trims_name() {
        let (service, _, _) = setup_test().await;

        let ingredient = service.create_ingredient(create_command("  Sugar  ")).await.unwrap();

        assert_eq!(ingredient.name, "Sugar");
        assert_eq!(ingredient.unit, Some(UnitOfMeasure::Grams));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (service, _, _) = setup_test().await;

        let err = service.create_ingredient(create_command("   ")).await.unwrap_err();
        assert!(matches!(domain_error(&err), Some(DomainError::Validation(_))));

        let err = service
            .create_ingredient(create_command(&"x".repeat(MAX_NAME_LENGTH + 1)))
            .await
            .unwrap_err();
        assert!(matches!(domain_error(&err), Some(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let (service, _, _) = setup_test().await;

        service.create_ingredient(create_command("Rice")).await.unwrap();
        let err = service.create_ingredient(create_command("Rice")).await.unwrap_err();

        assert!(matches!(domain_error(&err), Some(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_detail_lists_recipes_using_ingredient() {
        let (service, recipes, _) = setup_test().await;
        let rice = service.create_ingredient(create_command("Rice")).await.unwrap();
        let recipe = recipes
            .create_recipe(CreateRecipeCommand {
                title: "Rice pudding".to_string(),
                description: None,
                servings: Some(4),
                prep_minutes: 5,
                cook_minutes: 40,
            })
            .await
            .unwrap();
        recipes
            .add_ingredient(AddRecipeIngredientCommand {
                recipe_id: recipe.id,
                ingredient_id: rice.id,
                quantity: 200.0,
            })
            .await
            .unwrap();

        let detail = service.get_ingredient(rice.id).await.unwrap();

        assert_eq!(detail.recipes.len(), 1);
        assert_eq!(detail.recipes[0].title, "Rice pudding");

        let err = service.get_ingredient(rice.id + 100).await.unwrap_err();
        assert!(matches!(domain_error(&err), Some(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_referenced_ingredient_fails_and_keeps_rows() {
        let (service, recipes, db) = setup_test().await;
        let flour = service.create_ingredient(create_command("Flour")).await.unwrap();
        let recipe = recipes
            .create_recipe(CreateRecipeCommand {
                title: "Flatbread".to_string(),
                description: None,
                servings: None,
                prep_minutes: 10,
                cook_minutes: 10,
            })
            .await
            .unwrap();
        recipes
            .add_ingredient(AddRecipeIngredientCommand {
                recipe_id: recipe.id,
                ingredient_id: flour.id,
                quantity: 250.0,
            })
            .await
            .unwrap();

        let err = service.delete_ingredient(flour.id).await.unwrap_err();

        assert_eq!(
            domain_error(&err),
            Some(&DomainError::IngredientInUse {
                ingredient: "Flour".to_string(),
                references: 1
            })
        );
        assert!(service.get_ingredient(flour.id).await.is_ok());
        let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipe_ingredients")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(lines, 1);
    }

    #[tokio::test]
    async fn test_delete_unused_ingredient() {
        let (service, _, _) = setup_test().await;
        let salt = service.create_ingredient(create_command("Salt")).await.unwrap();

        service.delete_ingredient(salt.id).await.unwrap();

        assert!(service.list_ingredients().await.unwrap().is_empty());
        let err = service.delete_ingredient(salt.id).await.unwrap_err();
        assert!(matches!(domain_error(&err), Some(DomainError::NotFound(_))));
    }
}
