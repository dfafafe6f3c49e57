use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::backend::domain::commands::recipes::{
    AddRecipeIngredientCommand, AddRecipeIngredientResult, CreateRecipeCommand, RecipeDetail,
    RecipeListQuery, RecipeListResult,
};
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::recipe::{
    round_quantity, NewRecipe, Recipe, RecipeLine, MAX_TITLE_LENGTH, MIN_QUANTITY,
    MIN_TITLE_LENGTH,
};
use crate::backend::storage::{
    is_unique_violation, DbConnection, IngredientRepository, RecipeIngredientRepository,
    RecipeRepository,
};

/// Service for recipes and their line items
#[derive(Clone)]
pub struct RecipeService {
    db: DbConnection,
    recipes: RecipeRepository,
    ingredients: IngredientRepository,
    lines: RecipeIngredientRepository,
}

impl RecipeService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            db,
            recipes: RecipeRepository::new(),
            ingredients: IngredientRepository::new(),
            lines: RecipeIngredientRepository::new(),
        }
    }

    /// Create a new recipe
    pub async fn create_recipe(&self, command: CreateRecipeCommand) -> Result<Recipe> {
        info!("Creating recipe: title={}", command.title);

        let new_recipe = Self::validate_create_command(command)?;

        let mut conn = self.db.acquire().await?;
        match self.recipes.insert(&mut conn, &new_recipe, Utc::now()).await {
            Ok(recipe) => {
                info!("Created recipe {} with ID {}", recipe.title, recipe.id);
                Ok(recipe)
            }
            Err(e) if is_unique_violation(&e) => {
                warn!("Duplicate recipe title: {}", new_recipe.title);
                Err(DomainError::conflict(format!(
                    "A recipe titled '{}' already exists",
                    new_recipe.title
                ))
                .into())
            }
            Err(e) => Err(e),
        }
    }

    /// All recipes by title, plus title/description matches for a non-blank query
    pub async fn list_recipes(&self, query: RecipeListQuery) -> Result<RecipeListResult> {
        let q = query.q.as_deref().map(str::trim).unwrap_or("").to_string();

        let mut conn = self.db.acquire().await?;
        let recipes = self.recipes.list(&mut conn).await?;
        let search_results = if q.is_empty() {
            None
        } else {
            let hits = self.recipes.search(&mut conn, &q).await?;
            info!("Recipe search '{}' matched {} recipes", q, hits.len());
            Some(hits)
        };

        Ok(RecipeListResult {
            recipes,
            query: q,
            search_results,
        })
    }

    /// A recipe with its line items in insertion order
    pub async fn get_recipe(&self, id: i64) -> Result<RecipeDetail> {
        let mut conn = self.db.acquire().await?;
        let recipe = self
            .recipes
            .get(&mut conn, id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Recipe {} not found", id)))?;
        let lines = self.lines.list_lines(&mut conn, id).await?;

        Ok(RecipeDetail { recipe, lines })
    }

    /// Delete a recipe; its line items go with it and plan entries keep their slot
    pub async fn delete_recipe(&self, id: i64) -> Result<()> {
        info!("Deleting recipe: {}", id);

        let mut conn = self.db.acquire().await?;
        if !self.recipes.delete(&mut conn, id).await? {
            return Err(DomainError::not_found(format!("Recipe {} not found", id)).into());
        }

        info!("Deleted recipe {}", id);
        Ok(())
    }

    /// Add an ingredient line to a recipe
    pub async fn add_ingredient(
        &self,
        command: AddRecipeIngredientCommand,
    ) -> Result<AddRecipeIngredientResult> {
        info!(
            "Adding ingredient {} to recipe {}: quantity={}",
            command.ingredient_id, command.recipe_id, command.quantity
        );

        if !command.quantity.is_finite() {
            return Err(DomainError::validation("Quantity must be a number").into());
        }
        let quantity = round_quantity(command.quantity);
        if quantity < MIN_QUANTITY {
            return Err(DomainError::validation(format!(
                "Quantity must be at least {}",
                MIN_QUANTITY
            ))
            .into());
        }

        let mut conn = self.db.acquire().await?;
        let recipe = self
            .recipes
            .get(&mut conn, command.recipe_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Recipe {} not found", command.recipe_id)))?;
        let ingredient = self
            .ingredients
            .get(&mut conn, command.ingredient_id)
            .await?
            .ok_or_else(|| DomainError::validation("Selected ingredient does not exist"))?;

        let link = match self
            .lines
            .insert(&mut conn, recipe.id, ingredient.id, quantity, None, Utc::now())
            .await
        {
            Ok(link) => link,
            Err(e) if is_unique_violation(&e) => {
                return Err(DomainError::conflict(format!(
                    "{} is already part of \"{}\"",
                    ingredient.name, recipe.title
                ))
                .into());
            }
            Err(e) => return Err(e),
        };

        let line = RecipeLine {
            id: link.id,
            recipe_id: recipe.id,
            ingredient_id: ingredient.id,
            ingredient_name: ingredient.name.clone(),
            ingredient_unit: ingredient.unit,
            quantity,
            unit_label: None,
        };
        let success_message = added_message(&line, &recipe.title);
        info!("{}", success_message);

        Ok(AddRecipeIngredientResult {
            line,
            success_message,
        })
    }

    fn validate_create_command(command: CreateRecipeCommand) -> Result<NewRecipe> {
        let title = command.title.trim().to_string();
        let title_length = title.chars().count();
        if title_length < MIN_TITLE_LENGTH {
            return Err(DomainError::validation(format!(
                "Title must be at least {} characters",
                MIN_TITLE_LENGTH
            ))
            .into());
        }
        if title_length > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(format!(
                "Title cannot exceed {} characters",
                MAX_TITLE_LENGTH
            ))
            .into());
        }

        let servings = command.servings.unwrap_or(1);
        if servings < 1 {
            return Err(DomainError::validation("Servings must be at least 1").into());
        }
        if command.prep_minutes < 0 || command.cook_minutes < 0 {
            return Err(DomainError::validation("Prep and cook minutes cannot be negative").into());
        }

        Ok(NewRecipe {
            title,
            description: command
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            servings,
            prep_minutes: command.prep_minutes,
            cook_minutes: command.cook_minutes,
        })
    }
}

/// `Added 2.5 kilograms of Flour to "Bread".`
fn added_message(line: &RecipeLine, recipe_title: &str) -> String {
    match line.ingredient_unit {
        Some(unit) => format!(
            "Added {} {} of {} to \"{}\".",
            line.quantity,
            unit.label(),
            line.ingredient_name,
            recipe_title
        ),
        None => format!(
            "Added {} of {} to \"{}\".",
            line.quantity, line.ingredient_name, recipe_title
        ),
    }
}
