use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use shared::UnitOfMeasure;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::backend::domain::models::recipe::{RecipeIngredient, RecipeLine};

const SELECT_LINE: &str = r#"
    SELECT ri.id, ri.recipe_id, ri.ingredient_id, i.name AS ingredient_name,
           i.unit AS ingredient_unit, ri.quantity, ri.unit_label
    FROM recipe_ingredients ri
    JOIN ingredients i ON i.id = ri.ingredient_id
"#;

/// Repository for the recipe/ingredient join table
#[derive(Clone, Default)]
pub struct RecipeIngredientRepository;

impl RecipeIngredientRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        recipe_id: i64,
        ingredient_id: i64,
        quantity: f64,
        unit_label: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<RecipeIngredient> {
        let result = sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, unit_label, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .bind(quantity)
        .bind(unit_label)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(RecipeIngredient {
            id: result.last_insert_rowid(),
            recipe_id,
            ingredient_id,
            quantity,
            unit_label: unit_label.map(str::to_string),
            created_at: now,
            updated_at: now,
        })
    }

    /// The link for a (recipe, ingredient) pair, if any
    pub async fn find(
        &self,
        conn: &mut SqliteConnection,
        recipe_id: i64,
        ingredient_id: i64,
    ) -> Result<Option<RecipeIngredient>> {
        let row = sqlx::query(
            r#"
            SELECT id, recipe_id, ingredient_id, quantity, unit_label, created_at, updated_at
            FROM recipe_ingredients
            WHERE recipe_id = ? AND ingredient_id = ?
            "#,
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(|row| -> Result<RecipeIngredient> {
            Ok(RecipeIngredient {
                id: row.try_get("id")?,
                recipe_id: row.try_get("recipe_id")?,
                ingredient_id: row.try_get("ingredient_id")?,
                quantity: row.try_get("quantity")?,
                unit_label: row.try_get("unit_label")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            })
        })
        .transpose()
    }

    /// Overwrite quantity and unit label of an existing link
    pub async fn update_quantity(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        quantity: f64,
        unit_label: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE recipe_ingredients SET quantity = ?, unit_label = ?, updated_at = ? WHERE id = ?",
        )
        .bind(quantity)
        .bind(unit_label)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Lines of a recipe in insertion order
    pub async fn list_lines(
        &self,
        conn: &mut SqliteConnection,
        recipe_id: i64,
    ) -> Result<Vec<RecipeLine>> {
        let rows = sqlx::query(&format!("{SELECT_LINE} WHERE ri.recipe_id = ? ORDER BY ri.id"))
            .bind(recipe_id)
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(Self::line_from_row).collect()
    }

    pub async fn get_line(&self, conn: &mut SqliteConnection, id: i64) -> Result<Option<RecipeLine>> {
        let row = sqlx::query(&format!("{SELECT_LINE} WHERE ri.id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(Self::line_from_row).transpose()
    }

    fn line_from_row(row: &SqliteRow) -> Result<RecipeLine> {
        let ingredient_unit = row
            .try_get::<Option<String>, _>("ingredient_unit")?
            .map(|code| code.parse::<UnitOfMeasure>())
            .transpose()
            .map_err(|e| anyhow!("Corrupt ingredient row: {}", e))?;

        Ok(RecipeLine {
            id: row.try_get("id")?,
            recipe_id: row.try_get("recipe_id")?,
            ingredient_id: row.try_get("ingredient_id")?,
            ingredient_name: row.try_get("ingredient_name")?,
            ingredient_unit,
            quantity: row.try_get("quantity")?,
            unit_label: row.try_get("unit_label")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::ingredient::NewIngredient;
    use crate::backend::domain::models::recipe::NewRecipe;
    use crate::backend::storage::connection::{is_unique_violation, DbConnection};
    use crate::backend::storage::repositories::{IngredientRepository, RecipeRepository};

    async fn seed(conn: &mut SqliteConnection) -> (i64, i64, i64) {
        let now = Utc::now();
        let recipe = RecipeRepository::new()
            .insert(
                conn,
                &NewRecipe {
                    title: "Omelette".to_string(),
                    description: String::new(),
                    servings: 1,
                    prep_minutes: 5,
                    cook_minutes: 5,
                },
                now,
            )
            .await
            .unwrap();
        let ingredients = IngredientRepository::new();
        let eggs = ingredients
            .insert(
                conn,
                &NewIngredient {
                    name: "Eggs".to_string(),
                    unit: Some(UnitOfMeasure::Pieces),
                },
                now,
            )
            .await
            .unwrap();
        let butter = ingredients
            .insert(
                conn,
                &NewIngredient {
                    name: "Butter".to_string(),
                    unit: Some(UnitOfMeasure::Grams),
                },
                now,
            )
            .await
            .unwrap();
        (recipe.id, eggs.id, butter.id)
    }

    #[tokio::test]
    async fn test_lines_keep_insertion_order() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let repo = RecipeIngredientRepository::new();
        let (recipe_id, eggs, butter) = seed(&mut conn).await;

        repo.insert(&mut conn, recipe_id, eggs, 3.0, None, Utc::now())
            .await
            .unwrap();
        repo.insert(&mut conn, recipe_id, butter, 10.0, Some("g"), Utc::now())
            .await
            .unwrap();

        let lines = repo.list_lines(&mut conn, recipe_id).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].ingredient_name, "Eggs");
        assert_eq!(lines[0].ingredient_unit, Some(UnitOfMeasure::Pieces));
        assert_eq!(lines[1].ingredient_name, "Butter");
        assert_eq!(lines[1].unit_label.as_deref(), Some("g"));
    }

    #[tokio::test]
    async fn test_duplicate_pair_is_rejected() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let repo = RecipeIngredientRepository::new();
        let (recipe_id, eggs, _) = seed(&mut conn).await;

        repo.insert(&mut conn, recipe_id, eggs, 2.0, None, Utc::now())
            .await
            .unwrap();
        let err = repo
            .insert(&mut conn, recipe_id, eggs, 4.0, None, Utc::now())
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_update_quantity() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let repo = RecipeIngredientRepository::new();
        let (recipe_id, eggs, _) = seed(&mut conn).await;

        let link = repo
            .insert(&mut conn, recipe_id, eggs, 2.0, None, Utc::now())
            .await
            .unwrap();
        repo.update_quantity(&mut conn, link.id, 4.5, Some("large"), Utc::now())
            .await
            .unwrap();

        let found = repo.find(&mut conn, recipe_id, eggs).await.unwrap().unwrap();
        assert_eq!(found.quantity, 4.5);
        assert_eq!(found.unit_label.as_deref(), Some("large"));
    }
}
