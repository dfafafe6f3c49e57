use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use shared::UnitOfMeasure;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::backend::domain::models::ingredient::{Ingredient, NewIngredient};

const SELECT_INGREDIENT: &str = "SELECT id, name, unit, created_at, updated_at FROM ingredients";

/// Repository for ingredient rows
#[derive(Clone, Default)]
pub struct IngredientRepository;

impl IngredientRepository {
    pub fn new() -> Self {
        Self
    }

    /// Insert a new ingredient and return the stored row
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        ingredient: &NewIngredient,
        now: DateTime<Utc>,
    ) -> Result<Ingredient> {
        let result = sqlx::query(
            r#"
            INSERT INTO ingredients (name, name_key, unit, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ingredient.name)
        .bind(name_key(&ingredient.name))
        .bind(ingredient.unit.map(|u| u.code()))
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(Ingredient {
            id: result.last_insert_rowid(),
            name: ingredient.name.clone(),
            unit: ingredient.unit,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get(&self, conn: &mut SqliteConnection, id: i64) -> Result<Option<Ingredient>> {
        let row = sqlx::query(&format!("{SELECT_INGREDIENT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    /// Case-insensitive exact name lookup, Unicode aware
    pub async fn find_by_name_ignore_case(
        &self,
        conn: &mut SqliteConnection,
        name: &str,
    ) -> Result<Option<Ingredient>> {
        let row = sqlx::query(&format!(
            "{SELECT_INGREDIENT} WHERE name_key = ? ORDER BY id LIMIT 1"
        ))
        .bind(name_key(name))
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    /// All ingredients ordered by name
    pub async fn list(&self, conn: &mut SqliteConnection) -> Result<Vec<Ingredient>> {
        let rows = sqlx::query(&format!("{SELECT_INGREDIENT} ORDER BY name"))
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(Self::from_row).collect()
    }

    pub async fn set_unit(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        unit: UnitOfMeasure,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE ingredients SET unit = ?, updated_at = ? WHERE id = ?")
            .bind(unit.code())
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Number of recipe lines pointing at the ingredient
    pub async fn count_references(&self, conn: &mut SqliteConnection, id: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM recipe_ingredients WHERE ingredient_id = ?")
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;
        Ok(count)
    }

    /// Returns true if a row was deleted
    pub async fn delete(&self, conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn from_row(row: &SqliteRow) -> Result<Ingredient> {
        let unit = row
            .try_get::<Option<String>, _>("unit")?
            .map(|code| code.parse::<UnitOfMeasure>())
            .transpose()
            .map_err(|e| anyhow!("Corrupt ingredient row: {}", e))?;

        Ok(Ingredient {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            unit,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Matching key stored next to the name
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
