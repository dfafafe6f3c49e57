use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::backend::domain::models::recipe::{NewRecipe, Recipe};

const SELECT_RECIPE: &str = "SELECT id, title, description, servings, prep_minutes, cook_minutes, created_at, updated_at FROM recipes";

/// Repository for recipe rows
#[derive(Clone, Default)]
pub struct RecipeRepository;

impl RecipeRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        recipe: &NewRecipe,
        now: DateTime<Utc>,
    ) -> Result<Recipe> {
        let result = sqlx::query(
            r#"
            INSERT INTO recipes (title, description, servings, prep_minutes, cook_minutes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(recipe.servings)
        .bind(recipe.prep_minutes)
        .bind(recipe.cook_minutes)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(Recipe {
            id: result.last_insert_rowid(),
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            servings: recipe.servings,
            prep_minutes: recipe.prep_minutes,
            cook_minutes: recipe.cook_minutes,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get(&self, conn: &mut SqliteConnection, id: i64) -> Result<Option<Recipe>> {
        let row = sqlx::query(&format!("{SELECT_RECIPE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    /// Exact title lookup
    pub async fn find_by_title(
        &self,
        conn: &mut SqliteConnection,
        title: &str,
    ) -> Result<Option<Recipe>> {
        let row = sqlx::query(&format!("{SELECT_RECIPE} WHERE title = ?"))
            .bind(title)
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    /// All recipes ordered by title
    pub async fn list(&self, conn: &mut SqliteConnection) -> Result<Vec<Recipe>> {
        let rows = sqlx::query(&format!("{SELECT_RECIPE} ORDER BY title"))
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(Self::from_row).collect()
    }

    /// Case-insensitive substring match on title or description, ordered by title
    pub async fn search(&self, conn: &mut SqliteConnection, query: &str) -> Result<Vec<Recipe>> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let rows = sqlx::query(&format!(
            r#"{SELECT_RECIPE}
            WHERE lower(title) LIKE ? ESCAPE '\'
               OR lower(description) LIKE ? ESCAPE '\'
            ORDER BY title"#
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    pub async fn set_description(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE recipes SET description = ?, updated_at = ? WHERE id = ?")
            .bind(description)
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Returns true if a row was deleted
    pub async fn delete(&self, conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Recipes that have a line item for the ingredient, ordered by title
    pub async fn list_using_ingredient(
        &self,
        conn: &mut SqliteConnection,
        ingredient_id: i64,
    ) -> Result<Vec<Recipe>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.title, r.description, r.servings, r.prep_minutes, r.cook_minutes,
                   r.created_at, r.updated_at
            FROM recipes r
            JOIN recipe_ingredients ri ON ri.recipe_id = r.id
            WHERE ri.ingredient_id = ?
            ORDER BY r.title
            "#,
        )
        .bind(ingredient_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    pub async fn count(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    fn from_row(row: &SqliteRow) -> Result<Recipe> {
        Ok(Recipe {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            servings: row.try_get("servings")?,
            prep_minutes: row.try_get("prep_minutes")?,
            cook_minutes: row.try_get("cook_minutes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::connection::DbConnection;

    fn new_recipe(title: &str, description: &str) -> NewRecipe {
        NewRecipe {
            title: title.to_string(),
            description: description.to_string(),
            servings: 2,
            prep_minutes: 10,
            cook_minutes: 20,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_by_title() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let repo = RecipeRepository::new();

        let stored = repo
            .insert(&mut conn, &new_recipe("Pancakes", "Fluffy"), Utc::now())
            .await
            .unwrap();
        let found = repo.find_by_title(&mut conn, "Pancakes").await.unwrap().unwrap();

        assert_eq!(found.id, stored.id);
        assert_eq!(found.total_minutes(), 30);
        assert_eq!(repo.count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_matches_title_or_description() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let repo = RecipeRepository::new();

        repo.insert(&mut conn, &new_recipe("Tomato Soup", "Warm and red"), Utc::now())
            .await
            .unwrap();
        repo.insert(&mut conn, &new_recipe("Caprese Salad", "Fresh TOMATO slices"), Utc::now())
            .await
            .unwrap();
        repo.insert(&mut conn, &new_recipe("Plain Rice", "Boiled"), Utc::now())
            .await
            .unwrap();

        let titles: Vec<String> = repo
            .search(&mut conn, "tomato")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Caprese Salad", "Tomato Soup"]);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let repo = RecipeRepository::new();

        repo.insert(&mut conn, &new_recipe("Hundred Percent Juice", "100% orange"), Utc::now())
            .await
            .unwrap();
        repo.insert(&mut conn, &new_recipe("Bread Loaf", "1000 grams"), Utc::now())
            .await
            .unwrap();

        let found = repo.search(&mut conn, "100%").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Hundred Percent Juice");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
