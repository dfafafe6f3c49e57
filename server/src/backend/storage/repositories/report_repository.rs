use anyhow::Result;
use sqlx::{Row, SqliteConnection};

use crate::backend::domain::models::meal_plan::MealPlan;

/// Number of plan entries referencing a recipe
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeUsageRow {
    pub recipe_id: i64,
    pub title: String,
    pub uses: i64,
}

/// Number of distinct ingredients in a recipe
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientCountRow {
    pub recipe_id: i64,
    pub title: String,
    pub ingredients: i64,
}

/// A plan with the number of distinct in-range days holding an entry
#[derive(Debug, Clone, PartialEq)]
pub struct PlanCoveredDays {
    pub plan: MealPlan,
    pub covered_days: i64,
}

/// Read-only aggregate queries behind the reports
#[derive(Clone, Default)]
pub struct ReportRepository;

impl ReportRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn count_recipes(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    /// Recipes referenced by at least one entry, most used first
    pub async fn top_used_recipes(&self, conn: &mut SqliteConnection) -> Result<Vec<RecipeUsageRow>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.title, COUNT(e.id) AS uses
            FROM meal_plan_entries e
            JOIN recipes r ON r.id = e.recipe_id
            GROUP BY r.id, r.title
            ORDER BY uses DESC, r.title
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        rows.iter()
            .map(|row| -> Result<RecipeUsageRow> {
                Ok(RecipeUsageRow {
                    recipe_id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    uses: row.try_get("uses")?,
                })
            })
            .collect()
    }

    /// Recipes with at least one line item, by distinct ingredient count
    pub async fn recipes_by_ingredient_count(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<IngredientCountRow>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.title, COUNT(DISTINCT ri.ingredient_id) AS ingredients
            FROM recipe_ingredients ri
            JOIN recipes r ON r.id = ri.recipe_id
            GROUP BY r.id, r.title
            ORDER BY ingredients DESC, r.title
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        rows.iter()
            .map(|row| -> Result<IngredientCountRow> {
                Ok(IngredientCountRow {
                    recipe_id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    ingredients: row.try_get("ingredients")?,
                })
            })
            .collect()
    }

    /// Number of recipes whose prep plus cook time lies in `[min, max]`
    pub async fn count_by_total_time(
        &self,
        conn: &mut SqliteConnection,
        min_minutes: i64,
        max_minutes: i64,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM recipes WHERE prep_minutes + cook_minutes BETWEEN ? AND ?",
        )
        .bind(min_minutes)
        .bind(max_minutes)
        .fetch_one(&mut *conn)
        .await?;
        Ok(count)
    }

    /// Titles of recipes whose total time lies in `[min, max]`, in title order
    pub async fn titles_by_total_time(
        &self,
        conn: &mut SqliteConnection,
        min_minutes: i64,
        max_minutes: i64,
        limit: i64,
    ) -> Result<Vec<String>> {
        let titles: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT title FROM recipes
            WHERE prep_minutes + cook_minutes BETWEEN ? AND ?
            ORDER BY title
            LIMIT ?
            "#,
        )
        .bind(min_minutes)
        .bind(max_minutes)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;
        Ok(titles)
    }

    /// Covered days of every plan, latest start date first
    pub async fn plan_covered_days(&self, conn: &mut SqliteConnection) -> Result<Vec<PlanCoveredDays>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.name, p.start_date, p.end_date, p.created_at, p.updated_at,
                   COUNT(DISTINCT e.date) AS covered_days
            FROM meal_plans p
            LEFT JOIN meal_plan_entries e
                ON e.meal_plan_id = p.id
               AND e.date >= p.start_date
               AND e.date <= p.end_date
            GROUP BY p.id
            ORDER BY p.start_date DESC, p.name
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        rows.iter()
            .map(|row| -> Result<PlanCoveredDays> {
                Ok(PlanCoveredDays {
                    plan: MealPlan {
                        id: row.try_get("id")?,
                        name: row.try_get("name")?,
                        start_date: row.try_get("start_date")?,
                        end_date: row.try_get("end_date")?,
                        created_at: row.try_get("created_at")?,
                        updated_at: row.try_get("updated_at")?,
                    },
                    covered_days: row.try_get("covered_days")?,
                })
            })
            .collect()
    }
}
