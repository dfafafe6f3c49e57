use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::backend::domain::models::meal_plan::MealPlan;

const SELECT_PLAN: &str =
    "SELECT id, name, start_date, end_date, created_at, updated_at FROM meal_plans";

/// Repository for meal plan rows
#[derive(Clone, Default)]
pub struct MealPlanRepository;

impl MealPlanRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<MealPlan> {
        let result = sqlx::query(
            r#"
            INSERT INTO meal_plans (name, start_date, end_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(start_date)
        .bind(end_date)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(MealPlan {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get(&self, conn: &mut SqliteConnection, id: i64) -> Result<Option<MealPlan>> {
        let row = sqlx::query(&format!("{SELECT_PLAN} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    /// One page of plans, most recently created first
    pub async fn list_page(
        &self,
        conn: &mut SqliteConnection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MealPlan>> {
        let rows = sqlx::query(&format!(
            "{SELECT_PLAN} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    /// Every plan, latest start date first
    pub async fn list_all(&self, conn: &mut SqliteConnection) -> Result<Vec<MealPlan>> {
        let rows = sqlx::query(&format!("{SELECT_PLAN} ORDER BY start_date DESC, name"))
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(Self::from_row).collect()
    }

    pub async fn count(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meal_plans")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    /// Returns true if a row was deleted
    pub async fn delete(&self, conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM meal_plans WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn from_row(row: &SqliteRow) -> Result<MealPlan> {
        Ok(MealPlan {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::connection::{is_unique_violation, DbConnection};
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_name_and_start_must_be_unique() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let repo = MealPlanRepository::new();

        repo.insert(&mut conn, "Week 1", date(2025, 3, 3), date(2025, 3, 9), Utc::now())
            .await
            .unwrap();
        // Same name on another start date is fine
        repo.insert(&mut conn, "Week 1", date(2025, 3, 10), date(2025, 3, 16), Utc::now())
            .await
            .unwrap();

        let err = repo
            .insert(&mut conn, "Week 1", date(2025, 3, 3), date(2025, 3, 5), Utc::now())
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_list_page_newest_first() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let repo = MealPlanRepository::new();
        let base = Utc::now();

        for i in 0..3 {
            repo.insert(
                &mut conn,
                &format!("Plan {}", i),
                date(2025, 3, 3),
                date(2025, 3, 9),
                base + Duration::seconds(i),
            )
            .await
            .unwrap();
        }

        let first_page = repo.list_page(&mut conn, 2, 0).await.unwrap();
        let names: Vec<_> = first_page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Plan 2", "Plan 1"]);

        let second_page = repo.list_page(&mut conn, 2, 2).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].name, "Plan 0");
        assert_eq!(repo.count(&mut conn).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_dates_round_trip() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let mut conn = db.acquire().await.unwrap();
        let repo = MealPlanRepository::new();

        let stored = repo
            .insert(&mut conn, "Leap", date(2024, 2, 28), date(2024, 3, 1), Utc::now())
            .await
            .unwrap();
        let loaded = repo.get(&mut conn, stored.id).await.unwrap().unwrap();

        assert_eq!(loaded.start_date, date(2024, 2, 28));
        assert_eq!(loaded.end_date, date(2024, 3, 1));
        assert!(repo.delete(&mut conn, stored.id).await.unwrap());
        assert!(!repo.delete(&mut conn, stored.id).await.unwrap());
    }
}
