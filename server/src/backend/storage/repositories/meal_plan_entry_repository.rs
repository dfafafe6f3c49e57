use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use shared::MealType;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::backend::domain::models::meal_plan::{MealPlanEntry, Slot};

const SELECT_ENTRY: &str = r#"
    SELECT e.id, e.meal_plan_id, e.date, e.meal_type, e.recipe_id, r.title AS recipe_title,
           e.notes, e.created_at, e.updated_at
    FROM meal_plan_entries e
    LEFT JOIN recipes r ON r.id = e.recipe_id
"#;

/// An entry together with the name of the plan it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct DatedEntry {
    pub plan_name: String,
    pub entry: MealPlanEntry,
}

/// Repository for meal plan entries
#[derive(Clone, Default)]
pub struct MealPlanEntryRepository;

impl MealPlanEntryRepository {
    pub fn new() -> Self {
        Self
    }

    /// Insert an entry into an empty slot and return its id
    ///
    /// Fails with a unique violation when the slot is already taken.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        slot: &Slot,
        recipe_id: Option<i64>,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO meal_plan_entries (meal_plan_id, date, meal_type, recipe_id, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(slot.meal_plan_id)
        .bind(slot.date)
        .bind(slot.meal_type.as_str())
        .bind(recipe_id)
        .bind(notes)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Overwrite recipe and notes of the entry occupying a slot
    ///
    /// Returns the id of the updated entry, or `None` when the slot is empty.
    pub async fn update_slot(
        &self,
        conn: &mut SqliteConnection,
        slot: &Slot,
        recipe_id: Option<i64>,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        let result = sqlx::query(
            r#"
            UPDATE meal_plan_entries
            SET recipe_id = ?, notes = ?, updated_at = ?
            WHERE meal_plan_id = ? AND date = ? AND meal_type = ?
            "#,
        )
        .bind(recipe_id)
        .bind(notes)
        .bind(now)
        .bind(slot.meal_plan_id)
        .bind(slot.date)
        .bind(slot.meal_type.as_str())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(self.find_by_slot(conn, slot).await?.map(|entry| entry.id))
    }

    pub async fn find_by_slot(
        &self,
        conn: &mut SqliteConnection,
        slot: &Slot,
    ) -> Result<Option<MealPlanEntry>> {
        let row = sqlx::query(&format!(
            "{SELECT_ENTRY} WHERE e.meal_plan_id = ? AND e.date = ? AND e.meal_type = ?"
        ))
        .bind(slot.meal_plan_id)
        .bind(slot.date)
        .bind(slot.meal_type.as_str())
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    pub async fn get(&self, conn: &mut SqliteConnection, id: i64) -> Result<Option<MealPlanEntry>> {
        let row = sqlx::query(&format!("{SELECT_ENTRY} WHERE e.id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    /// Entries of one plan ordered by date, then meal type
    pub async fn list_for_plan(
        &self,
        conn: &mut SqliteConnection,
        meal_plan_id: i64,
    ) -> Result<Vec<MealPlanEntry>> {
        let rows = sqlx::query(&format!(
            "{SELECT_ENTRY} WHERE e.meal_plan_id = ? ORDER BY e.date, {MEAL_TYPE_ORDER}"
        ))
        .bind(meal_plan_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    /// Entries of every plan dated within `[start, end]`, with their plan name
    pub async fn list_between(
        &self,
        conn: &mut SqliteConnection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DatedEntry>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT e.id, e.meal_plan_id, e.date, e.meal_type, e.recipe_id, r.title AS recipe_title,
                   e.notes, e.created_at, e.updated_at, p.name AS plan_name
            FROM meal_plan_entries e
            JOIN meal_plans p ON p.id = e.meal_plan_id
            LEFT JOIN recipes r ON r.id = e.recipe_id
            WHERE e.date >= ? AND e.date <= ?
            ORDER BY e.date, {MEAL_TYPE_ORDER}, p.name
            "#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter()
            .map(|row| -> Result<DatedEntry> {
                Ok(DatedEntry {
                    plan_name: row.try_get("plan_name")?,
                    entry: Self::from_row(row)?,
                })
            })
            .collect()
    }

    /// Returns true if the entry existed in the plan and was deleted
    pub async fn delete(
        &self,
        conn: &mut SqliteConnection,
        meal_plan_id: i64,
        id: i64,
    ) -> Result<bool> {
        let result = sqlx::query("DELETE FROM meal_plan_entries WHERE id = ? AND meal_plan_id = ?")
            .bind(id)
            .bind(meal_plan_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn from_row(row: &SqliteRow) -> Result<MealPlanEntry> {
        let meal_type: String = row.try_get("meal_type")?;
        let meal_type = meal_type
            .parse::<MealType>()
            .map_err(|e| anyhow!("Corrupt meal plan entry: {}", e))?;

        Ok(MealPlanEntry {
            id: row.try_get("id")?,
            meal_plan_id: row.try_get("meal_plan_id")?,
            date: row.try_get("date")?,
            meal_type,
            recipe_id: row.try_get("recipe_id")?,
            recipe_title: row.try_get("recipe_title")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

// Breakfast, lunch, dinner, snack rather than alphabetical
const MEAL_TYPE_ORDER: &str = "CASE e.meal_type WHEN 'breakfast' THEN 0 WHEN 'lunch' THEN 1 WHEN 'dinner' THEN 2 ELSE 3 END";
