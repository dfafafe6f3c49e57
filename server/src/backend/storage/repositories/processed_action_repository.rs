use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

/// Remembers idempotency keys of submissions that were already applied
#[derive(Clone, Default)]
pub struct ProcessedActionRepository;

impl ProcessedActionRepository {
    pub fn new() -> Self {
        Self
    }

    /// Record a key; returns false when the key had been recorded before
    pub async fn record(
        &self,
        conn: &mut SqliteConnection,
        key: &str,
        action: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO processed_actions (action_key, action, created_at) VALUES (?, ?, ?)",
        )
        .bind(key)
        .bind(action)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
