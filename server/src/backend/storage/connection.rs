use anyhow::Result;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection, creating the database file if needed
    pub async fn new(url: &str) -> Result<Self> {
        Self::with_max_connections(url, DEFAULT_MAX_CONNECTIONS).await
    }

    pub async fn with_max_connections(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;
        info!("Database ready at {}", url);

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a private in-memory database with a unique name
    ///
    /// The pool holds a single connection so the shared-cache database never
    /// sees two writers at once.
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().simple().to_string();
        let db_url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::with_max_connections(&db_url, 1).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check out a single connection for a group of reads
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// Start a transaction; it rolls back when dropped without `commit`
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                name_key TEXT NOT NULL,
                unit TEXT CHECK (unit IS NULL OR unit IN ('g', 'kg', 'ml', 'l', 'pcs')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Lowercased name for case-insensitive matching beyond ASCII
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_ingredients_name_key
            ON ingredients(name_key);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                servings INTEGER NOT NULL DEFAULT 1 CHECK (servings >= 1),
                prep_minutes INTEGER NOT NULL DEFAULT 0 CHECK (prep_minutes >= 0),
                cook_minutes INTEGER NOT NULL DEFAULT 0 CHECK (cook_minutes >= 0),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Line items go with their recipe; a referenced ingredient cannot be removed
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                recipe_id INTEGER NOT NULL,
                ingredient_id INTEGER NOT NULL,
                quantity REAL NOT NULL CHECK (quantity >= 0.01),
                unit_label TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (recipe_id, ingredient_id),
                FOREIGN KEY (recipe_id) REFERENCES recipes (id) ON DELETE CASCADE,
                FOREIGN KEY (ingredient_id) REFERENCES ingredients (id) ON DELETE RESTRICT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_ingredient
            ON recipe_ingredients(ingredient_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meal_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (name, start_date)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // One entry per (plan, date, meal type) slot; a deleted recipe leaves the slot as TBD
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meal_plan_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                meal_plan_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                meal_type TEXT NOT NULL CHECK (meal_type IN ('breakfast', 'lunch', 'dinner', 'snack')),
                recipe_id INTEGER,
                notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (meal_plan_id, date, meal_type),
                FOREIGN KEY (meal_plan_id) REFERENCES meal_plans (id) ON DELETE CASCADE,
                FOREIGN KEY (recipe_id) REFERENCES recipes (id) ON DELETE SET NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_meal_plan_entries_plan_date
            ON meal_plan_entries(meal_plan_id, date);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_meal_plan_entries_recipe
            ON meal_plan_entries(recipe_id);
            "#,
        )
        .execute(pool)
        .await?;

        // Idempotency tokens of already applied submissions
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS processed_actions (
                action_key TEXT PRIMARY KEY,
                action TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

/// True when the error came from a UNIQUE constraint in the store
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Extended result code SQLite reports when a DELETE hits a RESTRICT foreign key
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

/// True when the error came from a FOREIGN KEY constraint in the store
///
/// Inserts fail with `SQLITE_CONSTRAINT_FOREIGNKEY`, which sqlx classifies;
/// deleting a referenced parent fails with `SQLITE_CONSTRAINT_TRIGGER`, which
/// it does not.
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => {
            db_err.is_foreign_key_violation()
                || (db_err.code().as_deref() == Some(SQLITE_CONSTRAINT_TRIGGER)
                    && db_err.message().contains("FOREIGN KEY"))
        }
        _ => false,
    }
}
