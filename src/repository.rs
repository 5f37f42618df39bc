use crate::models::{MenuItem, MenuItemPayload};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

/// Rows inserted by `seed_defaults` when the table is empty.
const SEED_ITEMS: [(&str, &str, f64); 3] = [
    ("Ribeye steak", "Juicy rib cut, 100 g.", 500.0),
    ("Pilaf", "Uzbek style with lamb", 800.0),
    ("Caesar salad", "With chicken and parmesan", 600.0),
];

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("menu item {0} not found")]
    NotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// MenuRepository
///
/// The persistence contract the handlers depend on. Handlers only ever see
/// `Arc<dyn MenuRepository>`, so tests can swap in a mock without a database.
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// All items in insertion order.
    async fn list_items(&self) -> Result<Vec<MenuItem>, RepositoryError>;
    /// Inserts a new row; the store picks the identifier.
    async fn create_item(&self, payload: MenuItemPayload) -> Result<MenuItem, RepositoryError>;
    /// Overwrites every field of row `id`.
    async fn update_item(
        &self,
        id: i64,
        payload: MenuItemPayload,
    ) -> Result<MenuItem, RepositoryError>;
    async fn delete_item(&self, id: i64) -> Result<(), RepositoryError>;
    async fn count_items(&self) -> Result<i64, RepositoryError>;
}

/// RepositoryState
///
/// The shared handle stored in `AppState`.
pub type RepositoryState = Arc<dyn MenuRepository>;

/// SqliteRepository
///
/// `MenuRepository` backed by a SQLite pool. Each call checks a connection out of the
/// pool for the duration of one statement; it goes back on drop, error paths included.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the `menu_items` table if it does not exist yet. Safe to run on every start.
    pub async fn init_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS menu_items (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                description TEXT NOT NULL,
                price       REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS ix_menu_items_name ON menu_items (name)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts the demo rows when the table is empty. Returns how many rows were added.
    pub async fn seed_defaults(&self) -> Result<usize, RepositoryError> {
        if self.count_items().await? > 0 {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for (name, description, price) in SEED_ITEMS {
            sqlx::query("INSERT INTO menu_items (name, description, price) VALUES (?, ?, ?)")
                .bind(name)
                .bind(description)
                .bind(price)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(rows = SEED_ITEMS.len(), "seeded empty menu");
        Ok(SEED_ITEMS.len())
    }
}

fn log_db_error(op: &str, err: sqlx::Error) -> RepositoryError {
    tracing::error!("{} error: {:?}", op, err);
    RepositoryError::Database(err)
}

#[async_trait]
impl MenuRepository for SqliteRepository {
    async fn list_items(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        sqlx::query_as::<_, MenuItem>(
            "SELECT id, name, description, price FROM menu_items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| log_db_error("list_items", e))
    }

    async fn create_item(&self, payload: MenuItemPayload) -> Result<MenuItem, RepositoryError> {
        sqlx::query_as::<_, MenuItem>(
            r#"
            INSERT INTO menu_items (name, description, price)
            VALUES (?, ?, ?)
            RETURNING id, name, description, price
            "#,
        )
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| log_db_error("create_item", e))
    }

    /// A single `UPDATE ... RETURNING`: no row back means no row with that id.
    async fn update_item(
        &self,
        id: i64,
        payload: MenuItemPayload,
    ) -> Result<MenuItem, RepositoryError> {
        sqlx::query_as::<_, MenuItem>(
            r#"
            UPDATE menu_items
            SET name = ?, description = ?, price = ?
            WHERE id = ?
            RETURNING id, name, description, price
            "#,
        )
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.price)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| log_db_error("update_item", e))?
        .ok_or(RepositoryError::NotFound(id))
    }

    async fn delete_item(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| log_db_error("delete_item", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn count_items(&self) -> Result<i64, RepositoryError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| log_db_error("count_items", e))
    }
}
