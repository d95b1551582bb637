pub mod drink;

pub use drink::{Drink, Ingredient};

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

/// Errors from the drink store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("drink not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid recipe payload: {0}")]
    InvalidRecipe(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Single-table store for drink records.
#[derive(Clone)]
pub struct DrinkStore {
    pool: SqlitePool,
}

impl DrinkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Idempotent first-run migration. Invoked explicitly at startup and by
    /// the test harness, never destructive.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS drinks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE,
                recipe TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        info!("drinks schema ready");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, title, recipe FROM drinks",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_drink).collect()
    }

    pub async fn list_ordered_by_id(&self) -> Result<Vec<Drink>, StoreError> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, title, recipe FROM drinks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_drink).collect()
    }

    /// Absence is not an error: returns `Ok(None)` for an unknown id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, title, recipe FROM drinks WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_drink).transpose()
    }

    /// Insert a new drink, assigning its id.
    pub async fn insert(&self, title: &str, recipe: &[Ingredient]) -> Result<Drink, StoreError> {
        let payload = serde_json::to_string(recipe)?;
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "INSERT INTO drinks (title, recipe) VALUES (?, ?) RETURNING id, title, recipe",
        )
        .bind(title)
        .bind(&payload)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_write_error)?;
        Self::row_to_drink(row)
    }

    /// Persist in-place changes to an existing record.
    pub async fn update(&self, drink: &Drink) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&drink.recipe)?;
        let result = sqlx::query("UPDATE drinks SET title = ?, recipe = ? WHERE id = ?")
            .bind(&drink.title)
            .bind(&payload)
            .bind(drink.id)
            .execute(&self.pool)
            .await
            .map_err(Self::map_write_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Remove a drink. Fails with `NotFound` if the row no longer exists.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn map_write_error(err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db) = &err {
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
                return StoreError::Conflict("drink title already exists".to_string());
            }
        }
        StoreError::Sqlx(err)
    }

    fn row_to_drink((id, title, recipe): (i64, String, String)) -> Result<Drink, StoreError> {
        Ok(Drink {
            id,
            title,
            recipe: serde_json::from_str(&recipe)?,
        })
    }
}
