use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::repository::{LocalStore, StorageError, StoreScope};

use super::SqliteInitError;

/// One scope of the `store_items` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    scope: StoreScope,
}

impl SqliteStore {
    pub(crate) fn new(pool: SqlitePool, scope: StoreScope) -> Self {
        Self { pool, scope }
    }

    #[must_use]
    pub fn scope(&self) -> StoreScope {
        self.scope
    }

    /// Delete every item of this scope during startup.
    pub(crate) async fn purge(&self) -> Result<(), SqliteInitError> {
        let result = sqlx::query("DELETE FROM store_items WHERE scope = ?1")
            .bind(self.scope.as_str())
            .execute(&self.pool)
            .await?;
        debug!(
            scope = self.scope.as_str(),
            removed = result.rows_affected(),
            "purged stale store items"
        );
        Ok(())
    }
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM store_items WHERE scope = ?1 AND key = ?2")
            .bind(self.scope.as_str())
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|row| {
            row.try_get::<String, _>("value")
                .map_err(|err| StorageError::Serialization(err.to_string()))
        })
        .transpose()
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO store_items (scope, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(scope, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(self.scope.as_str())
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM store_items WHERE scope = ?1 AND key = ?2")
            .bind(self.scope.as_str())
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM store_items WHERE scope = ?1")
            .bind(self.scope.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
