use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{LocalStore, Storage, StoreScope};

mod migrate;
mod store;

pub use store::SqliteStore;

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or
    /// the connection pragmas fail.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }

    /// A store view over one scope of the shared table.
    #[must_use]
    pub fn store(&self, scope: StoreScope) -> SqliteStore {
        SqliteStore::new(self.pool.clone(), scope)
    }
}

impl Storage {
    /// Build a `Storage` backed by `SQLite`.
    ///
    /// Session-scoped items left over from a previous run are discarded, so
    /// every launch starts a fresh respondent session.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection, migrations or the session
    /// reset cannot be completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;

        let session = repo.store(StoreScope::Session);
        session.purge().await?;

        let local: Arc<dyn LocalStore> = Arc::new(repo.store(StoreScope::Local));
        let session: Arc<dyn LocalStore> = Arc::new(session);
        Ok(Self { local, session })
    }
}
