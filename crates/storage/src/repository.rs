use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use survey_core::model::{
    PersistedSessionRecord, RECORD_KEY, START_TIME_KEY, START_TIMESTAMP_KEY, SessionTiming,
};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage quota of {limit} bytes exceeded")]
    QuotaExceeded { limit: usize },
}

/// Lifetime of a stored item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreScope {
    /// Survives restarts until explicitly removed.
    Local,
    /// Cleared whenever the application starts.
    Session,
}

impl StoreScope {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreScope::Local => "local",
            StoreScope::Session => "session",
        }
    }
}

/// String key-value store with browser-storage semantics.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::QuotaExceeded` when the store is full, or other
    /// storage errors.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// In-memory store for tests and storage-less runs.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    items: Arc<Mutex<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys and values exceed `limit` bytes.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            items: Arc::new(Mutex::new(HashMap::new())),
            quota_bytes: Some(limit),
        }
    }
}

#[async_trait]
impl LocalStore for InMemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if let Some(limit) = self.quota_bytes {
            let used: usize = guard
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > limit {
                return Err(StorageError::QuotaExceeded { limit });
            }
        }
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clear();
        Ok(())
    }
}

/// Local and session scoped stores behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub local: Arc<dyn LocalStore>,
    pub session: Arc<dyn LocalStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            local: Arc::new(InMemoryStore::new()),
            session: Arc::new(InMemoryStore::new()),
        }
    }

    #[must_use]
    pub fn from_stores(local: Arc<dyn LocalStore>, session: Arc<dyn LocalStore>) -> Self {
        Self { local, session }
    }

    /// Load the autosaved answers.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored blob is not a valid
    /// record, or other storage errors.
    pub async fn load_record(&self) -> Result<Option<PersistedSessionRecord>, StorageError> {
        let Some(raw) = self.local.get_item(RECORD_KEY).await? else {
            return Ok(None);
        };
        PersistedSessionRecord::from_json(&raw)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    /// Overwrite the autosaved answers wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be encoded or stored.
    pub async fn save_record(&self, record: &PersistedSessionRecord) -> Result<(), StorageError> {
        let raw = record
            .to_json()
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.local.set_item(RECORD_KEY, &raw).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be removed.
    pub async fn clear_record(&self) -> Result<(), StorageError> {
        self.local.remove_item(RECORD_KEY).await
    }

    /// Read the session start time, if one was recorded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session store cannot be read.
    pub async fn load_timing(&self) -> Result<Option<SessionTiming>, StorageError> {
        let start_time = self.session.get_item(START_TIME_KEY).await?;
        let start_millis = self.session.get_item(START_TIMESTAMP_KEY).await?;
        Ok(SessionTiming::from_stored(
            start_time.as_deref(),
            start_millis.as_deref(),
        ))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if either entry cannot be written.
    pub async fn save_timing(&self, timing: &SessionTiming) -> Result<(), StorageError> {
        self.session
            .set_item(START_TIME_KEY, &timing.start_time_entry())
            .await?;
        self.session
            .set_item(START_TIMESTAMP_KEY, &timing.start_timestamp_entry())
            .await
    }
}
