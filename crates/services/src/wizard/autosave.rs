use std::sync::atomic::{AtomicU64, Ordering};

use storage::repository::{Storage, StorageError};
use survey_core::model::PersistedSessionRecord;
use tokio::sync::Mutex;
use tracing::debug;

/// A snapshot waiting to be written, tagged with the order it was taken in.
///
/// Take it synchronously when the answers change; write it whenever.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PendingSave {
    seq: u64,
    record: PersistedSessionRecord,
}

impl PendingSave {
    pub fn record(&self) -> &PersistedSessionRecord {
        &self.record
    }
}

/// Serializes record writes so the newest snapshot is the one that sticks.
///
/// Writes run one at a time. A snapshot older than the last one written, or
/// taken before the record was cleared, is dropped.
pub(crate) struct AutosaveWriter {
    storage: Storage,
    issued: AtomicU64,
    written: Mutex<u64>,
}

impl AutosaveWriter {
    pub(crate) fn new(storage: Storage) -> Self {
        Self {
            storage,
            issued: AtomicU64::new(0),
            written: Mutex::new(0),
        }
    }

    pub(crate) fn stage(&self, record: PersistedSessionRecord) -> PendingSave {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        PendingSave { seq, record }
    }

    /// Returns `Ok(false)` when a newer snapshot already won.
    pub(crate) async fn write(&self, pending: &PendingSave) -> Result<bool, StorageError> {
        let mut written = self.written.lock().await;
        if pending.seq <= *written {
            debug!(seq = pending.seq, latest = *written, "dropping stale autosave");
            return Ok(false);
        }
        // A failed write still supersedes older snapshots.
        *written = pending.seq;
        self.storage.save_record(&pending.record).await?;
        Ok(true)
    }

    /// Remove the record and discard every snapshot staged so far.
    pub(crate) async fn clear(&self) -> Result<(), StorageError> {
        let mut written = self.written.lock().await;
        *written = self.issued.load(Ordering::SeqCst);
        self.storage.clear_record().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::model::AnswerSet;

    fn record(position: &str) -> PersistedSessionRecord {
        let mut answers = AnswerSet::new();
        answers.set("position", position);
        PersistedSessionRecord::new(answers, None)
    }

    #[tokio::test]
    async fn staged_before_clear_never_lands() {
        let storage = Storage::in_memory();
        let writer = AutosaveWriter::new(storage.clone());
        let first = writer.stage(record("ジュニア"));
        assert!(writer.write(&first).await.unwrap());

        let leftover = writer.stage(record("シニア"));
        writer.clear().await.unwrap();
        assert!(!writer.write(&leftover).await.unwrap());
        assert!(storage.load_record().await.unwrap().is_none());

        let fresh = writer.stage(record("ミッド"));
        assert!(writer.write(&fresh).await.unwrap());
        assert_eq!(fresh.record().answers.get("position"), Some("ミッド"));
        assert!(storage.load_record().await.unwrap().is_some());
    }
}
