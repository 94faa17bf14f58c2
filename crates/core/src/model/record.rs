use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::answers::AnswerSet;
use crate::time::{iso_timestamp, parse_iso_timestamp};

/// Local-storage key holding the autosaved answers.
pub const RECORD_KEY: &str = "surveyData";
/// Session-storage key holding the ISO start time.
pub const START_TIME_KEY: &str = "survey_start_time";
/// Session-storage key holding the start time in epoch milliseconds.
pub const START_TIMESTAMP_KEY: &str = "survey_start_timestamp";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    #[error("malformed session record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Snapshot of the answers written to local storage after every change.
///
/// Serialized as one flat JSON object: `{ ...answers, "last_updated": "..." }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSessionRecord {
    #[serde(flatten)]
    pub answers: AnswerSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl PersistedSessionRecord {
    #[must_use]
    pub fn new(answers: AnswerSet, last_updated: Option<DateTime<Utc>>) -> Self {
        Self {
            answers,
            last_updated,
        }
    }

    /// # Errors
    ///
    /// Returns `RecordError::Malformed` if serialization fails.
    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    ///
    /// Returns `RecordError::Malformed` for anything other than a flat JSON
    /// object of string values.
    pub fn from_json(raw: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// When the respondent started, recorded once per browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    started_at: DateTime<Utc>,
    started_at_millis: i64,
}

impl SessionTiming {
    #[must_use]
    pub fn starting_at(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            started_at_millis: started_at.timestamp_millis(),
        }
    }

    /// Rebuild timing from the two session-storage entries.
    ///
    /// Returns `None` when the ISO start time is missing or unparsable; a bad
    /// millisecond counter falls back to the ISO value.
    #[must_use]
    pub fn from_stored(start_time: Option<&str>, start_millis: Option<&str>) -> Option<Self> {
        let started_at = parse_iso_timestamp(start_time?)?;
        let started_at_millis = start_millis
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or_else(|| started_at.timestamp_millis());
        Some(Self {
            started_at,
            started_at_millis,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn started_at_millis(&self) -> i64 {
        self.started_at_millis
    }

    #[must_use]
    pub fn start_time_entry(&self) -> String {
        iso_timestamp(self.started_at)
    }

    #[must_use]
    pub fn start_timestamp_entry(&self) -> String {
        self.started_at_millis.to_string()
    }

    /// Milliseconds between the session start and `now`, never negative.
    #[must_use]
    pub fn duration_millis(&self, now: DateTime<Utc>) -> i64 {
        (now.timestamp_millis() - self.started_at_millis).max(0)
    }
}
