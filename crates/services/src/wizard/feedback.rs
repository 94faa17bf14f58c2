use chrono::{DateTime, Duration, Utc};

use survey_core::validation::ValidationError;

/// How long failing fields stay highlighted.
pub const HIGHLIGHT_DURATION_MS: i64 = 3_000;
/// How long the validation banner stays visible.
pub const BANNER_DURATION_MS: i64 = 5_000;

pub const VALIDATION_BANNER: &str = "必須項目が未入力です。すべての項目にご回答ください。";

/// Transient feedback after a failed page validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFeedback {
    flagged: Vec<String>,
    highlight_until: DateTime<Utc>,
    banner_until: DateTime<Utc>,
}

impl ValidationFeedback {
    #[must_use]
    pub fn raised(error: &ValidationError, now: DateTime<Utc>) -> Self {
        Self {
            flagged: error.failing_keys(),
            highlight_until: now + Duration::milliseconds(HIGHLIGHT_DURATION_MS),
            banner_until: now + Duration::milliseconds(BANNER_DURATION_MS),
        }
    }

    /// Keys still highlighted.
    #[must_use]
    pub fn flagged(&self) -> &[String] {
        &self.flagged
    }

    #[must_use]
    pub fn is_flagged(&self, key: &str) -> bool {
        self.flagged.iter().any(|flagged| flagged == key)
    }

    #[must_use]
    pub fn banner_until(&self) -> DateTime<Utc> {
        self.banner_until
    }

    #[must_use]
    pub fn highlight_until(&self) -> DateTime<Utc> {
        self.highlight_until
    }

    /// Drop whatever has timed out at `now`.
    ///
    /// Returns `false` once nothing is left to show.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if now >= self.highlight_until {
            self.flagged.clear();
        }
        now < self.banner_until
    }
}
