//! Live character counter shown under free-text fields.

use crate::model::FieldKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterStatus {
    /// Below the minimum length.
    Error,
    /// Between the minimum and 80% of the maximum.
    Valid,
    /// Above 80% of the maximum.
    Warning,
    /// No minimum and well below the maximum.
    Neutral,
}

impl CounterStatus {
    /// CSS modifier class, empty for `Neutral`.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            CounterStatus::Error => "error",
            CounterStatus::Valid => "valid",
            CounterStatus::Warning => "warning",
            CounterStatus::Neutral => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCounter {
    pub current: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub status: CounterStatus,
}

impl CharCounter {
    /// Count the raw characters of `value` against the field limits.
    #[must_use]
    pub fn measure(value: &str, min_length: usize, max_length: usize) -> Self {
        // Unicode scalar values, not UTF-16 units: a character outside the BMP
        // (emoji, rare kanji) counts once. Must agree with `validation`.
        let current = value.chars().count();
        // 80% of max, compared without floating point.
        let over_warning = current * 5 > max_length * 4;
        let status = if min_length > 0 && current < min_length {
            CounterStatus::Error
        } else if over_warning {
            CounterStatus::Warning
        } else if min_length > 0 {
            CounterStatus::Valid
        } else {
            CounterStatus::Neutral
        };

        Self {
            current,
            min_length,
            max_length,
            status,
        }
    }

    /// Counter for a free-text field, `None` for choice fields.
    #[must_use]
    pub fn for_field(kind: &FieldKind, value: &str) -> Option<Self> {
        match kind {
            FieldKind::FreeText {
                min_length,
                max_length,
            } => Some(Self::measure(value, min_length.unwrap_or(0), *max_length)),
            _ => None,
        }
    }
}
