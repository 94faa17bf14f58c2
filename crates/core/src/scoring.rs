//! Likert label to score conversion.

use std::fmt;

use crate::model::QuestionCategory;

/// Shared midpoint label of both scales.
pub const NEUTRAL_LABEL: &str = "どちらとも言えない";

/// Satisfaction labels ordered from score 1 to score 5.
pub const SATISFACTION_LABELS: [&str; 5] = [
    "満足していない",
    "どちらかと言えば満足していない",
    NEUTRAL_LABEL,
    "どちらかと言えば満足している",
    "満足している",
];

/// Expectation labels ordered from score 1 to score 5.
pub const EXPECTATION_LABELS: [&str; 5] = [
    "今の会社には期待していない",
    "今の会社にはどちらかと言えば期待していない",
    NEUTRAL_LABEL,
    "今の会社にはどちらかと言えば期待している",
    "今の会社には期待している",
];

/// A 1-5 score, or 0 when the answer is missing or not a known label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(u8);

impl Score {
    pub const ABSENT: Score = Score(0);

    /// Score an answer on the scale of `category`.
    #[must_use]
    pub fn from_label(category: QuestionCategory, label: &str) -> Self {
        position_in(labels_for(category), label)
    }

    /// Score an answer against both scales, satisfaction first.
    #[must_use]
    pub fn from_any_label(label: &str) -> Self {
        let score = position_in(&SATISFACTION_LABELS, label);
        if score.is_present() {
            score
        } else {
            position_in(&EXPECTATION_LABELS, label)
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_present(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The five option labels of a category's scale, lowest first.
#[must_use]
pub fn labels_for(category: QuestionCategory) -> &'static [&'static str; 5] {
    match category {
        QuestionCategory::Satisfaction => &SATISFACTION_LABELS,
        QuestionCategory::Expectation => &EXPECTATION_LABELS,
    }
}

fn position_in(labels: &[&str; 5], label: &str) -> Score {
    if label.is_empty() {
        return Score::ABSENT;
    }
    labels
        .iter()
        .position(|candidate| *candidate == label)
        .and_then(|idx| u8::try_from(idx + 1).ok())
        .map_or(Score::ABSENT, Score)
}
