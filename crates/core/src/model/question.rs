use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which Likert scale a scored question is answered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Satisfaction,
    Expectation,
}

impl QuestionCategory {
    /// Short Japanese name used inside generated prompts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuestionCategory::Satisfaction => "満足度",
            QuestionCategory::Expectation => "期待度",
        }
    }
}

/// A question whose answer is converted to a 1-5 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredQuestion {
    key: &'static str,
    category: QuestionCategory,
    display: &'static str,
}

impl ScoredQuestion {
    #[must_use]
    pub const fn new(key: &'static str, category: QuestionCategory, display: &'static str) -> Self {
        Self {
            key,
            category,
            display,
        }
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    #[must_use]
    pub fn category(&self) -> QuestionCategory {
        self.category
    }

    #[must_use]
    pub fn display(&self) -> &'static str {
        self.display
    }
}

/// Ordered lookup of every scored question.
///
/// Iteration order is the registration order, which is also the order used to
/// break ties when picking the highest or lowest rated item.
#[derive(Debug, Clone, Default)]
pub struct QuestionRegistry {
    questions: Vec<ScoredQuestion>,
    by_key: HashMap<&'static str, usize>,
}

impl QuestionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a question. A key registered twice keeps its first position.
    pub fn register(&mut self, question: ScoredQuestion) {
        if self.by_key.contains_key(question.key()) {
            return;
        }
        self.by_key.insert(question.key(), self.questions.len());
        self.questions.push(question);
    }

    #[must_use]
    pub fn with(mut self, question: ScoredQuestion) -> Self {
        self.register(question);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ScoredQuestion> {
        self.by_key.get(key).map(|idx| &self.questions[*idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredQuestion> {
        self.questions.iter()
    }

    pub fn in_category(&self, category: QuestionCategory) -> impl Iterator<Item = &ScoredQuestion> {
        self.questions
            .iter()
            .filter(move |question| question.category() == category)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keeps_first_registration() {
        let registry = QuestionRegistry::new()
            .with(ScoredQuestion::new(
                "a_satisfaction",
                QuestionCategory::Satisfaction,
                "A",
            ))
            .with(ScoredQuestion::new(
                "a_satisfaction",
                QuestionCategory::Satisfaction,
                "duplicate",
            ))
            .with(ScoredQuestion::new(
                "a_expectation",
                QuestionCategory::Expectation,
                "A",
            ));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a_satisfaction").unwrap().display(), "A");
        assert_eq!(
            registry.in_category(QuestionCategory::Expectation).count(),
            1
        );
        assert!(registry.get("a").is_none());
    }
}
