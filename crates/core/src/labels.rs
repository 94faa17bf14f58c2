//! Prompts on the final page that quote the respondent's own ratings.

use crate::model::{AnswerSet, QuestionCategory, QuestionRegistry, ScoredQuestion};
use crate::scoring::Score;

/// Final-page field that asks about the highest rated satisfaction item.
pub const MOST_SATISFIED_KEY: &str = "most_satisfied";
/// Final-page field that asks about the lowest rated satisfaction item.
pub const LEAST_SATISFIED_KEY: &str = "least_satisfied";
/// Final-page field that asks about the highest rated expectation item.
pub const MOST_EXPECTED_KEY: &str = "most_expected";

const HIGHEST_SATISFACTION_FALLBACK: &str = "最も満足度が高い項目について、具体的にお聞かせください";
const LOWEST_SATISFACTION_FALLBACK: &str = "最も満足度が低い項目について、具体的にお聞かせください";
const HIGHEST_EXPECTATION_FALLBACK: &str = "最も期待度が高い項目について、具体的にお聞かせください";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatedItem {
    pub key: &'static str,
    pub display: &'static str,
    pub score: Score,
}

impl RatedItem {
    fn new(question: &ScoredQuestion, score: Score) -> Self {
        Self {
            key: question.key(),
            display: question.display(),
            score,
        }
    }
}

/// Extremes among the answered, scoreable questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopRated {
    pub highest_satisfaction: Option<RatedItem>,
    pub lowest_satisfaction: Option<RatedItem>,
    pub highest_expectation: Option<RatedItem>,
}

/// Scan `answers` for registered questions and pick the extremes.
///
/// Unanswered or unscoreable answers are skipped. Ties resolve to the question
/// registered first.
#[must_use]
pub fn top_rated(registry: &QuestionRegistry, answers: &AnswerSet) -> TopRated {
    let scored = |category: QuestionCategory| {
        registry.in_category(category).filter_map(move |question| {
            let score = Score::from_label(category, answers.get(question.key())?);
            score
                .is_present()
                .then(|| RatedItem::new(question, score))
        })
    };

    let mut top = TopRated::default();
    for item in scored(QuestionCategory::Satisfaction) {
        if top
            .highest_satisfaction
            .is_none_or(|best| item.score > best.score)
        {
            top.highest_satisfaction = Some(item);
        }
        if top
            .lowest_satisfaction
            .is_none_or(|worst| item.score < worst.score)
        {
            top.lowest_satisfaction = Some(item);
        }
    }
    for item in scored(QuestionCategory::Expectation) {
        if top
            .highest_expectation
            .is_none_or(|best| item.score > best.score)
        {
            top.highest_expectation = Some(item);
        }
    }
    top
}

/// Rendered prompt text for the three rating follow-up questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicLabels {
    pub highest_satisfaction: String,
    pub lowest_satisfaction: String,
    pub highest_expectation: String,
}

impl Default for DynamicLabels {
    fn default() -> Self {
        Self::fallback()
    }
}

impl DynamicLabels {
    /// Generic prompts shown before any rating exists.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            highest_satisfaction: HIGHEST_SATISFACTION_FALLBACK.to_string(),
            lowest_satisfaction: LOWEST_SATISFACTION_FALLBACK.to_string(),
            highest_expectation: HIGHEST_EXPECTATION_FALLBACK.to_string(),
        }
    }

    #[must_use]
    pub fn from_top_rated(top: &TopRated) -> Self {
        let highest_satisfaction = top.highest_satisfaction.map_or_else(
            || HIGHEST_SATISFACTION_FALLBACK.to_string(),
            |item| {
                format!(
                    "最も満足度が高い項目「{}」（満足度：{}）について、具体的にお聞かせください",
                    item.display, item.score
                )
            },
        );
        let lowest_satisfaction = top.lowest_satisfaction.map_or_else(
            || LOWEST_SATISFACTION_FALLBACK.to_string(),
            |item| {
                format!(
                    "最も満足度が低い項目「{}」（満足度：{}）について、改善を求める理由を具体的にお聞かせください",
                    item.display, item.score
                )
            },
        );
        let highest_expectation = top.highest_expectation.map_or_else(
            || HIGHEST_EXPECTATION_FALLBACK.to_string(),
            |item| {
                format!(
                    "最も期待度が高い項目「{}」（期待度：{}）について、具体的にお聞かせください",
                    item.display, item.score
                )
            },
        );

        Self {
            highest_satisfaction,
            lowest_satisfaction,
            highest_expectation,
        }
    }

    #[must_use]
    pub fn compute(registry: &QuestionRegistry, answers: &AnswerSet) -> Self {
        Self::from_top_rated(&top_rated(registry, answers))
    }

    /// Prompt replacing the static label of `field_key`, if it is one of the three.
    #[must_use]
    pub fn label_for(&self, field_key: &str) -> Option<&str> {
        match field_key {
            MOST_SATISFIED_KEY => Some(&self.highest_satisfaction),
            LEAST_SATISFIED_KEY => Some(&self.lowest_satisfaction),
            MOST_EXPECTED_KEY => Some(&self.highest_expectation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::standard_registry;

    #[test]
    fn picks_extremes_and_interpolates_names() {
        let registry = standard_registry();
        let answers: AnswerSet = [
            ("promotion_satisfaction", "満足していない"),
            ("relationship_satisfaction", "満足している"),
            ("vacation_expectation", "今の会社には期待している"),
        ]
        .into_iter()
        .collect();

        let top = top_rated(&registry, &answers);
        assert_eq!(top.highest_satisfaction.unwrap().key, "relationship_satisfaction");
        assert_eq!(top.lowest_satisfaction.unwrap().key, "promotion_satisfaction");
        assert_eq!(top.highest_expectation.unwrap().key, "vacation_expectation");

        let labels = DynamicLabels::from_top_rated(&top);
        assert_eq!(
            labels.highest_satisfaction,
            "最も満足度が高い項目「人間関係が良好な職場」（満足度：5）について、具体的にお聞かせください"
        );
        assert_eq!(
            labels.lowest_satisfaction,
            "最も満足度が低い項目「成果に応じて早期の昇給・昇格が望める職場」（満足度：1）について、改善を求める理由を具体的にお聞かせください"
        );
        assert_eq!(
            labels.highest_expectation,
            "最も期待度が高い項目「有給休暇がちゃんと取れる職場」（期待度：5）について、具体的にお聞かせください"
        );
    }

    #[test]
    fn empty_answers_fall_back_to_generic_prompts() {
        let labels = DynamicLabels::compute(&standard_registry(), &AnswerSet::new());
        assert_eq!(labels, DynamicLabels::fallback());
        assert_eq!(
            labels.label_for(MOST_EXPECTED_KEY),
            Some("最も期待度が高い項目について、具体的にお聞かせください")
        );
        assert_eq!(labels.label_for("other_comments"), None);
    }

    #[test]
    fn ties_resolve_to_registry_order_not_answer_order() {
        let registry = standard_registry();
        // commute is registered after vacation; both score 4.
        let answers: AnswerSet = [
            ("commute_satisfaction", "どちらかと言えば満足している"),
            ("vacation_satisfaction", "どちらかと言えば満足している"),
        ]
        .into_iter()
        .collect();

        let top = top_rated(&registry, &answers);
        assert_eq!(top.highest_satisfaction.unwrap().key, "vacation_satisfaction");
        assert_eq!(top.lowest_satisfaction.unwrap().key, "vacation_satisfaction");
        assert!(top.highest_expectation.is_none());
    }

    #[test]
    fn unscoreable_and_unregistered_answers_are_ignored() {
        let registry = standard_registry();
        let answers: AnswerSet = [
            ("vacation_satisfaction", "今の会社には期待している"),
            ("bonus_satisfaction", "満足している"),
            ("overall_satisfaction", "満足している"),
        ]
        .into_iter()
        .collect();

        assert_eq!(top_rated(&registry, &answers), TopRated::default());
    }
}
