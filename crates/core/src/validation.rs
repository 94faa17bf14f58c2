//! Required-field checks for a single page.

use thiserror::Error;

use crate::model::{AnswerSet, FieldKind, FieldSpec, PageNumber, PageSpec};

/// Why a required field blocks navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssue {
    /// No option of a single-choice group is checked.
    Unselected,
    /// Text or select value is empty after trimming.
    Empty,
    /// Text is shorter than the declared minimum.
    TooShort { min: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub key: String,
    pub issue: FieldIssue,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("{} required field(s) missing on page {page}", failures.len())]
    MissingRequired {
        page: PageNumber,
        failures: Vec<FieldFailure>,
    },
}

impl ValidationError {
    #[must_use]
    pub fn failures(&self) -> &[FieldFailure] {
        match self {
            ValidationError::MissingRequired { failures, .. } => failures,
        }
    }

    /// Keys of every failing field, in page order.
    #[must_use]
    pub fn failing_keys(&self) -> Vec<String> {
        self.failures().iter().map(|f| f.key.clone()).collect()
    }
}

/// Check every effectively required field on `page`.
///
/// # Errors
///
/// Returns `ValidationError::MissingRequired` listing every failing field.
pub fn validate_page(page: &PageSpec, answers: &AnswerSet) -> Result<(), ValidationError> {
    let failures: Vec<FieldFailure> = page
        .fields()
        .iter()
        .filter(|field| field.is_effectively_required(answers))
        .filter_map(|field| {
            check_field(field, answers.get(&field.key)).map(|issue| FieldFailure {
                key: field.key.clone(),
                issue,
            })
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingRequired {
            page: page.number(),
            failures,
        })
    }
}

fn check_field(field: &FieldSpec, value: Option<&str>) -> Option<FieldIssue> {
    match &field.kind {
        FieldKind::SingleChoice { options } => {
            let selected = value.is_some_and(|v| options.iter().any(|option| option == v));
            (!selected).then_some(FieldIssue::Unselected)
        }
        FieldKind::Select { .. } => {
            let trimmed = value.map_or("", str::trim);
            trimmed.is_empty().then_some(FieldIssue::Empty)
        }
        FieldKind::FreeText { min_length, .. } => {
            let trimmed = value.map_or("", str::trim);
            if trimmed.is_empty() {
                return Some(FieldIssue::Empty);
            }
            // Same unit as `CharCounter::measure`.
            let actual = trimmed.chars().count();
            match min_length {
                Some(min) if actual < *min => Some(FieldIssue::TooShort { min: *min, actual }),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RevealRule;

    fn page() -> PageSpec {
        PageSpec::new(
            PageNumber::new(3),
            "テスト",
            vec![
                FieldSpec::required("age_group", "年代", FieldKind::single_choice(["20代", "30代"])),
                FieldSpec::required("department", "部署", FieldKind::select(["営業部", "その他"])),
                FieldSpec::required("department_other", "部署名", FieldKind::free_text(None))
                    .revealed_by(RevealRule::new("department", "その他")),
                FieldSpec::required("comment", "コメント", FieldKind::free_text(Some(5))),
                FieldSpec::optional("note", "備考", FieldKind::free_text(None)),
            ],
        )
    }

    #[test]
    fn empty_page_reports_every_required_field() {
        let err = validate_page(&page(), &AnswerSet::new()).unwrap_err();
        assert_eq!(err.failing_keys(), vec!["age_group", "department", "comment"]);
        assert_eq!(err.failures()[0].issue, FieldIssue::Unselected);
        assert_eq!(err.failures()[1].issue, FieldIssue::Empty);
    }

    #[test]
    fn whitespace_and_short_text_fail() {
        let answers: AnswerSet = [
            ("age_group", "20代"),
            ("department", "   "),
            ("comment", "  あいう  "),
        ]
        .into_iter()
        .collect();

        let err = validate_page(&page(), &answers).unwrap_err();
        assert_eq!(err.failing_keys(), vec!["department", "comment"]);
        assert_eq!(
            err.failures()[1].issue,
            FieldIssue::TooShort { min: 5, actual: 3 }
        );
    }

    #[test]
    fn unknown_option_does_not_count_as_selected() {
        let answers: AnswerSet = [
            ("age_group", "90代"),
            ("department", "営業部"),
            ("comment", "とても良い職場"),
        ]
        .into_iter()
        .collect();
        let err = validate_page(&page(), &answers).unwrap_err();
        assert_eq!(err.failing_keys(), vec!["age_group"]);
    }

    #[test]
    fn revealed_follow_up_becomes_required() {
        let mut answers: AnswerSet = [
            ("age_group", "30代"),
            ("department", "その他"),
            ("comment", "とても良い職場"),
        ]
        .into_iter()
        .collect();
        let err = validate_page(&page(), &answers).unwrap_err();
        assert_eq!(err.failing_keys(), vec!["department_other"]);

        answers.set("department_other", "広報部");
        assert!(validate_page(&page(), &answers).is_ok());
    }
}
