use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::PageNumber;
use crate::model::page::{FieldSpec, PageSpec};

/// Keys the submission payload adds on top of the answers.
pub const RESERVED_KEYS: [&str; 7] = [
    "submission_time",
    "user_agent",
    "page_load_time",
    "response_start_time",
    "response_duration",
    "last_updated",
    "survey_token",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SurveyDefinitionError {
    #[error("a survey needs at least one page")]
    NoPages,

    #[error("page {found} is out of order (expected {expected})")]
    PageOutOfOrder { expected: usize, found: usize },

    #[error("field key {0:?} is declared more than once")]
    DuplicateKey(String),

    #[error("field key {0:?} is reserved for submission metadata")]
    ReservedKey(String),

    #[error("field {field:?} is revealed by unknown field {source_key:?}")]
    UnknownRevealSource { field: String, source_key: String },

    #[error("choice field {0:?} has no options")]
    NoOptions(String),
}

/// The fixed, ordered list of pages making up one survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyDefinition {
    pages: Vec<PageSpec>,
}

impl SurveyDefinition {
    /// Build a definition, checking page numbering and key uniqueness.
    ///
    /// # Errors
    ///
    /// Returns `SurveyDefinitionError` if pages are missing or misnumbered,
    /// a key is duplicated or reserved, a choice field has no options, or a
    /// reveal rule points at an unknown field.
    pub fn new(pages: Vec<PageSpec>) -> Result<Self, SurveyDefinitionError> {
        if pages.is_empty() {
            return Err(SurveyDefinitionError::NoPages);
        }

        let mut keys = HashSet::new();
        for (idx, page) in pages.iter().enumerate() {
            let expected = idx + 1;
            if page.number().value() != expected {
                return Err(SurveyDefinitionError::PageOutOfOrder {
                    expected,
                    found: page.number().value(),
                });
            }
            for field in page.fields() {
                if RESERVED_KEYS.contains(&field.key.as_str()) {
                    return Err(SurveyDefinitionError::ReservedKey(field.key.clone()));
                }
                if !keys.insert(field.key.clone()) {
                    return Err(SurveyDefinitionError::DuplicateKey(field.key.clone()));
                }
                if !matches!(field.kind, crate::model::FieldKind::FreeText { .. })
                    && field.kind.options().is_empty()
                {
                    return Err(SurveyDefinitionError::NoOptions(field.key.clone()));
                }
            }
        }

        for field in pages.iter().flat_map(PageSpec::fields) {
            if let Some(rule) = field.reveal.as_ref() {
                if !keys.contains(&rule.source) {
                    return Err(SurveyDefinitionError::UnknownRevealSource {
                        field: field.key.clone(),
                        source_key: rule.source.clone(),
                    });
                }
            }
        }

        Ok(Self { pages })
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn last_page(&self) -> PageNumber {
        PageNumber::new(self.pages.len())
    }

    #[must_use]
    pub fn contains_page(&self, number: PageNumber) -> bool {
        (1..=self.pages.len()).contains(&number.value())
    }

    #[must_use]
    pub fn page(&self, number: PageNumber) -> Option<&PageSpec> {
        if number.value() == 0 {
            return None;
        }
        self.pages.get(number.index())
    }

    #[must_use]
    pub fn pages(&self) -> &[PageSpec] {
        &self.pages
    }

    /// Find a field anywhere in the survey.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.pages.iter().find_map(|page| page.field(key))
    }

    /// Fields that are shown only while `source_key` holds a specific value.
    pub fn dependents_of<'a>(&'a self, source_key: &'a str) -> impl Iterator<Item = &'a FieldSpec> {
        self.pages
            .iter()
            .flat_map(PageSpec::fields)
            .filter(move |field| {
                field
                    .reveal
                    .as_ref()
                    .is_some_and(|rule| rule.source == source_key)
            })
    }
}
