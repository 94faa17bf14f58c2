use crate::model::answers::AnswerSet;
use crate::model::ids::PageNumber;

/// Default upper bound for free-text answers.
pub const DEFAULT_MAX_LENGTH: usize = 1000;

/// Input control backing a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Radio group: exactly one option may be checked.
    SingleChoice { options: Vec<String> },
    /// Drop-down list; validated like text.
    Select { options: Vec<String> },
    /// Textarea or text input.
    FreeText {
        min_length: Option<usize>,
        max_length: usize,
    },
}

impl FieldKind {
    #[must_use]
    pub fn single_choice<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::SingleChoice {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn select<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Select {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn free_text(min_length: Option<usize>) -> Self {
        Self::FreeText {
            min_length,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        match self {
            FieldKind::SingleChoice { options } | FieldKind::Select { options } => options,
            FieldKind::FreeText { .. } => &[],
        }
    }

    #[must_use]
    pub fn is_single_choice(&self) -> bool {
        matches!(self, FieldKind::SingleChoice { .. })
    }
}

/// Shows a follow-up field only while another field holds a given value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealRule {
    pub source: String,
    pub equals: String,
}

impl RevealRule {
    #[must_use]
    pub fn new(source: impl Into<String>, equals: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            equals: equals.into(),
        }
    }

    #[must_use]
    pub fn is_met(&self, answers: &AnswerSet) -> bool {
        answers.get(&self.source) == Some(self.equals.as_str())
    }
}

/// One question on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub reveal: Option<RevealRule>,
}

impl FieldSpec {
    #[must_use]
    pub fn required(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: true,
            reveal: None,
        }
    }

    #[must_use]
    pub fn optional(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            required: false,
            ..Self::required(key, label, kind)
        }
    }

    #[must_use]
    pub fn revealed_by(mut self, rule: RevealRule) -> Self {
        self.reveal = Some(rule);
        self
    }

    /// Whether the field is currently shown given the collected answers.
    #[must_use]
    pub fn is_visible(&self, answers: &AnswerSet) -> bool {
        self.reveal.as_ref().is_none_or(|rule| rule.is_met(answers))
    }

    /// Required and visible; hidden follow-up fields never block navigation.
    #[must_use]
    pub fn is_effectively_required(&self, answers: &AnswerSet) -> bool {
        self.required && self.is_visible(answers)
    }
}

/// One step of the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    number: PageNumber,
    title: String,
    fields: Vec<FieldSpec>,
}

impl PageSpec {
    #[must_use]
    pub fn new(number: PageNumber, title: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            number,
            title: title.into(),
            fields,
        }
    }

    #[must_use]
    pub fn number(&self) -> PageNumber {
        self.number
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }
}
