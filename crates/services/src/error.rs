//! Shared error types for the services crate.

use thiserror::Error;

use storage::sqlite::SqliteInitError;
use survey_core::model::{PageNumber, SurveyDefinitionError};
use survey_core::validation::ValidationError;

/// Errors emitted by the survey wizard.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unknown field {0:?}")]
    UnknownField(String),
    #[error("page {0} does not exist")]
    PageOutOfRange(PageNumber),
    #[error("the survey can only be submitted from the last page")]
    NotOnLastPage,
    #[error("no submission is awaiting confirmation")]
    NotConfirming,
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    #[error("the survey has already been submitted")]
    AlreadySubmitted,
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl WizardError {
    /// Whether the error came from required-field validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, WizardError::Validation(_))
    }
}

/// An API base URL that cannot be used.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BaseUrlError {
    #[error("invalid API base URL: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("unsupported API URL scheme {0:?}")]
    UnsupportedScheme(String),
}

/// Errors emitted while sending a completed survey.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error(transparent)]
    BaseUrl(#[from] BaseUrlError),
    #[error("submission failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("submission was rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `DashboardClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    BaseUrl(#[from] BaseUrlError),
    #[error("survey token not found")]
    TokenNotFound,
    #[error("dashboard request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("dashboard request was rejected")]
    Rejected,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Definition(#[from] SurveyDefinitionError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
}
