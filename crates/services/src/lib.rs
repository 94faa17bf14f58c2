#![forbid(unsafe_code)]

mod api;
pub mod app_services;
pub mod dashboard;
pub mod error;
pub mod submission;
pub mod wizard;

pub use survey_core::Clock;

pub use app_services::AppServices;
pub use dashboard::{
    CategoryStat, CreatedSurveyToken, DashboardClient, DepartmentStat, ExportBundle,
    NewSurveyToken, Statistics, SurveyToken,
};
pub use error::{AppServicesError, BaseUrlError, DashboardError, SubmissionError, WizardError};
pub use submission::{
    DEFAULT_USER_AGENT, HttpSurveySubmitter, SubmissionReceipt, SubmitConfig, SurveySubmitter,
};
pub use wizard::{
    DebugSnapshot, FieldView, Navigation, PageView, PendingSave, Step, SubmitControl, SubmitPhase,
    WizardController, WizardLoopService,
};
