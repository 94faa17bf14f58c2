use std::sync::Arc;

use storage::repository::Storage;
use survey_core::model::{QuestionRegistry, SurveyDefinition};
use survey_core::registry::{employee_survey, standard_registry};

use crate::Clock;
use crate::dashboard::DashboardClient;
use crate::error::AppServicesError;
use crate::submission::{HttpSurveySubmitter, SubmitConfig, SurveySubmitter};
use crate::wizard::WizardLoopService;

/// Assembles app-facing services around the standard employee survey.
#[derive(Clone)]
pub struct AppServices {
    wizard: Arc<WizardLoopService>,
    dashboard: Arc<DashboardClient>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the API
    /// configuration is unusable.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: SubmitConfig,
        dashboard_token: Option<String>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::with_storage(storage, clock, config, dashboard_token)
    }

    /// Build services that keep everything in memory.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the API configuration is unusable.
    pub fn in_memory(
        clock: Clock,
        config: SubmitConfig,
        dashboard_token: Option<String>,
    ) -> Result<Self, AppServicesError> {
        Self::with_storage(Storage::in_memory(), clock, config, dashboard_token)
    }

    fn with_storage(
        storage: Storage,
        clock: Clock,
        config: SubmitConfig,
        dashboard_token: Option<String>,
    ) -> Result<Self, AppServicesError> {
        let definition: Arc<SurveyDefinition> = Arc::new(employee_survey()?);
        let registry: Arc<QuestionRegistry> = Arc::new(standard_registry());
        let submitter: Arc<dyn SurveySubmitter> = Arc::new(HttpSurveySubmitter::new(&config)?);
        let dashboard = Arc::new(
            DashboardClient::new(config.base_url().as_str())?.with_auth_token(dashboard_token),
        );
        let wizard = Arc::new(WizardLoopService::new(
            clock, storage, submitter, config, definition, registry,
        ));

        Ok(Self { wizard, dashboard })
    }

    #[must_use]
    pub fn wizard(&self) -> Arc<WizardLoopService> {
        Arc::clone(&self.wizard)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardClient> {
        Arc::clone(&self.dashboard)
    }
}
