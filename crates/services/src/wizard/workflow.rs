use std::sync::Arc;

use chrono::{DateTime, Utc};
use storage::repository::{Storage, StorageError};
use survey_core::model::{
    AnswerSet, PageNumber, PersistedSessionRecord, QuestionRegistry, SessionTiming,
    SubmissionPayload, SurveyDefinition,
};
use tracing::{error, info, warn};

use super::autosave::{AutosaveWriter, PendingSave};
use super::controller::{Navigation, WizardController};
use crate::Clock;
use crate::error::{SubmissionError, WizardError};
use crate::submission::{SubmissionReceipt, SubmitConfig, SurveySubmitter};

/// In-memory answers next to what autosave last wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugSnapshot {
    pub page: PageNumber,
    pub in_memory: AnswerSet,
    pub stored: Option<PersistedSessionRecord>,
}

/// Outcome of a page command plus the autosave it still owes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Step {
    pub navigation: Navigation,
    pub save: Option<PendingSave>,
}

impl Step {
    fn from_navigation(
        navigation: Navigation,
        wizard: &WizardController,
        writer: &AutosaveWriter,
    ) -> Self {
        let save = navigation.moved().then(|| writer.stage(wizard.snapshot()));
        Self { navigation, save }
    }
}

/// Orchestrates a wizard session: restore, autosave and submission.
///
/// Commands are synchronous so a UI can run them while it holds the wizard
/// mutably; the writes they owe come back as [`PendingSave`]s for
/// [`WizardLoopService::persist`]. Storage failures never stop the survey;
/// they are logged and the session continues without autosave.
#[derive(Clone)]
pub struct WizardLoopService {
    clock: Clock,
    storage: Storage,
    autosave: Arc<AutosaveWriter>,
    submitter: Arc<dyn SurveySubmitter>,
    config: SubmitConfig,
    definition: Arc<SurveyDefinition>,
    registry: Arc<QuestionRegistry>,
}

impl WizardLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        storage: Storage,
        submitter: Arc<dyn SurveySubmitter>,
        config: SubmitConfig,
        definition: Arc<SurveyDefinition>,
        registry: Arc<QuestionRegistry>,
    ) -> Self {
        Self {
            clock,
            autosave: Arc::new(AutosaveWriter::new(storage.clone())),
            storage,
            submitter,
            config,
            definition,
            registry,
        }
    }

    #[must_use]
    pub fn definition(&self) -> Arc<SurveyDefinition> {
        Arc::clone(&self.definition)
    }

    #[must_use]
    pub fn config(&self) -> &SubmitConfig {
        &self.config
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Open the survey: reuse or record the session start, then restore
    /// autosaved answers.
    pub async fn start_wizard(&self) -> WizardController {
        let timing = self.session_timing().await;
        let mut wizard = WizardController::new(
            Arc::clone(&self.definition),
            Arc::clone(&self.registry),
            timing,
        );

        match self.storage.load_record().await {
            Ok(Some(record)) => {
                let restored = wizard.restore(record);
                info!(restored, "restored autosaved answers");
            }
            Ok(None) => {}
            Err(StorageError::Serialization(reason)) => {
                warn!(%reason, "ignoring malformed autosave record");
            }
            Err(err) => {
                warn!(error = %err, "could not read autosave record");
            }
        }
        wizard
    }

    /// Apply a field edit; the returned save writes the whole record through.
    ///
    /// # Errors
    ///
    /// Returns `WizardError` if the controller rejects the edit.
    pub fn change_field(
        &self,
        wizard: &mut WizardController,
        key: &str,
        value: impl Into<String>,
    ) -> Result<PendingSave, WizardError> {
        let record = wizard.on_field_change(key, value, self.clock.now())?;
        Ok(self.autosave.stage(record))
    }

    /// Advance from the page the event was raised on; a move owes one save.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Validation` when required fields are missing.
    pub fn advance(
        &self,
        wizard: &mut WizardController,
        from: PageNumber,
    ) -> Result<Step, WizardError> {
        let navigation = wizard.advance_from(from, self.clock.now())?;
        Ok(Step::from_navigation(navigation, wizard, &self.autosave))
    }

    pub fn retreat(&self, wizard: &mut WizardController, from: PageNumber) -> Step {
        let navigation = wizard.retreat_from(from);
        Step::from_navigation(navigation, wizard, &self.autosave)
    }

    /// Validate the last page and enter confirmation.
    ///
    /// # Errors
    ///
    /// See [`WizardController::begin_submit`].
    pub fn request_submit(&self, wizard: &mut WizardController) -> Result<(), WizardError> {
        wizard.begin_submit(self.clock.now())
    }

    /// Lock the submit control and build the request body.
    ///
    /// # Errors
    ///
    /// See [`WizardController::confirm_submit`].
    pub fn prepare_submission(
        &self,
        wizard: &mut WizardController,
    ) -> Result<SubmissionPayload, WizardError> {
        wizard.confirm_submit(
            self.config.user_agent(),
            self.config.survey_token(),
            self.clock.now(),
        )
    }

    /// Deliver `payload`; an accepted survey no longer needs its autosave record.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError` for transport or API failures.
    pub async fn send_submission(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        info!(answers = payload.answers.len(), "submitting survey");
        match self.submitter.submit(payload).await {
            Ok(receipt) => {
                if let Err(err) = self.autosave.clear().await {
                    warn!(error = %err, "could not clear autosave record after submission");
                }
                Ok(receipt)
            }
            Err(err) => {
                error!(error = %err, "survey submission failed");
                Err(err)
            }
        }
    }

    /// Apply the outcome of `send_submission` to the wizard.
    ///
    /// # Errors
    ///
    /// Passes the submission failure through as `WizardError::Submission`.
    pub fn settle_submission(
        &self,
        wizard: &mut WizardController,
        outcome: Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<SubmissionReceipt, WizardError> {
        match outcome {
            Ok(receipt) => {
                wizard.complete_submission(receipt.response_id.clone());
                Ok(receipt)
            }
            Err(err) => {
                wizard.fail_submission();
                Err(err.into())
            }
        }
    }

    /// Drop validation highlights whose display time has passed.
    pub fn expire_feedback(&self, wizard: &mut WizardController) {
        wizard.expire_feedback(self.clock.now());
    }

    /// Current answers plus the stored record, for diagnostics.
    pub async fn debug_snapshot(&self, wizard: &WizardController) -> DebugSnapshot {
        let stored = match self.storage.load_record().await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "could not read autosave record");
                None
            }
        };
        DebugSnapshot {
            page: wizard.current_page(),
            in_memory: wizard.answers().clone(),
            stored,
        }
    }

    async fn session_timing(&self) -> SessionTiming {
        match self.storage.load_timing().await {
            Ok(Some(timing)) => return timing,
            Ok(None) => {}
            Err(err) => warn!(error = %err, "could not read session start time"),
        }

        let timing = SessionTiming::starting_at(self.clock.now());
        if let Err(err) = self.storage.save_timing(&timing).await {
            warn!(error = %err, "could not record session start time");
        }
        timing
    }

    /// Write a staged snapshot unless a newer one got there first.
    ///
    /// Failures are only logged.
    pub async fn persist(&self, pending: PendingSave) {
        if let Err(err) = self.autosave.write(&pending).await {
            warn!(error = %err, "autosave failed; continuing without it");
        }
    }
}
