use services::{
    PageView, PendingSave, Step, SubmissionError, SubmissionReceipt, SubmitControl, SubmitPhase,
    WizardController, WizardError, WizardLoopService,
};
use survey_core::model::{PageNumber, SubmissionPayload};
use survey_core::progress::{NavButtons, Progress};
use tracing::debug;

use crate::views::ViewError;
use crate::vm::time_fmt::format_time;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WizardIntent {
    Change { key: String, value: String },
    Next { from: PageNumber },
    Prev { from: PageNumber },
    RequestSubmit,
    CancelSubmit,
    ConfirmSubmit,
    DismissCompletion,
    DismissError,
    /// The window's close button was pressed.
    CloseRequested,
    StayInSurvey,
    LeaveSurvey,
}

/// What the view still has to do after a synchronous step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The page changed; write the record through.
    Moved(PendingSave),
    /// Validation failed; feedback is showing and must be expired later.
    Blocked,
    Unchanged,
}

/// Survey state as the view sees it.
///
/// Every method is synchronous so it can run inside a signal write; the
/// view spawns the awaited half (autosave, network) afterwards.
pub struct WizardVm {
    wizard: WizardController,
}

impl WizardVm {
    #[must_use]
    pub fn new(wizard: WizardController) -> Self {
        Self { wizard }
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` if the controller rejects the edit.
    pub fn change(
        &mut self,
        service: &WizardLoopService,
        key: &str,
        value: String,
    ) -> Result<PendingSave, ViewError> {
        service
            .change_field(&mut self.wizard, key, value)
            .map_err(|err| {
                debug!(error = %err, key, "field change rejected");
                ViewError::Unknown
            })
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` for failures other than validation.
    pub fn next(
        &mut self,
        service: &WizardLoopService,
        from: PageNumber,
    ) -> Result<StepOutcome, ViewError> {
        match service.advance(&mut self.wizard, from) {
            Ok(step) => Ok(step_outcome(step)),
            Err(err) => blocked_or_unknown(&err),
        }
    }

    pub fn prev(&mut self, service: &WizardLoopService, from: PageNumber) -> StepOutcome {
        step_outcome(service.retreat(&mut self.wizard, from))
    }

    /// Validate the last page and open the confirmation dialog.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` for failures other than validation.
    pub fn request_submit(&mut self, service: &WizardLoopService) -> Result<StepOutcome, ViewError> {
        match service.request_submit(&mut self.wizard) {
            Ok(()) => Ok(StepOutcome::Unchanged),
            Err(err) => blocked_or_unknown(&err),
        }
    }

    pub fn cancel_submit(&mut self) {
        self.wizard.cancel_submit();
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` when nothing is waiting for confirmation.
    pub fn prepare_submission(
        &mut self,
        service: &WizardLoopService,
    ) -> Result<SubmissionPayload, ViewError> {
        service
            .prepare_submission(&mut self.wizard)
            .map_err(|err| {
                debug!(error = %err, "submission not prepared");
                ViewError::Unknown
            })
    }

    /// Returns `true` when the survey was accepted.
    pub fn settle_submission(
        &mut self,
        service: &WizardLoopService,
        outcome: Result<SubmissionReceipt, SubmissionError>,
    ) -> bool {
        service.settle_submission(&mut self.wizard, outcome).is_ok()
    }

    pub fn dismiss_completion(&mut self) -> bool {
        self.wizard.dismiss_completion()
    }

    pub fn dismiss_error(&mut self) {
        self.wizard.dismiss_submit_error();
    }

    /// Returns `true` when the window may close without asking.
    pub fn request_leave(&mut self) -> bool {
        self.wizard.request_leave()
    }

    pub fn cancel_leave(&mut self) {
        self.wizard.cancel_leave();
    }

    pub fn expire_feedback(&mut self, service: &WizardLoopService) {
        service.expire_feedback(&mut self.wizard);
    }

    #[must_use]
    pub fn page(&self) -> PageView {
        self.wizard.page_view()
    }

    #[must_use]
    pub fn current_page(&self) -> PageNumber {
        self.wizard.current_page()
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.wizard.progress()
    }

    #[must_use]
    pub fn nav(&self) -> NavButtons {
        self.wizard.nav_buttons()
    }

    #[must_use]
    pub fn submit_control(&self) -> SubmitControl {
        self.wizard.submit_control()
    }

    #[must_use]
    pub fn banner(&self) -> Option<&'static str> {
        self.wizard.validation_banner()
    }

    #[must_use]
    pub fn submit_error(&self) -> Option<&'static str> {
        self.wizard.submit_error()
    }

    #[must_use]
    pub fn is_confirming(&self) -> bool {
        self.wizard.phase() == &SubmitPhase::Confirming
    }

    /// `Some` once the survey was accepted, carrying the server's response id.
    #[must_use]
    pub fn completion(&self) -> Option<Option<&str>> {
        match self.wizard.phase() {
            SubmitPhase::Completed { response_id } => Some(response_id.as_deref()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_leave_pending(&self) -> bool {
        self.wizard.is_leave_pending()
    }

    #[must_use]
    pub fn last_saved_label(&self) -> Option<String> {
        self.wizard
            .last_updated()
            .map(|at| format!("自動保存済み {}", format_time(at)))
    }
}

fn step_outcome(step: Step) -> StepOutcome {
    match step.save {
        Some(pending) => StepOutcome::Moved(pending),
        None => StepOutcome::Unchanged,
    }
}

fn blocked_or_unknown(err: &WizardError) -> Result<StepOutcome, ViewError> {
    if err.is_validation() {
        Ok(StepOutcome::Blocked)
    } else {
        debug!(error = %err, "wizard step rejected");
        Err(ViewError::Unknown)
    }
}

/// Open the survey, restoring autosaved answers.
pub async fn start_wizard(service: &WizardLoopService) -> WizardVm {
    WizardVm::new(service.start_wizard().await)
}
