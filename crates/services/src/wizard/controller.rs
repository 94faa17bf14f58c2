use std::sync::Arc;

use chrono::{DateTime, Utc};
use survey_core::counter::CharCounter;
use survey_core::labels::DynamicLabels;
use survey_core::model::{
    AnswerSet, FieldKind, PageNumber, PersistedSessionRecord, QuestionRegistry, SessionTiming,
    SubmissionPayload, SurveyDefinition,
};
use survey_core::progress::{NavButtons, Progress};
use survey_core::validation::{ValidationError, validate_page};
use tracing::debug;

use super::feedback::{VALIDATION_BANNER, ValidationFeedback};
use crate::error::WizardError;

pub const CONFIRM_SUBMIT_PROMPT: &str = "調査を送信しますか？送信後は回答内容を変更できません。";
pub const SUBMIT_LABEL: &str = "調査を送信する";
pub const SUBMITTING_LABEL: &str = "送信中...";
pub const SUBMIT_FAILED_MESSAGE: &str = "送信に失敗しました。もう一度お試しください。";
pub const LEAVE_WARNING: &str = "調査が完了していません。ページを離脱しますか？";

//
// ─── VIEW TYPES ────────────────────────────────────────────────────────────────
//

/// Where the submission of the final page stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    /// Validated and waiting for the respondent to confirm.
    Confirming,
    /// Sent; waiting for the API.
    InFlight,
    Completed { response_id: Option<String> },
}

/// Outcome of a navigation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: PageNumber, to: PageNumber },
    Unchanged,
}

impl Navigation {
    #[must_use]
    pub fn moved(self) -> bool {
        matches!(self, Navigation::Moved { .. })
    }
}

/// Everything needed to render one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub visible: bool,
    pub value: String,
    pub flagged: bool,
    pub counter: Option<CharCounter>,
}

impl FieldView {
    #[must_use]
    pub fn is_selected(&self, option: &str) -> bool {
        !self.value.is_empty() && self.value == option
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub number: PageNumber,
    pub title: String,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub visible: bool,
    pub enabled: bool,
    pub label: &'static str,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// In-memory state machine of one survey session.
///
/// Commands take `now` from the caller so the controller stays synchronous
/// and deterministic; persistence and networking live in `WizardLoopService`.
pub struct WizardController {
    definition: Arc<SurveyDefinition>,
    registry: Arc<QuestionRegistry>,
    timing: SessionTiming,
    current: PageNumber,
    answers: AnswerSet,
    /// Restored keys this survey does not declare, carried into autosave.
    retained: AnswerSet,
    last_updated: Option<DateTime<Utc>>,
    labels: DynamicLabels,
    phase: SubmitPhase,
    feedback: Option<ValidationFeedback>,
    submit_error: Option<&'static str>,
    leave_pending: bool,
}

impl WizardController {
    #[must_use]
    pub fn new(
        definition: Arc<SurveyDefinition>,
        registry: Arc<QuestionRegistry>,
        timing: SessionTiming,
    ) -> Self {
        Self {
            definition,
            registry,
            timing,
            current: PageNumber::FIRST,
            answers: AnswerSet::new(),
            retained: AnswerSet::new(),
            last_updated: None,
            labels: DynamicLabels::fallback(),
            phase: SubmitPhase::Idle,
            feedback: None,
            submit_error: None,
            leave_pending: false,
        }
    }

    /// Merge an autosaved record into the session.
    ///
    /// Keys the survey does not declare stay out of the answers and the
    /// payload, but later autosaves keep writing them back. Returns how many
    /// answers were restored.
    pub fn restore(&mut self, record: PersistedSessionRecord) -> usize {
        let mut restored = 0;
        for (key, value) in record.answers.iter() {
            if self.definition.field(key).is_some() {
                self.answers.set(key, value);
                restored += 1;
            } else {
                debug!(key, "keeping undeclared autosave key");
                self.retained.set(key, value);
            }
        }
        if record.last_updated.is_some() {
            self.last_updated = record.last_updated;
        }
        self.refresh_labels();
        restored
    }

    /// Record a new value for `key` and return the snapshot to autosave.
    ///
    /// Follow-up fields hidden by the change lose their value.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::UnknownField` for undeclared keys and
    /// `WizardError::AlreadySubmitted` once the survey was sent.
    pub fn on_field_change(
        &mut self,
        key: &str,
        value: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<PersistedSessionRecord, WizardError> {
        if matches!(self.phase, SubmitPhase::Completed { .. }) {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.definition.field(key).is_none() {
            return Err(WizardError::UnknownField(key.to_string()));
        }

        self.answers.set(key, value);
        for dependent in self.definition.dependents_of(key) {
            if !dependent.is_visible(&self.answers) {
                self.answers.remove(&dependent.key);
            }
        }
        self.last_updated = Some(now);
        Ok(self.snapshot())
    }

    /// Move to the next page if the current one validates.
    ///
    /// Advancing from the last page is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Validation` listing the failing fields; the
    /// feedback is also kept for display until it expires.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Navigation, WizardError> {
        if self.is_completed() || self.current.value() >= self.definition.total_pages() {
            return Ok(Navigation::Unchanged);
        }
        self.validate_current(now)?;

        let from = self.current;
        self.current = from.next();
        self.land();
        debug!(from = %from, to = %self.current, "advanced page");
        Ok(Navigation::Moved {
            from,
            to: self.current,
        })
    }

    /// `advance` issued from a rendered page; stale duplicates are ignored.
    ///
    /// # Errors
    ///
    /// See [`WizardController::advance`].
    pub fn advance_from(
        &mut self,
        page: PageNumber,
        now: DateTime<Utc>,
    ) -> Result<Navigation, WizardError> {
        if page != self.current {
            return Ok(Navigation::Unchanged);
        }
        self.advance(now)
    }

    /// Move to the previous page without validating the one being left.
    pub fn retreat(&mut self) -> Navigation {
        if self.is_completed() || self.current <= PageNumber::FIRST {
            return Navigation::Unchanged;
        }
        let from = self.current;
        self.current = from.previous();
        self.land();
        debug!(from = %from, to = %self.current, "retreated page");
        Navigation::Moved {
            from,
            to: self.current,
        }
    }

    /// `retreat` issued from a rendered page; stale duplicates are ignored.
    pub fn retreat_from(&mut self, page: PageNumber) -> Navigation {
        if page != self.current {
            return Navigation::Unchanged;
        }
        self.retreat()
    }

    /// Go straight to `page` without validation.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::PageOutOfRange` for pages outside the survey.
    pub fn jump_to(&mut self, page: PageNumber) -> Result<Navigation, WizardError> {
        if !self.definition.contains_page(page) {
            return Err(WizardError::PageOutOfRange(page));
        }
        if page == self.current || self.is_completed() {
            return Ok(Navigation::Unchanged);
        }
        let from = self.current;
        self.current = page;
        self.land();
        Ok(Navigation::Moved { from, to: page })
    }

    /// Validate the final page and ask for confirmation.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::NotOnLastPage`, `WizardError::Validation`, or a
    /// phase error when a submission is running or done.
    pub fn begin_submit(&mut self, now: DateTime<Utc>) -> Result<(), WizardError> {
        self.ensure_not_sending()?;
        if self.current != self.definition.last_page() {
            return Err(WizardError::NotOnLastPage);
        }
        self.validate_current(now)?;
        self.phase = SubmitPhase::Confirming;
        self.submit_error = None;
        Ok(())
    }

    /// The respondent declined the confirmation.
    pub fn cancel_submit(&mut self) {
        if self.phase == SubmitPhase::Confirming {
            self.phase = SubmitPhase::Idle;
        }
    }

    /// Confirmed: lock the submit control and build the request body.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::NotConfirming` unless `begin_submit` succeeded
    /// first, or `WizardError::Validation` if answers changed in between.
    pub fn confirm_submit(
        &mut self,
        user_agent: &str,
        survey_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SubmissionPayload, WizardError> {
        self.ensure_not_sending()?;
        if self.phase != SubmitPhase::Confirming {
            return Err(WizardError::NotConfirming);
        }
        if let Err(err) = self.validate_current(now) {
            self.phase = SubmitPhase::Idle;
            return Err(err);
        }

        self.phase = SubmitPhase::InFlight;
        Ok(SubmissionPayload::assemble(
            self.answers.clone(),
            &self.timing,
            self.last_updated,
            user_agent,
            survey_token.map(str::to_owned),
            now,
        ))
    }

    pub fn complete_submission(&mut self, response_id: Option<String>) {
        if self.phase == SubmitPhase::InFlight {
            self.phase = SubmitPhase::Completed { response_id };
            self.feedback = None;
            self.submit_error = None;
        }
    }

    /// Re-enable the submit control and keep every answer.
    pub fn fail_submission(&mut self) {
        if self.phase == SubmitPhase::InFlight {
            self.phase = SubmitPhase::Idle;
            self.submit_error = Some(SUBMIT_FAILED_MESSAGE);
        }
    }

    /// Close the completion overlay and start over on an empty first page.
    ///
    /// Returns `false` when nothing was completed.
    pub fn dismiss_completion(&mut self) -> bool {
        if !self.is_completed() {
            return false;
        }
        self.current = PageNumber::FIRST;
        self.answers.clear();
        self.retained.clear();
        self.last_updated = None;
        self.labels = DynamicLabels::fallback();
        self.phase = SubmitPhase::Idle;
        self.feedback = None;
        self.submit_error = None;
        true
    }

    /// Drop validation highlights and banners that timed out at `now`.
    pub fn expire_feedback(&mut self, now: DateTime<Utc>) {
        if let Some(feedback) = self.feedback.as_mut() {
            if !feedback.expire(now) {
                self.feedback = None;
            }
        }
    }

    pub fn dismiss_submit_error(&mut self) {
        self.submit_error = None;
    }

    /// The window is being closed. Returns `true` when it may close right
    /// away; otherwise the leave warning is raised and `false` returned.
    pub fn request_leave(&mut self) -> bool {
        if self.should_confirm_leave() {
            self.leave_pending = true;
            false
        } else {
            true
        }
    }

    /// The respondent chose to stay.
    pub fn cancel_leave(&mut self) {
        self.leave_pending = false;
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn current_page(&self) -> PageNumber {
        self.current
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.definition.total_pages()
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    #[must_use]
    pub fn timing(&self) -> &SessionTiming {
        &self.timing
    }

    #[must_use]
    pub fn labels(&self) -> &DynamicLabels {
        &self.labels
    }

    #[must_use]
    pub fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.phase, SubmitPhase::Completed { .. })
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&ValidationFeedback> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn validation_banner(&self) -> Option<&'static str> {
        self.feedback.as_ref().map(|_| VALIDATION_BANNER)
    }

    #[must_use]
    pub fn submit_error(&self) -> Option<&'static str> {
        self.submit_error
    }

    /// The record that autosave writes for the current answers.
    #[must_use]
    pub fn snapshot(&self) -> PersistedSessionRecord {
        let mut answers = self.retained.clone();
        answers.merge(self.answers.clone());
        PersistedSessionRecord::new(answers, self.last_updated)
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::new(self.current, self.definition.total_pages())
    }

    #[must_use]
    pub fn nav_buttons(&self) -> NavButtons {
        self.progress().nav_buttons()
    }

    #[must_use]
    pub fn submit_control(&self) -> SubmitControl {
        let in_flight = self.phase == SubmitPhase::InFlight;
        SubmitControl {
            visible: self.nav_buttons().show_submit,
            enabled: !in_flight && !self.is_completed(),
            label: if in_flight {
                SUBMITTING_LABEL
            } else {
                SUBMIT_LABEL
            },
        }
    }

    /// Leaving mid-survey should be confirmed; the first and last pages are exempt.
    #[must_use]
    pub fn should_confirm_leave(&self) -> bool {
        let current = self.current.value();
        !self.is_completed() && current > 1 && current < self.definition.total_pages()
    }

    /// Whether the leave warning is waiting for an answer.
    #[must_use]
    pub fn is_leave_pending(&self) -> bool {
        self.leave_pending
    }

    /// Render data for the current page, labels and values included.
    #[must_use]
    pub fn page_view(&self) -> PageView {
        let Some(page) = self.definition.page(self.current) else {
            return PageView {
                number: self.current,
                title: String::new(),
                fields: Vec::new(),
            };
        };

        let fields = page
            .fields()
            .iter()
            .map(|field| {
                let value = self.answers.get(&field.key).unwrap_or_default().to_string();
                FieldView {
                    key: field.key.clone(),
                    label: self
                        .labels
                        .label_for(&field.key)
                        .map_or_else(|| field.label.clone(), str::to_owned),
                    kind: field.kind.clone(),
                    required: field.is_effectively_required(&self.answers),
                    visible: field.is_visible(&self.answers),
                    flagged: self
                        .feedback
                        .as_ref()
                        .is_some_and(|feedback| feedback.is_flagged(&field.key)),
                    counter: CharCounter::for_field(&field.kind, &value),
                    value,
                }
            })
            .collect();

        PageView {
            number: page.number(),
            title: page.title().to_string(),
            fields,
        }
    }

    fn validate_current(&mut self, now: DateTime<Utc>) -> Result<(), WizardError> {
        let outcome = match self.definition.page(self.current) {
            Some(page) => validate_page(page, &self.answers),
            None => return Err(WizardError::PageOutOfRange(self.current)),
        };
        outcome.map_err(|err: ValidationError| {
            debug!(page = %self.current, failing = ?err.failing_keys(), "page validation failed");
            self.feedback = Some(ValidationFeedback::raised(&err, now));
            WizardError::Validation(err)
        })
    }

    fn ensure_not_sending(&self) -> Result<(), WizardError> {
        match self.phase {
            SubmitPhase::InFlight => Err(WizardError::SubmissionInFlight),
            SubmitPhase::Completed { .. } => Err(WizardError::AlreadySubmitted),
            SubmitPhase::Idle | SubmitPhase::Confirming => Ok(()),
        }
    }

    fn land(&mut self) {
        self.feedback = None;
        if self.phase == SubmitPhase::Confirming {
            self.phase = SubmitPhase::Idle;
        }
        self.refresh_labels();
    }

    fn refresh_labels(&mut self) {
        if self.current == self.definition.last_page() {
            self.labels = DynamicLabels::compute(&self.registry, &self.answers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::model::{FieldSpec, PageSpec, RevealRule};
    use survey_core::time::fixed_now;

    fn controller() -> WizardController {
        let definition = SurveyDefinition::new(vec![
            PageSpec::new(
                PageNumber::new(1),
                "one",
                vec![
                    FieldSpec::required("dept", "部署", FieldKind::select(["営業部", "その他"])),
                    FieldSpec::required("dept_other", "部署名", FieldKind::free_text(None))
                        .revealed_by(RevealRule::new("dept", "その他")),
                ],
            ),
            PageSpec::new(
                PageNumber::new(2),
                "two",
                vec![FieldSpec::optional("note", "備考", FieldKind::free_text(None))],
            ),
        ])
        .unwrap();
        WizardController::new(
            Arc::new(definition),
            Arc::new(QuestionRegistry::new()),
            SessionTiming::starting_at(fixed_now()),
        )
    }

    #[test]
    fn hiding_a_follow_up_clears_its_value() {
        let mut wizard = controller();
        wizard.on_field_change("dept", "その他", fixed_now()).unwrap();
        wizard.on_field_change("dept_other", "広報部", fixed_now()).unwrap();
        assert!(wizard.page_view().fields[1].visible);

        let record = wizard.on_field_change("dept", "営業部", fixed_now()).unwrap();
        assert!(record.answers.get("dept_other").is_none());
        assert!(!wizard.page_view().fields[1].visible);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut wizard = controller();
        let err = wizard.on_field_change("bogus", "x", fixed_now()).unwrap_err();
        assert!(matches!(err, WizardError::UnknownField(key) if key == "bogus"));
    }

    #[test]
    fn feedback_expires_in_two_steps() {
        let mut wizard = controller();
        assert!(wizard.advance(fixed_now()).unwrap_err().is_validation());
        assert!(wizard.page_view().fields[0].flagged);
        assert!(wizard.validation_banner().is_some());

        wizard.expire_feedback(fixed_now() + chrono::Duration::seconds(3));
        assert!(!wizard.page_view().fields[0].flagged);
        assert!(wizard.validation_banner().is_some());

        wizard.expire_feedback(fixed_now() + chrono::Duration::seconds(5));
        assert!(wizard.validation_banner().is_none());
    }

    #[test]
    fn navigating_away_cancels_confirmation() {
        let mut wizard = controller();
        wizard.on_field_change("dept", "営業部", fixed_now()).unwrap();
        wizard.advance(fixed_now()).unwrap();
        wizard.begin_submit(fixed_now()).unwrap();
        assert_eq!(wizard.phase(), &SubmitPhase::Confirming);

        wizard.retreat();
        assert_eq!(wizard.phase(), &SubmitPhase::Idle);
        assert!(matches!(
            wizard.begin_submit(fixed_now()),
            Err(WizardError::NotOnLastPage)
        ));
    }

    #[test]
    fn undeclared_keys_survive_into_the_next_snapshot() {
        let mut wizard = controller();
        let mut answers = AnswerSet::new();
        answers.set("dept", "営業部");
        answers.set("retired_question", "はい");
        assert_eq!(wizard.restore(PersistedSessionRecord::new(answers, None)), 1);
        assert!(wizard.answers().get("retired_question").is_none());

        let record = wizard.on_field_change("note", "特になし", fixed_now()).unwrap();
        assert_eq!(record.answers.get("retired_question"), Some("はい"));
        assert_eq!(record.answers.get("dept"), Some("営業部"));

        wizard.advance(fixed_now()).unwrap();
        wizard.begin_submit(fixed_now()).unwrap();
        let payload = wizard.confirm_submit("ua", None, fixed_now()).unwrap();
        assert!(payload.answers.get("retired_question").is_none());
    }
}
