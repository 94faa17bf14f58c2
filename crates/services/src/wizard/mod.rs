mod autosave;
mod controller;
mod feedback;
mod workflow;

// Public API of the wizard subsystem.
pub use autosave::PendingSave;
pub use crate::error::WizardError;
pub use controller::{
    CONFIRM_SUBMIT_PROMPT, FieldView, LEAVE_WARNING, Navigation, PageView, SUBMIT_FAILED_MESSAGE,
    SUBMIT_LABEL, SUBMITTING_LABEL, SubmitControl, SubmitPhase, WizardController,
};
pub use feedback::{BANNER_DURATION_MS, HIGHLIGHT_DURATION_MS, VALIDATION_BANNER, ValidationFeedback};
pub use workflow::{DebugSnapshot, Step, WizardLoopService};
