mod answers;
mod ids;
mod page;
mod question;
mod record;
mod submission;
mod survey;

pub use answers::AnswerSet;
pub use ids::PageNumber;
pub use page::{DEFAULT_MAX_LENGTH, FieldKind, FieldSpec, PageSpec, RevealRule};
pub use question::{QuestionCategory, QuestionRegistry, ScoredQuestion};
pub use record::{
    PersistedSessionRecord, RECORD_KEY, RecordError, START_TIME_KEY, START_TIMESTAMP_KEY,
    SessionTiming,
};
pub use submission::SubmissionPayload;
pub use survey::{RESERVED_KEYS, SurveyDefinition, SurveyDefinitionError};
