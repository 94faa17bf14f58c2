use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::answers::AnswerSet;
use crate::model::record::SessionTiming;
use crate::time::iso_timestamp;

/// Body of the final submission request.
///
/// Answers are flattened next to the session metadata, so the wire shape is
/// one flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    #[serde(flatten)]
    pub answers: AnswerSet,
    pub submission_time: String,
    pub user_agent: String,
    pub page_load_time: i64,
    pub response_start_time: String,
    pub response_duration: i64,
    pub last_updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey_token: Option<String>,
}

impl SubmissionPayload {
    /// Assemble a payload at `now`.
    ///
    /// `last_updated` falls back to `now` when the answers were never autosaved.
    #[must_use]
    pub fn assemble(
        answers: AnswerSet,
        timing: &SessionTiming,
        last_updated: Option<DateTime<Utc>>,
        user_agent: impl Into<String>,
        survey_token: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            answers,
            submission_time: iso_timestamp(now),
            user_agent: user_agent.into(),
            page_load_time: now.timestamp_millis(),
            response_start_time: timing.start_time_entry(),
            response_duration: timing.duration_millis(now),
            last_updated: iso_timestamp(last_updated.unwrap_or(now)),
            survey_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn payload_is_flat_json_with_metadata() {
        let timing = SessionTiming::starting_at(fixed_now());
        let now = fixed_now() + Duration::minutes(20);
        let answers: AnswerSet = [("overall_satisfaction", "満足している")]
            .into_iter()
            .collect();

        let payload = SubmissionPayload::assemble(
            answers,
            &timing,
            None,
            "survey-desktop/0.1",
            Some("tok".into()),
            now,
        );
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["overall_satisfaction"], "満足している");
        assert_eq!(value["response_duration"], 1_200_000);
        assert_eq!(value["response_start_time"], "2023-11-14T22:13:20.000Z");
        assert_eq!(value["submission_time"], "2023-11-14T22:33:20.000Z");
        assert_eq!(value["last_updated"], "2023-11-14T22:33:20.000Z");
        assert_eq!(value["user_agent"], "survey-desktop/0.1");
        assert_eq!(value["survey_token"], "tok");
    }

    #[test]
    fn token_is_omitted_when_absent() {
        let timing = SessionTiming::starting_at(fixed_now());
        let payload = SubmissionPayload::assemble(
            AnswerSet::new(),
            &timing,
            Some(fixed_now()),
            "ua",
            None,
            fixed_now(),
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("survey_token").is_none());
    }
}
