use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use survey_core::model::SubmissionPayload;
use tracing::{debug, info};
use url::Url;

use crate::api::{endpoint, parse_base_url};
use crate::error::SubmissionError;

/// Client string sent as `user_agent` when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("survey-desktop/", env!("CARGO_PKG_VERSION"));

const SUBMIT_PATH: &str = "api/submit";

/// Where and as whom completed surveys are sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitConfig {
    base_url: Url,
    user_agent: String,
    survey_token: Option<String>,
}

impl SubmitConfig {
    /// # Errors
    ///
    /// Returns `SubmissionError::BaseUrl` if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, SubmissionError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            survey_token: None,
        })
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        if !user_agent.trim().is_empty() {
            self.user_agent = user_agent;
        }
        self
    }

    /// Attach the token of the survey URL the respondent was invited through.
    #[must_use]
    pub fn with_survey_token(mut self, token: Option<String>) -> Self {
        self.survey_token = token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn survey_token(&self) -> Option<&str> {
        self.survey_token.as_deref()
    }
}

/// What the survey API answered for an accepted submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(default)]
    pub response_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Sends a finished survey to the remote API.
#[async_trait]
pub trait SurveySubmitter: Send + Sync {
    /// Send `payload`; any transport error or non-2xx status is a failure.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError` when the request cannot be completed or the
    /// API does not accept it.
    async fn submit(&self, payload: &SubmissionPayload)
    -> Result<SubmissionReceipt, SubmissionError>;
}

/// `SurveySubmitter` that POSTs JSON to `{base_url}/api/submit`.
#[derive(Clone)]
pub struct HttpSurveySubmitter {
    client: Client,
    endpoint: Url,
}

impl HttpSurveySubmitter {
    /// # Errors
    ///
    /// Returns `SubmissionError::BaseUrl` if the endpoint cannot be derived.
    pub fn new(config: &SubmitConfig) -> Result<Self, SubmissionError> {
        Ok(Self {
            client: Client::new(),
            endpoint: endpoint(config.base_url(), SUBMIT_PATH)?,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    response_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

#[async_trait]
impl SurveySubmitter for HttpSurveySubmitter {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        debug!(endpoint = %self.endpoint, answers = payload.answers.len(), "posting survey");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SubmissionError::HttpStatus(response.status()));
        }

        let body: SubmitResponse = response.json().await?;
        if !body.success {
            let reason = body
                .error
                .or(body.message)
                .unwrap_or_else(|| "unknown reason".to_string());
            return Err(SubmissionError::Rejected(reason));
        }

        info!(response_id = ?body.response_id, "survey accepted");
        Ok(SubmissionReceipt {
            response_id: body.response_id,
            message: body.message,
        })
    }
}
