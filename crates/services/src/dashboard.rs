//! Read and manage survey results through the survey API.
//!
//! Every dashboard role (administrator, operator, company) talks to the same
//! endpoints, so one client serves them all.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::api::{endpoint, parse_base_url};
use crate::error::DashboardError;

/// Aggregate figures returned by `GET /api/statistics`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub total_responses: u64,
    pub completion_rate: f64,
    pub avg_satisfaction: f64,
    pub nps_score: f64,
    pub department_data: Vec<DepartmentStat>,
    pub category_satisfaction: Vec<CategoryStat>,
    /// Respondent counts for overall satisfaction scores 1 through 5.
    pub satisfaction_distribution: Vec<u64>,
    /// Responses per day over the last seven days, oldest first.
    pub response_trend: Vec<u64>,
}

impl Statistics {
    /// Share of each satisfaction score in percent, rounded half up.
    #[must_use]
    pub fn distribution_percentages(&self) -> Vec<u8> {
        let total: u64 = self.satisfaction_distribution.iter().sum();
        self.satisfaction_distribution
            .iter()
            .map(|count| {
                if total == 0 {
                    return 0;
                }
                let rounded = (200 * count + total) / (2 * total);
                u8::try_from(rounded).unwrap_or(100)
            })
            .collect()
    }

    /// The largest single-day response count, used to scale trend bars.
    #[must_use]
    pub fn trend_peak(&self) -> u64 {
        self.response_trend.iter().copied().max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepartmentStat {
    pub department: String,
    pub satisfaction: f64,
    pub responses: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryStat {
    pub category: String,
    pub satisfaction: f64,
    pub expectation: f64,
}

/// CSV export returned by `GET /api/export`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExportBundle {
    pub data: String,
    pub count: u64,
}

/// One survey URL token as listed by `GET /api/tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SurveyToken {
    pub token: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    pub max_responses: u32,
    #[serde(default)]
    pub current_responses: u32,
    pub is_active: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl SurveyToken {
    #[must_use]
    pub fn remaining_responses(&self) -> u32 {
        self.max_responses.saturating_sub(self.current_responses)
    }

    /// Active and not yet at its response limit.
    #[must_use]
    pub fn accepts_responses(&self) -> bool {
        self.is_active && self.remaining_responses() > 0
    }
}

/// Request body of `POST /api/tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSurveyToken {
    pub max_responses: u32,
    pub description: String,
    pub expires_hours: u32,
}

impl Default for NewSurveyToken {
    fn default() -> Self {
        Self {
            max_responses: 1,
            description: String::new(),
            expires_hours: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedSurveyToken {
    pub token: String,
    pub survey_url: String,
    pub max_responses: u32,
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Deserialize)]
struct TokenList {
    #[serde(default)]
    tokens: Vec<SurveyToken>,
}

#[derive(Debug, Deserialize)]
struct Empty {}

fn default_success() -> bool {
    true
}

#[derive(Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl DashboardClient {
    /// # Errors
    ///
    /// Returns `DashboardError::BaseUrl` if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, DashboardError> {
        Ok(Self {
            client: Client::new(),
            base_url: parse_base_url(base_url)?,
            auth_token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|token| !token.trim().is_empty());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// # Errors
    ///
    /// Returns `DashboardError` if the request fails or the body is malformed.
    pub async fn statistics(&self) -> Result<Statistics, DashboardError> {
        let url = endpoint(&self.base_url, "api/statistics")?;
        self.send(self.client.get(url)).await
    }

    /// # Errors
    ///
    /// Returns `DashboardError` if the request fails or is rejected.
    pub async fn export(&self) -> Result<ExportBundle, DashboardError> {
        let url = endpoint(&self.base_url, "api/export")?;
        let envelope: Envelope<ExportBundle> = self.send(self.client.get(url)).await?;
        accepted(envelope)
    }

    /// # Errors
    ///
    /// Returns `DashboardError` if the request fails or is rejected.
    pub async fn list_tokens(&self) -> Result<Vec<SurveyToken>, DashboardError> {
        let url = endpoint(&self.base_url, "api/tokens")?;
        let envelope: Envelope<TokenList> = self.send(self.client.get(url)).await?;
        Ok(accepted(envelope)?.tokens)
    }

    /// # Errors
    ///
    /// Returns `DashboardError` if the request fails or is rejected.
    pub async fn create_token(
        &self,
        request: &NewSurveyToken,
    ) -> Result<CreatedSurveyToken, DashboardError> {
        let url = endpoint(&self.base_url, "api/tokens")?;
        let envelope: Envelope<CreatedSurveyToken> =
            self.send(self.client.post(url).json(request)).await?;
        accepted(envelope)
    }

    /// Deactivate a survey URL token.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::TokenNotFound` for unknown tokens, or other
    /// request failures.
    pub async fn disable_token(&self, token: &str) -> Result<(), DashboardError> {
        let mut url = endpoint(&self.base_url, "api/tokens/")?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(token);
        }
        let response = self.execute(self.client.delete(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(DashboardError::TokenNotFound);
        }
        let envelope: Envelope<Empty> = decode(response).await?;
        accepted(envelope).map(|_| ())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DashboardError> {
        let response = self.execute(request).await?;
        decode(response).await
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, DashboardError> {
        let request = match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        debug!(url = %response.url(), status = %response.status(), "dashboard response");
        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DashboardError> {
    let status = response.status();
    if !status.is_success() {
        return Err(DashboardError::HttpStatus(status));
    }
    Ok(response.json().await?)
}

fn accepted<T>(envelope: Envelope<T>) -> Result<T, DashboardError> {
    if envelope.success {
        Ok(envelope.body)
    } else {
        Err(DashboardError::Rejected)
    }
}
