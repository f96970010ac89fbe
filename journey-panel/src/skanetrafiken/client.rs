//! Journey planner HTTP client.
//!
//! Queries the Skånetrafiken journey endpoint for trips between two stop
//! areas and returns the raw journey records.

use std::future::Future;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue};

use super::error::JourneyError;
use super::types::{JourneyResponse, RawJourney};

/// Default base URL for the journey API.
const DEFAULT_BASE_URL: &str = "https://www.skanetrafiken.se/gw-tps/api/v2";

/// Number of journeys requested after "now".
const JOURNEYS_AFTER: u8 = 6;

/// Source of raw journey records between two stops.
///
/// This abstraction allows the controller to be tested with canned data.
pub trait JourneySource {
    /// Fetch upcoming journeys from `from_id` to `to_id`.
    fn fetch_journeys(
        &self,
        from_id: &str,
        to_id: &str,
    ) -> impl Future<Output = Result<Vec<RawJourney>, JourneyError>>;
}

/// Configuration for the journey client.
#[derive(Debug, Clone)]
pub struct JourneyClientConfig {
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl JourneyClientConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for JourneyClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Journey API client.
#[derive(Debug, Clone)]
pub struct JourneyClient {
    http: reqwest::Client,
    base_url: String,
}

impl JourneyClient {
    /// Create a new client with the given configuration.
    pub fn new(config: JourneyClientConfig) -> Result<Self, JourneyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("sv-SE"));
        // The API routes requests by search engine environment
        headers.insert(
            HeaderName::from_static("search-engine-environment"),
            HeaderValue::from_static("TjP"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Get journeys from one stop area to another.
    pub async fn get_journeys(
        &self,
        from_id: &str,
        to_id: &str,
    ) -> Result<Vec<RawJourney>, JourneyError> {
        let url = format!("{}/Journey", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&journey_query(from_id, to_id))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(JourneyError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JourneyError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let parsed: JourneyResponse =
            serde_json::from_str(&body).map_err(|e| JourneyError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        Ok(parsed.journeys)
    }
}

impl JourneySource for JourneyClient {
    async fn fetch_journeys(
        &self,
        from_id: &str,
        to_id: &str,
    ) -> Result<Vec<RawJourney>, JourneyError> {
        self.get_journeys(from_id, to_id).await
    }
}

/// Query parameters for a stop-area to stop-area search departing now.
fn journey_query(from_id: &str, to_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("fromPointId", from_id.to_string()),
        ("fromPointType", "STOP_AREA".to_string()),
        ("toPointId", to_id.to_string()),
        ("toPointType", "STOP_AREA".to_string()),
        ("arrival", "false".to_string()),
        ("priority", "SHORTEST_TIME".to_string()),
        ("journeysAfter", JOURNEYS_AFTER.to_string()),
        ("walkSpeed", "NORMAL".to_string()),
        ("maxWalkDistance", "2000".to_string()),
        ("allowWalkToOtherStop", "true".to_string()),
    ]
}
