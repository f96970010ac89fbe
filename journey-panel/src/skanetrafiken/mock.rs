//! Mock journey source for running without API access.
//!
//! Loads canned journey responses from JSON files and serves them as if
//! they were live API responses.

use std::collections::HashMap;
use std::path::Path;

use super::client::JourneySource;
use super::error::JourneyError;
use super::types::{JourneyResponse, RawJourney};

/// Canned outcome for one route.
#[derive(Debug, Clone)]
enum Canned {
    Journeys(Vec<RawJourney>),
    Status(u16),
}

/// Mock journey source keyed by (origin id, destination id).
#[derive(Debug, Clone, Default)]
pub struct MockJourneySource {
    routes: HashMap<(String, String), Canned>,
}

impl MockJourneySource {
    /// Create an empty mock; every route returns [`JourneyError::NoData`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Load canned responses from a directory.
    ///
    /// Expects files named `{from}-{to}.json` containing a journey API
    /// response body.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, JourneyError> {
        let data_dir = data_dir.as_ref();
        let mut mock = Self::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| JourneyError::ApiError {
            status: 0,
            message: format!("Failed to read mock data directory: {}", e),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| JourneyError::ApiError {
                status: 0,
                message: format!("Failed to read directory entry: {}", e),
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let Some((from, to)) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|stem| stem.split_once('-'))
            else {
                continue;
            };

            let json = std::fs::read_to_string(&path).map_err(|e| JourneyError::ApiError {
                status: 0,
                message: format!("Failed to read {:?}: {}", path, e),
            })?;

            let response: JourneyResponse =
                serde_json::from_str(&json).map_err(|e| JourneyError::Json {
                    message: format!("{:?}: {}", path, e),
                    body: None,
                })?;

            mock = mock.with_journeys(from, to, response.journeys);
        }

        Ok(mock)
    }

    /// Serve `journeys` for the route.
    pub fn with_journeys(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        journeys: Vec<RawJourney>,
    ) -> Self {
        self.routes
            .insert((from.into(), to.into()), Canned::Journeys(journeys));
        self
    }

    /// Fail the route with an HTTP status.
    pub fn with_status(mut self, from: impl Into<String>, to: impl Into<String>, status: u16) -> Self {
        self.routes
            .insert((from.into(), to.into()), Canned::Status(status));
        self
    }

    /// Number of routes with canned data.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl JourneySource for MockJourneySource {
    async fn fetch_journeys(
        &self,
        from_id: &str,
        to_id: &str,
    ) -> Result<Vec<RawJourney>, JourneyError> {
        match self.routes.get(&(from_id.to_string(), to_id.to_string())) {
            Some(Canned::Journeys(journeys)) => Ok(journeys.clone()),
            Some(Canned::Status(status)) => Err(JourneyError::ApiError {
                status: *status,
                message: "mock failure".to_string(),
            }),
            None => Err(JourneyError::NoData {
                from: from_id.to_string(),
                to: to_id.to_string(),
            }),
        }
    }
}
