//! Journey API client error types.

use std::fmt;

/// Errors from the journey API client.
#[derive(Debug)]
pub enum JourneyError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    ApiError { status: u16, message: String },

    /// Rate limited by the API
    RateLimited,

    /// No canned response for a route (mock source only)
    NoData { from: String, to: String },
}

impl fmt::Display for JourneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JourneyError::Http(e) => write!(f, "HTTP error: {e}"),
            JourneyError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            JourneyError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            JourneyError::RateLimited => write!(f, "rate limited by journey API"),
            JourneyError::NoData { from, to } => {
                write!(f, "no journey data for {from} -> {to}")
            }
        }
    }
}

impl std::error::Error for JourneyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JourneyError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for JourneyError {
    fn from(err: reqwest::Error) -> Self {
        JourneyError::Http(err)
    }
}
