//! Skånetrafiken journey planner client.
//!
//! This module provides an HTTP client for the public journey-planning API
//! and the conversion of its responses into [`JourneyRecord`]s.
//!
//! Key characteristics of the API:
//! - Times are full timestamps in UTC; only the time of day is shown
//! - Cancelled journeys are still listed, tagged with `INSTÄLLD`
//! - Only the first route link of a journey is relevant for the panel
//!
//! [`JourneyRecord`]: crate::domain::JourneyRecord

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{JourneyClient, JourneyClientConfig, JourneySource};
pub use convert::{
    CANCELLED_TAG, ConversionContext, ConversionError, DEFAULT_MIN_MINUTES_AHEAD,
    convert_journeys, filter_and_sort, normalize,
};
pub use error::JourneyError;
pub use mock::MockJourneySource;
pub use types::{DeviationTag, JourneyResponse, RawJourney, RouteLink, RoutePoint};
