//! Journey API response DTOs.
//!
//! These types map directly to the Skånetrafiken journey endpoint's JSON.
//! Only the fields the panel reads are modelled; everything else is ignored
//! by serde.

use serde::Deserialize;

/// Response from `GET /Journey`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResponse {
    /// Suggested journeys, earliest first. Missing when nothing was found.
    #[serde(default)]
    pub journeys: Vec<RawJourney>,
}

/// One suggested journey from origin to destination.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJourney {
    /// Legs of the journey. Only the first leg is shown on the panel.
    #[serde(default)]
    pub route_links: Vec<RouteLink>,

    /// Disruption tag, e.g. `{"text": "INSTÄLLD"}` for cancelled journeys.
    pub deviation_tag: Option<DeviationTag>,
}

/// A single leg of a journey.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLink {
    pub from: RoutePoint,
    pub to: RoutePoint,
}

/// Departure or arrival end of a leg.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    /// Timestamp in UTC, e.g. "2024-05-02T06:12:00".
    pub time: String,

    /// Deviation from the timetable in minutes. Sent as a number, sometimes
    /// as a numeric string.
    pub deviation: Option<serde_json::Value>,

    /// Stop position, e.g. "Läge A" or "Spår 4".
    pub pos: Option<String>,
}

/// Disruption tag attached to a journey.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviationTag {
    pub text: Option<String>,
}
