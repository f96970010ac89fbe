//! Normalized journey records.

use std::fmt;

use super::ClockTime;

/// Label shown in place of arrival and track for cancelled journeys.
pub const CANCELLED: &str = "Cancelled";

/// Arrival as shown on the panel.
///
/// An arrival the API sent in a form without a readable time of day is kept
/// as the original text rather than dropping the journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrivalTime {
    At(ClockTime),
    Raw(String),
}

impl From<ClockTime> for ArrivalTime {
    fn from(time: ClockTime) -> Self {
        ArrivalTime::At(time)
    }
}

impl fmt::Display for ArrivalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrivalTime::At(time) => write!(f, "{time}"),
            ArrivalTime::Raw(text) => f.write_str(text),
        }
    }
}

/// Whether a journey is running, and where to board it if so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyStatus {
    Running { arrival: ArrivalTime, track: String },
    Cancelled,
}

/// One departure/arrival entry after timezone conversion.
///
/// Cancelled journeys carry no arrival time or track; both read as
/// [`CANCELLED`] through the label accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyRecord {
    departure: ClockTime,
    status: JourneyStatus,
    delay_mins: Option<i64>,
}

impl JourneyRecord {
    /// A journey that is running as planned or with a delay.
    pub fn running(
        departure: ClockTime,
        arrival: impl Into<ArrivalTime>,
        track: impl Into<String>,
        delay_mins: Option<i64>,
    ) -> Self {
        Self {
            departure,
            status: JourneyStatus::Running {
                arrival: arrival.into(),
                track: track.into(),
            },
            delay_mins,
        }
    }

    /// A cancelled journey.
    pub fn cancelled(departure: ClockTime, delay_mins: Option<i64>) -> Self {
        Self {
            departure,
            status: JourneyStatus::Cancelled,
            delay_mins,
        }
    }

    pub fn departure(&self) -> ClockTime {
        self.departure
    }

    pub fn status(&self) -> &JourneyStatus {
        &self.status
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, JourneyStatus::Cancelled)
    }

    /// Reported deviation in minutes, as sent by the API.
    pub fn delay_mins(&self) -> Option<i64> {
        self.delay_mins
    }

    /// Whether the journey should be flagged as delayed.
    ///
    /// A zero deviation is reported by the API for on-time departures.
    /// Cancelled journeys are never flagged.
    pub fn is_delayed(&self) -> bool {
        !self.is_cancelled() && self.delay_mins.is_some_and(|d| d != 0)
    }

    /// Arrival time as shown on the panel.
    pub fn arrival_label(&self) -> String {
        match &self.status {
            JourneyStatus::Running { arrival, .. } => arrival.to_string(),
            JourneyStatus::Cancelled => CANCELLED.to_string(),
        }
    }

    /// Track as sent by the API, e.g. "Läge 4", or [`CANCELLED`].
    pub fn track_label(&self) -> &str {
        match &self.status {
            JourneyStatus::Running { track, .. } => track,
            JourneyStatus::Cancelled => CANCELLED,
        }
    }

    /// Short track designation: the last whitespace-separated token.
    pub fn track_short(&self) -> Option<&str> {
        match &self.status {
            JourneyStatus::Running { track, .. } => track.split_whitespace().last(),
            JourneyStatus::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    #[test]
    fn cancelled_labels() {
        let j = JourneyRecord::cancelled(t("08:00"), None);
        assert!(j.is_cancelled());
        assert_eq!(j.arrival_label(), CANCELLED);
        assert_eq!(j.track_label(), CANCELLED);
        assert_eq!(j.track_short(), None);
    }

    #[test]
    fn running_labels() {
        let j = JourneyRecord::running(t("09:00"), t("09:10"), "Track 4", None);
        assert!(!j.is_cancelled());
        assert_eq!(j.arrival_label(), "09:10");
        assert_eq!(j.track_label(), "Track 4");
        assert_eq!(j.track_short(), Some("4"));
    }

    #[test]
    fn zero_deviation_is_not_a_delay() {
        let on_time = JourneyRecord::running(t("09:00"), t("09:10"), "A", Some(0));
        let late = JourneyRecord::running(t("09:00"), t("09:10"), "A", Some(3));
        assert!(!on_time.is_delayed());
        assert!(late.is_delayed());
        assert_eq!(late.delay_mins(), Some(3));
    }

    #[test]
    fn cancelled_is_never_delayed() {
        let j = JourneyRecord::cancelled(t("08:00"), Some(4));
        assert!(!j.is_delayed());
        assert_eq!(j.delay_mins(), Some(4));
    }

    #[test]
    fn raw_arrival_is_shown_verbatim() {
        let j = JourneyRecord::running(t("08:00"), ArrivalTime::Raw("unknown".into()), "Spår 1", None);
        assert_eq!(j.arrival_label(), "unknown");
        assert!(matches!(
            j.status(),
            JourneyStatus::Running { arrival: ArrivalTime::Raw(_), .. }
        ));
    }
}
