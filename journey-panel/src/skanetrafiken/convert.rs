//! Conversion from journey API DTOs to domain types.
//!
//! Handles timezone conversion of the UTC timestamps, cancellation flags and
//! the "is it still worth showing" filter.

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;
use tracing::debug;

use crate::domain::{
    ArrivalTime, CANCELLED, ClockTime, JourneyRecord, is_at_least_minutes_ahead, to_local,
};

use super::types::RawJourney;

/// Deviation tag text the API uses for cancelled journeys.
pub const CANCELLED_TAG: &str = "INSTÄLLD";

/// Default minimum lead time for a departure to be listed.
pub const DEFAULT_MIN_MINUTES_AHEAD: i64 = 5;

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The departure itself is marked as cancelled
    #[error("departure is cancelled")]
    DepartureCancelled,

    /// Failed to find a time in a timestamp
    #[error("invalid time: {0}")]
    InvalidTime(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Timezones and date used to interpret API timestamps.
#[derive(Debug, Clone, Copy)]
pub struct ConversionContext {
    /// Zone the API reports times in.
    pub source_tz: Tz,
    /// Zone the panel displays times in.
    pub local_tz: Tz,
    /// Today's date in the source zone.
    pub date: NaiveDate,
}

impl ConversionContext {
    /// Build a context for "now", taking today's date in the source zone.
    pub fn at<Z: TimeZone>(now: &DateTime<Z>, source_tz: Tz, local_tz: Tz) -> Self {
        Self {
            source_tz,
            local_tz,
            date: now.with_timezone(&source_tz).date_naive(),
        }
    }

    fn localize(&self, timestamp: &str) -> Result<ClockTime, ConversionError> {
        let time = ClockTime::extract(timestamp)
            .ok_or_else(|| ConversionError::InvalidTime(timestamp.to_string()))?;
        Ok(to_local(time, self.date, &self.source_tz, &self.local_tz))
    }

    /// Like `localize`, but keeps unreadable input as text.
    fn localize_or_raw(&self, timestamp: &str) -> ArrivalTime {
        match self.localize(timestamp) {
            Ok(time) => ArrivalTime::At(time),
            Err(_) => ArrivalTime::Raw(timestamp.to_string()),
        }
    }
}

/// Convert one raw journey into a [`JourneyRecord`].
pub fn normalize(raw: &RawJourney, ctx: &ConversionContext) -> Result<JourneyRecord, ConversionError> {
    let link = raw
        .route_links
        .first()
        .ok_or(ConversionError::MissingField("routeLinks[0]"))?;

    if link.from.time == CANCELLED {
        return Err(ConversionError::DepartureCancelled);
    }

    let departure = ctx.localize(&link.from.time)?;
    let delay = link.from.deviation.as_ref().and_then(parse_deviation);

    let cancelled = raw
        .deviation_tag
        .as_ref()
        .and_then(|tag| tag.text.as_deref())
        == Some(CANCELLED_TAG);

    if cancelled {
        return Ok(JourneyRecord::cancelled(departure, delay));
    }

    let arrival = ctx.localize_or_raw(&link.to.time);
    let track = link
        .from
        .pos
        .as_deref()
        .ok_or(ConversionError::MissingField("routeLinks[0].from.pos"))?;

    Ok(JourneyRecord::running(departure, arrival, track, delay))
}

/// Read a deviation as whole minutes.
fn parse_deviation(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().trim_start_matches('+').parse().ok(),
        _ => None,
    }
}

/// Convert all raw journeys, skipping the ones that cannot be shown.
pub fn convert_journeys(raw: &[RawJourney], ctx: &ConversionContext) -> Vec<JourneyRecord> {
    raw.iter()
        .filter_map(|journey| match normalize(journey, ctx) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "skipping journey");
                None
            }
        })
        .collect()
}

/// Keep journeys departing more than `min_minutes_ahead` after `now`, in
/// departure order.
///
/// Cancelled journeys are kept so the panel can mark them.
pub fn filter_and_sort<Z: TimeZone>(
    records: Vec<JourneyRecord>,
    now: &DateTime<Z>,
    min_minutes_ahead: i64,
) -> Vec<JourneyRecord> {
    let mut upcoming: Vec<JourneyRecord> = records
        .into_iter()
        .filter(|r| is_at_least_minutes_ahead(r.departure(), now, min_minutes_ahead))
        .collect();
    upcoming.sort_by_key(|r| r.departure());
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skanetrafiken::types::{DeviationTag, RouteLink, RoutePoint};
    use chrono_tz::Etc::GMTMinus1;
    use proptest::prelude::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    /// UTC source, UTC+1 panel, on a fixed date.
    fn ctx() -> ConversionContext {
        ConversionContext {
            source_tz: chrono_tz::UTC,
            local_tz: GMTMinus1,
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        }
    }

    fn now_local(h: u32, m: u32) -> DateTime<Tz> {
        GMTMinus1.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap()
    }

    fn make_raw(from: &str, to: &str, pos: Option<&str>) -> RawJourney {
        RawJourney {
            route_links: vec![RouteLink {
                from: RoutePoint {
                    time: from.to_string(),
                    deviation: None,
                    pos: pos.map(str::to_string),
                },
                to: RoutePoint {
                    time: to.to_string(),
                    deviation: None,
                    pos: None,
                },
            }],
            deviation_tag: None,
        }
    }

    #[test]
    fn normalize_converts_timezone_and_track() {
        let raw = make_raw("08:00", "08:10", Some("Track 4"));
        let record = normalize(&raw, &ctx()).unwrap();

        assert_eq!(record.departure(), t("09:00"));
        assert_eq!(record.arrival_label(), "09:10");
        assert_eq!(record.track_short(), Some("4"));
        assert!(!record.is_cancelled());
        assert_eq!(record.delay_mins(), None);

        let kept = filter_and_sort(vec![record.clone()], &now_local(7, 0), 5);
        assert_eq!(kept, vec![record]);
    }

    #[test]
    fn normalize_reads_full_timestamps() {
        let raw = make_raw("2024-03-15T08:00:00", "2024-03-15T08:10:00", Some("Läge A"));
        let record = normalize(&raw, &ctx()).unwrap();
        assert_eq!(record.departure(), t("09:00"));
        assert_eq!(record.track_short(), Some("A"));
    }

    #[test]
    fn cancelled_tag_overrides_arrival_and_track() {
        let mut raw = make_raw("08:00", "08:10", Some("Track 4"));
        raw.deviation_tag = Some(DeviationTag {
            text: Some(CANCELLED_TAG.to_string()),
        });

        let record = normalize(&raw, &ctx()).unwrap();

        assert!(record.is_cancelled());
        assert_eq!(record.arrival_label(), CANCELLED);
        assert_eq!(record.track_label(), CANCELLED);
        assert_eq!(record.departure(), t("09:00"));
    }

    #[test]
    fn other_tags_are_not_cancellations() {
        let mut raw = make_raw("08:00", "08:10", Some("Track 4"));
        raw.deviation_tag = Some(DeviationTag {
            text: Some("FÖRSENAD".to_string()),
        });
        assert!(!normalize(&raw, &ctx()).unwrap().is_cancelled());
    }

    #[test]
    fn deviation_as_number_or_string() {
        let mut raw = make_raw("08:00", "08:10", Some("1"));
        raw.route_links[0].from.deviation = Some(serde_json::json!(4));
        assert_eq!(normalize(&raw, &ctx()).unwrap().delay_mins(), Some(4));

        raw.route_links[0].from.deviation = Some(serde_json::json!("+7"));
        assert_eq!(normalize(&raw, &ctx()).unwrap().delay_mins(), Some(7));

        raw.route_links[0].from.deviation = Some(serde_json::json!(null));
        assert_eq!(normalize(&raw, &ctx()).unwrap().delay_mins(), None);
    }

    #[test]
    fn cancelled_departure_is_rejected() {
        let raw = make_raw("Cancelled", "08:10", Some("1"));
        assert_eq!(normalize(&raw, &ctx()), Err(ConversionError::DepartureCancelled));
    }

    #[test]
    fn unparsable_and_incomplete_records_are_rejected() {
        let raw = make_raw("soon", "08:10", Some("1"));
        assert!(matches!(normalize(&raw, &ctx()), Err(ConversionError::InvalidTime(_))));

        let raw = make_raw("08:00", "08:10", None);
        assert_eq!(
            normalize(&raw, &ctx()),
            Err(ConversionError::MissingField("routeLinks[0].from.pos"))
        );

        let raw = RawJourney {
            route_links: vec![],
            deviation_tag: None,
        };
        assert_eq!(
            normalize(&raw, &ctx()),
            Err(ConversionError::MissingField("routeLinks[0]"))
        );
    }

    #[test]
    fn unreadable_arrival_keeps_the_row() {
        let raw = make_raw("2024-03-15T08:00:00", "unknown", Some("Spår 3"));
        let record = normalize(&raw, &ctx()).unwrap();

        assert_eq!(record.departure(), t("09:00"));
        assert_eq!(record.arrival_label(), "unknown");
        assert_eq!(record.track_short(), Some("3"));
        assert_eq!(convert_journeys(&[raw], &ctx()).len(), 1);
    }

    #[test]
    fn convert_skips_bad_records() {
        let raws = vec![
            make_raw("08:00", "08:10", Some("1")),
            make_raw("Cancelled", "08:10", Some("1")),
            make_raw("08:30", "08:40", Some("2")),
        ];
        let records = convert_journeys(&raws, &ctx());
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn filter_drops_imminent_and_sorts() {
        let records = vec![
            JourneyRecord::running(t("07:30"), t("07:40"), "1", None),
            JourneyRecord::running(t("07:04"), t("07:14"), "1", None),
            JourneyRecord::cancelled(t("07:20"), None),
            JourneyRecord::running(t("06:50"), t("07:00"), "1", None),
        ];

        let kept = filter_and_sort(records, &now_local(7, 0), DEFAULT_MIN_MINUTES_AHEAD);
        let departures: Vec<_> = kept.iter().map(|r| r.departure().to_string()).collect();

        assert_eq!(departures, vec!["07:20", "07:30"]);
        assert!(kept[0].is_cancelled());
    }

    fn record_strategy() -> impl Strategy<Value = JourneyRecord> {
        (0u32..24, 0u32..60, any::<bool>()).prop_map(|(h, m, cancelled)| {
            let dep = ClockTime::new(h, m).unwrap();
            if cancelled {
                JourneyRecord::cancelled(dep, None)
            } else {
                JourneyRecord::running(dep, dep, "Spår 1", None)
            }
        })
    }

    proptest! {
        #[test]
        fn filter_and_sort_is_idempotent(
            records in prop::collection::vec(record_strategy(), 0..20),
            h in 0u32..24,
            m in 0u32..60,
        ) {
            let now = now_local(h, m);
            let once = filter_and_sort(records, &now, DEFAULT_MIN_MINUTES_AHEAD);
            let twice = filter_and_sort(once.clone(), &now, DEFAULT_MIN_MINUTES_AHEAD);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn filter_and_sort_output_is_sorted(
            records in prop::collection::vec(record_strategy(), 0..20),
        ) {
            let sorted = filter_and_sort(records, &now_local(7, 0), DEFAULT_MIN_MINUTES_AHEAD);
            for pair in sorted.windows(2) {
                prop_assert!(pair[0].departure() <= pair[1].departure());
            }
        }

        #[test]
        fn cancellation_invariant(h in 0u32..24, m in 0u32..60, tagged in any::<bool>()) {
            let time = format!("{h:02}:{m:02}");
            let mut raw = make_raw(&time, &time, Some("Spår 2"));
            if tagged {
                raw.deviation_tag = Some(DeviationTag { text: Some(CANCELLED_TAG.to_string()) });
            }
            let record = normalize(&raw, &ctx()).unwrap();
            let labels_cancelled =
                record.arrival_label() == CANCELLED && record.track_label() == CANCELLED;
            prop_assert_eq!(record.is_cancelled(), labels_cancelled);
            prop_assert_eq!(record.is_cancelled(), tagged);
        }
    }
}
