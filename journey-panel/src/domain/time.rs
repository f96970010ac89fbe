//! Time-of-day handling for journey data.
//!
//! The journey API provides times as "HH:MM" fragments inside longer
//! timestamps, always in the source timezone (UTC). This module provides a
//! small value type for those times plus the timezone arithmetic needed to
//! show them on the panel and decide whether a departure is still worth
//! listing.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike};
use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock time of day with minute resolution.
///
/// Ordering is by hour then minute, which is the same as lexical ordering of
/// the "HH:MM" form.
///
/// # Examples
///
/// ```
/// use journey_panel::domain::ClockTime;
///
/// let time = ClockTime::parse_hhmm("08:05").unwrap();
/// assert_eq!(time.to_string(), "08:05");
/// assert!(time < ClockTime::parse_hhmm("10:00").unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Create a time from hour and minute, if both are in range.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Parse a time from exactly "HH:MM".
    ///
    /// # Examples
    ///
    /// ```
    /// use journey_panel::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse_hhmm("00:00").is_ok());
    /// assert!(ClockTime::parse_hhmm("23:59").is_ok());
    ///
    /// assert!(ClockTime::parse_hhmm("1430").is_err());
    /// assert!(ClockTime::parse_hhmm("14:3").is_err());
    /// assert!(ClockTime::parse_hhmm("25:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Self::new(hour, minute).ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Find the first valid "HH:MM" fragment inside a longer string.
    ///
    /// The journey API sends full timestamps such as `2024-05-02T08:00:00`;
    /// only the time of day is of interest.
    ///
    /// ```
    /// use journey_panel::domain::ClockTime;
    ///
    /// let t = ClockTime::extract("2024-05-02T08:17:00").unwrap();
    /// assert_eq!(t.to_string(), "08:17");
    /// assert!(ClockTime::extract("soon").is_none());
    /// ```
    pub fn extract(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() < 5 {
            return None;
        }
        (0..=bytes.len() - 5).find_map(|start| {
            let window = &bytes[start..start + 5];
            if window[2] != b':' {
                return None;
            }
            let hour = parse_two_digits(&window[0..2])?;
            let minute = parse_two_digits(&window[3..5])?;
            Self::new(hour, minute)
        })
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.hour as u32
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.minute as u32
    }

    /// Converts to a NaiveTime.
    pub fn to_naive(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }

    /// Minutes since midnight.
    pub fn minutes_from_midnight(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour, self.minute)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// How far in the past a time may be before it is read as tomorrow's.
const ROLLOVER_GRACE_HOURS: i64 = 1;

/// Convert a time of day on `date` in `source` to the time of day in `local`.
///
/// If the time does not exist in the source zone (a DST gap), the input is
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use journey_panel::domain::{ClockTime, to_local};
/// use chrono::NaiveDate;
/// use chrono_tz::{Europe::Stockholm, UTC};
///
/// let winter = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let t = ClockTime::parse_hhmm("08:00").unwrap();
/// assert_eq!(to_local(t, winter, &UTC, &Stockholm).to_string(), "09:00");
/// ```
pub fn to_local<S, L>(time: ClockTime, date: NaiveDate, source: &S, local: &L) -> ClockTime
where
    S: TimeZone,
    L: TimeZone,
{
    match source
        .from_local_datetime(&date.and_time(time.to_naive()))
        .earliest()
    {
        Some(at_source) => ClockTime::from(at_source.with_timezone(local).time()),
        None => time,
    }
}

/// String form of [`to_local`]: unparsable input is returned unchanged.
pub fn to_local_str<S, L>(time: &str, date: NaiveDate, source: &S, local: &L) -> String
where
    S: TimeZone,
    L: TimeZone,
{
    match ClockTime::parse_hhmm(time) {
        Ok(parsed) => to_local(parsed, date, source, local).to_string(),
        Err(_) => time.to_string(),
    }
}

/// Whether `time` (already in `now`'s zone) is strictly more than
/// `min_minutes` after `now`.
///
/// The candidate is placed on `now`'s date. A candidate more than one hour
/// in the past is taken to be tomorrow's, so a departure at 00:05 seen at
/// 23:58 counts as seven minutes away.
///
/// ```
/// use journey_panel::domain::{ClockTime, is_at_least_minutes_ahead};
/// use chrono::TimeZone;
/// use chrono_tz::Europe::Stockholm;
///
/// let now = Stockholm.with_ymd_and_hms(2024, 1, 15, 23, 58, 0).unwrap();
/// let t = ClockTime::parse_hhmm("00:05").unwrap();
/// assert!(is_at_least_minutes_ahead(t, &now, 5));
/// ```
pub fn is_at_least_minutes_ahead<Tz: TimeZone>(
    time: ClockTime,
    now: &DateTime<Tz>,
    min_minutes: i64,
) -> bool {
    let tz = now.timezone();
    let Some(mut candidate) = tz
        .from_local_datetime(&now.date_naive().and_time(time.to_naive()))
        .earliest()
    else {
        return false;
    };

    if candidate < now.clone() - Duration::hours(ROLLOVER_GRACE_HOURS) {
        candidate = candidate + Duration::days(1);
    }

    candidate > now.clone() + Duration::minutes(min_minutes)
}
