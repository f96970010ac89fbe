//! Display mode scheduling.
//!
//! The panel's behaviour is a pure function of the local wall-clock time:
//!
//! | Local time          | Mode     |
//! |---------------------|----------|
//! | 01:00 (that minute) | Shutdown |
//! | 06:00 - 10:00       | Journey  |
//! | 10:00 - 22:00       | Art      |
//! | otherwise           | Sleep    |

use std::fmt;
use std::time::Duration;

use chrono::{NaiveTime, Timelike};

/// What the panel should be showing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    Journey,
    Art,
    Sleep,
    Shutdown,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Journey => "journey",
            DisplayMode::Art => "art",
            DisplayMode::Sleep => "sleep",
            DisplayMode::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minutes from midnight at which the mode can change.
const BOUNDARIES_MINS: [u32; 5] = [60, 61, 6 * 60, 10 * 60, 22 * 60];

const JOURNEY_START_MINS: u32 = 6 * 60;
const ART_START_MINS: u32 = 10 * 60;
const ART_END_MINS: u32 = 22 * 60;
const SHUTDOWN_MINS: u32 = 60;

/// Map a local time of day to the display mode.
pub fn mode_for(now: NaiveTime) -> DisplayMode {
    let mins = now.hour() * 60 + now.minute();

    if mins == SHUTDOWN_MINS {
        return DisplayMode::Shutdown;
    }

    if (JOURNEY_START_MINS..ART_START_MINS).contains(&mins) {
        DisplayMode::Journey
    } else if (ART_START_MINS..ART_END_MINS).contains(&mins) {
        DisplayMode::Art
    } else {
        DisplayMode::Sleep
    }
}

/// How long to wait between polls in a given mode.
pub fn poll_interval(mode: DisplayMode) -> Duration {
    match mode {
        DisplayMode::Journey => Duration::from_secs(30),
        DisplayMode::Art => Duration::from_secs(300),
        DisplayMode::Shutdown => Duration::from_secs(3600),
        DisplayMode::Sleep => Duration::from_secs(300),
    }
}

/// Whether a poll in `mode` has work to do, given the mode of the last
/// successful poll.
///
/// Journey and Shutdown act on every poll; Art and Sleep only on entry.
pub fn needs_redisplay(mode: DisplayMode, previous: Option<DisplayMode>) -> bool {
    match mode {
        DisplayMode::Journey | DisplayMode::Shutdown => true,
        DisplayMode::Art | DisplayMode::Sleep => previous != Some(mode),
    }
}

/// Time from `now` until the next instant at which [`mode_for`] may change.
///
/// The poll loop never sleeps past this, so the one-minute shutdown window
/// and every mode entry are seen on time regardless of the poll interval.
pub fn until_next_boundary(now: NaiveTime) -> Duration {
    let secs_now = now.num_seconds_from_midnight();
    let next = BOUNDARIES_MINS
        .iter()
        .map(|m| m * 60)
        .find(|&b| b > secs_now)
        .unwrap_or(24 * 3600 + BOUNDARIES_MINS[0] * 60);
    Duration::from_secs(u64::from(next - secs_now))
}

/// How long the poll loop should sleep after a poll in `mode` at `now`.
pub fn next_poll_delay(mode: DisplayMode, now: NaiveTime) -> Duration {
    poll_interval(mode).min(until_next_boundary(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn mode_windows() {
        assert_eq!(mode_for(hm(1, 0)), DisplayMode::Shutdown);
        assert_eq!(mode_for(NaiveTime::from_hms_opt(1, 0, 59).unwrap()), DisplayMode::Shutdown);
        assert_eq!(mode_for(hm(1, 1)), DisplayMode::Sleep);
        assert_eq!(mode_for(hm(0, 59)), DisplayMode::Sleep);
        assert_eq!(mode_for(hm(5, 59)), DisplayMode::Sleep);
        assert_eq!(mode_for(hm(6, 0)), DisplayMode::Journey);
        assert_eq!(mode_for(hm(9, 59)), DisplayMode::Journey);
        assert_eq!(mode_for(hm(10, 0)), DisplayMode::Art);
        assert_eq!(mode_for(hm(21, 59)), DisplayMode::Art);
        assert_eq!(mode_for(hm(22, 0)), DisplayMode::Sleep);
    }

    #[test]
    fn poll_intervals() {
        assert_eq!(poll_interval(DisplayMode::Journey), Duration::from_secs(30));
        assert_eq!(poll_interval(DisplayMode::Art), Duration::from_secs(300));
        assert_eq!(poll_interval(DisplayMode::Shutdown), Duration::from_secs(3600));
        assert_eq!(poll_interval(DisplayMode::Sleep), Duration::from_secs(300));
    }

    #[test]
    fn redisplay_rules() {
        use DisplayMode::*;

        assert!(needs_redisplay(Journey, Some(Journey)));
        assert!(needs_redisplay(Shutdown, Some(Shutdown)));
        assert!(needs_redisplay(Art, None));
        assert!(needs_redisplay(Art, Some(Journey)));
        assert!(!needs_redisplay(Art, Some(Art)));
        assert!(needs_redisplay(Sleep, Some(Art)));
        assert!(!needs_redisplay(Sleep, Some(Sleep)));
    }

    #[test]
    fn boundary_delays() {
        assert_eq!(until_next_boundary(hm(0, 58)), Duration::from_secs(120));
        assert_eq!(until_next_boundary(hm(1, 0)), Duration::from_secs(60));
        assert_eq!(until_next_boundary(hm(5, 0)), Duration::from_secs(3600));
        // After the last boundary of the day, wrap to tomorrow's 01:00
        assert_eq!(until_next_boundary(hm(23, 0)), Duration::from_secs(2 * 3600));
    }

    #[test]
    fn sleep_before_shutdown_wakes_on_time() {
        // A sleep-mode poll at 00:58 would normally wait five minutes
        let delay = next_poll_delay(DisplayMode::Sleep, hm(0, 58));
        assert_eq!(delay, Duration::from_secs(120));
        // Shutdown's hour-long interval is cut to the end of its minute
        let delay = next_poll_delay(DisplayMode::Shutdown, hm(1, 0));
        assert_eq!(delay, Duration::from_secs(60));
    }

    proptest! {
        #[test]
        fn mode_matches_windows(secs in 0u32..86_400) {
            let now = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
            let mins = secs / 60;
            let expected = if mins == 60 {
                DisplayMode::Shutdown
            } else if (360..600).contains(&mins) {
                DisplayMode::Journey
            } else if (600..1320).contains(&mins) {
                DisplayMode::Art
            } else {
                DisplayMode::Sleep
            };
            prop_assert_eq!(mode_for(now), expected);
        }

        #[test]
        fn mode_constant_until_boundary(secs in 0u32..86_400) {
            let now = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
            let wait = until_next_boundary(now);
            prop_assert!(wait > Duration::ZERO);
            let last = now + chrono::Duration::seconds(wait.as_secs() as i64 - 1);
            prop_assert_eq!(mode_for(last), mode_for(now));
        }
    }
}
