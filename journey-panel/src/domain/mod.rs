//! Domain types for the journey panel.
//!
//! Time-of-day values, normalized journey records and the display mode
//! schedule. Everything here is pure: no I/O, no clocks.

mod journey;
mod mode;
mod time;

pub use journey::{ArrivalTime, CANCELLED, JourneyRecord, JourneyStatus};
pub use mode::{
    DisplayMode, mode_for, needs_redisplay, next_poll_delay, poll_interval, until_next_boundary,
};
pub use time::{ClockTime, TimeError, is_at_least_minutes_ahead, to_local, to_local_str};
