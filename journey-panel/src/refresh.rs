//! Full versus partial refresh scheduling.
//!
//! E-paper full refreshes are slow and flash the whole panel. Partial
//! refreshes are quick but need a complete frame already on the panel, and
//! drift (ghosting) if used for too long. The scheduler keeps the last full
//! frame and decides which kind of refresh each journey poll gets:
//!
//! ```text
//!              full repaint
//! NoBaseImage ──────────────▶ BaseImageFresh(t)
//!      ▲                        │        ▲
//!      │ invalidate             │ age ≥ staleness: full repaint, t = now
//!      └────────────────────────┤        │
//!                               └────────┘ age < staleness: partial repaint
//! ```

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::device::{DeviceError, EpdDevice};
use crate::domain::ClockTime;
use crate::render::{FontSet, Frame, TIME_REGION, draw, time_overlay};

/// Default maximum age, in seconds, of the base frame before a full repaint
/// is forced.
pub const DEFAULT_STALENESS_SECS: i64 = 300;

/// Errors from a refresh.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// A partial repaint needs a full frame on the panel first
    #[error("no base frame for a partial refresh")]
    NoBaseImage,

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Which kind of refresh the next journey poll should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    Full,
    Partial,
}

#[derive(Debug)]
enum RefreshState {
    NoBaseImage,
    BaseImageFresh {
        frame: Frame,
        last_full_refresh: DateTime<Utc>,
    },
}

/// Owns the retained base frame and its age.
#[derive(Debug)]
pub struct RefreshScheduler {
    state: RefreshState,
    staleness: Duration,
}

impl RefreshScheduler {
    pub fn new(staleness: Duration) -> Self {
        Self {
            state: RefreshState::NoBaseImage,
            staleness,
        }
    }

    /// Decide the refresh kind for a poll at `now`.
    pub fn plan(&self, now: DateTime<Utc>) -> RefreshAction {
        match &self.state {
            RefreshState::NoBaseImage => RefreshAction::Full,
            RefreshState::BaseImageFresh {
                last_full_refresh, ..
            } => {
                if now.signed_duration_since(*last_full_refresh) >= self.staleness {
                    RefreshAction::Full
                } else {
                    RefreshAction::Partial
                }
            }
        }
    }

    pub fn has_base_image(&self) -> bool {
        matches!(self.state, RefreshState::BaseImageFresh { .. })
    }

    /// When the current base frame was shown, if there is one.
    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            RefreshState::NoBaseImage => None,
            RefreshState::BaseImageFresh {
                last_full_refresh, ..
            } => Some(*last_full_refresh),
        }
    }

    /// The retained base frame.
    pub fn base_image(&self) -> Option<&Frame> {
        match &self.state {
            RefreshState::NoBaseImage => None,
            RefreshState::BaseImageFresh { frame, .. } => Some(frame),
        }
    }

    /// Show `frame` with a full refresh and keep it as the new base.
    ///
    /// After the settle delay the panel is left in partial refresh mode.
    /// On failure the scheduler has no base frame.
    pub async fn full_repaint<D: EpdDevice>(
        &mut self,
        device: &mut D,
        frame: Frame,
        now: DateTime<Utc>,
        settle: StdDuration,
    ) -> Result<(), RefreshError> {
        self.invalidate();

        device.init_fast()?;
        device.display(&frame.pack())?;
        tokio::time::sleep(settle).await;
        device.init_part()?;

        debug!(at = %now, "full refresh");
        self.state = RefreshState::BaseImageFresh {
            frame,
            last_full_refresh: now,
        };
        Ok(())
    }

    /// Redraw only the clock on the base frame and refresh that region.
    ///
    /// Does not reset the staleness clock.
    pub fn partial_repaint<D: EpdDevice>(
        &mut self,
        device: &mut D,
        time: ClockTime,
        fonts: &FontSet,
    ) -> Result<(), RefreshError> {
        let RefreshState::BaseImageFresh { frame, .. } = &mut self.state else {
            return Err(RefreshError::NoBaseImage);
        };

        draw(frame, &time_overlay(time), fonts);
        device.display_partial(&frame.pack(), TIME_REGION)?;
        Ok(())
    }

    /// Drop the base frame; the next journey poll does a full repaint.
    pub fn invalidate(&mut self) {
        if self.has_base_image() {
            debug!("base frame invalidated");
        }
        self.state = RefreshState::NoBaseImage;
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_STALENESS_SECS))
    }
}
