//! The display controller: one poll per wake-up, dispatching on the mode.

use std::future::Future;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

use crate::art::{ArtError, ArtPick, ArtSelector, ImageSource};
use crate::config::AppConfig;
use crate::device::{DeviceError, EpdDevice};
use crate::domain::{ClockTime, DisplayMode, JourneyRecord, mode_for, needs_redisplay, next_poll_delay};
use crate::refresh::{RefreshAction, RefreshError, RefreshScheduler};
use crate::render::{BoardSection, FontSet, Frame, draw, journey_board, prepare_art};
use crate::skanetrafiken::{ConversionContext, JourneySource, convert_journeys, filter_and_sort};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Errors that fail a single poll.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error(transparent)]
    Art(#[from] ArtError),

    #[error("no artwork available")]
    NoArt,
}

/// Owns the panel and everything needed to decide what goes on it.
pub struct DisplayController<D, S, I, C = SystemClock> {
    config: AppConfig,
    fonts: FontSet,
    refresh: RefreshScheduler,
    art: ArtSelector,
    /// Mode of the last poll whose dispatch succeeded.
    previous_mode: Option<DisplayMode>,
    device: D,
    source: S,
    images: I,
    clock: C,
}

impl<D, S, I, C> DisplayController<D, S, I, C>
where
    D: EpdDevice,
    S: JourneySource,
    I: ImageSource,
    C: Clock,
{
    pub fn new(config: AppConfig, device: D, source: S, images: I, clock: C) -> Self {
        Self {
            fonts: FontSet::from_sizes(&config.display.font_sizes),
            refresh: RefreshScheduler::new(config.timing.staleness()),
            art: ArtSelector::new(),
            previous_mode: None,
            config,
            device,
            source,
            images,
            clock,
        }
    }

    /// Replace the artwork selector (seeded in tests).
    pub fn with_art_selector(mut self, art: ArtSelector) -> Self {
        self.art = art;
        self
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn previous_mode(&self) -> Option<DisplayMode> {
        self.previous_mode
    }

    pub fn refresh(&self) -> &RefreshScheduler {
        &self.refresh
    }

    fn local_now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.config.timezone.local)
    }

    /// The mode the panel should be in right now.
    pub fn current_mode(&self) -> DisplayMode {
        mode_for(self.local_now().time())
    }

    /// Run one poll: work out the mode and update the panel if needed.
    pub async fn poll(&mut self) -> Result<DisplayMode, ControllerError> {
        let now = self.clock.now();
        let local = now.with_timezone(&self.config.timezone.local);
        let mode = mode_for(local.time());

        if self.previous_mode != Some(mode) {
            info!(from = ?self.previous_mode, to = %mode, "display mode changed");
        }
        if mode != DisplayMode::Journey {
            self.refresh.invalidate();
        }

        if !needs_redisplay(mode, self.previous_mode) {
            return Ok(mode);
        }

        match mode {
            DisplayMode::Journey => self.show_journeys(now, &local).await?,
            DisplayMode::Art => self.show_art().await?,
            DisplayMode::Sleep => self.release(),
            DisplayMode::Shutdown => {
                self.device.init()?;
                self.device.clear()?;
                self.device.sleep()?;
            }
        }

        self.previous_mode = Some(mode);
        Ok(mode)
    }

    async fn show_journeys(
        &mut self,
        now: DateTime<Utc>,
        local: &DateTime<Tz>,
    ) -> Result<(), ControllerError> {
        let time = ClockTime::from(local.time());

        match self.refresh.plan(now) {
            RefreshAction::Partial => {
                self.refresh
                    .partial_repaint(&mut self.device, time, &self.fonts)?;
            }
            RefreshAction::Full => {
                let columns = self.fetch_columns(now, local).await;
                let sections: Vec<BoardSection<'_>> = self
                    .config
                    .routes
                    .iter()
                    .zip(&columns)
                    .map(|(route, journeys)| BoardSection {
                        title: &route.title,
                        journeys,
                    })
                    .collect();

                let size = self.device.size();
                let mut frame = Frame::new(size.width, size.height);
                let commands = journey_board(size.width, size.height, time, &sections);
                draw(&mut frame, &commands, &self.fonts);

                self.refresh
                    .full_repaint(
                        &mut self.device,
                        frame,
                        now,
                        self.config.timing.journey_settle(),
                    )
                    .await?;
            }
        }
        Ok(())
    }

    /// Upcoming journeys for every route, in route order.
    ///
    /// A route whose fetch fails is shown empty.
    async fn fetch_columns(
        &self,
        now: DateTime<Utc>,
        local: &DateTime<Tz>,
    ) -> Vec<Vec<JourneyRecord>> {
        let tz = self.config.timezone;
        let ctx = ConversionContext::at(&now, tz.source, tz.local);

        let mut columns = Vec::with_capacity(self.config.routes.len());
        for route in &self.config.routes {
            let mut journeys = match self
                .source
                .fetch_journeys(&route.from_id, &route.to_id)
                .await
            {
                Ok(raw) => filter_and_sort(
                    convert_journeys(&raw, &ctx),
                    local,
                    self.config.timing.min_minutes_ahead,
                ),
                Err(e) => {
                    warn!(route = %route.title, error = %e, "journey fetch failed");
                    Vec::new()
                }
            };
            journeys.truncate(route.rows());
            debug!(route = %route.title, count = journeys.len(), "journeys");
            columns.push(journeys);
        }
        columns
    }

    async fn show_art(&mut self) -> Result<(), ControllerError> {
        let available = self.images.list_available()?;
        let id = match self.art.choose(&available) {
            ArtPick::Found(id) => id,
            ArtPick::Empty => return Err(ControllerError::NoArt),
        };
        let image = self.images.open(&id)?;

        let size = self.device.size();
        let frame = prepare_art(&image, size.width, size.height);

        self.device.init()?;
        self.device.display(&frame.pack())?;
        tokio::time::sleep(self.config.timing.art_settle()).await;
        self.device.sleep()?;

        info!(art = %id, "artwork shown");
        self.art.mark_shown(id);
        Ok(())
    }

    /// Blank the panel and put it to sleep, logging failures.
    fn release(&mut self) {
        if let Err(e) = self.blank() {
            warn!(error = %e, "failed to release display");
        }
        self.refresh.invalidate();
    }

    fn blank(&mut self) -> Result<(), DeviceError> {
        self.device.init()?;
        self.device.clear()?;
        self.device.sleep()
    }

    /// Best-effort blank and sleep before exit. Never fails.
    pub fn cleanup(&mut self) {
        if let Err(e) = self.blank() {
            error!(error = %e, "cleanup failed");
        }
        self.refresh.invalidate();
    }

    /// Poll until `shutdown` resolves, then clean up.
    ///
    /// Failed polls are logged and the loop carries on. Between polls the
    /// loop sleeps for the mode's interval, cut short at the next mode
    /// boundary.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => break,
                polled = self.poll() => polled,
            };
            let mode = polled.unwrap_or_else(|e| {
                error!(error = %e, "poll failed");
                self.current_mode()
            });

            let delay = next_poll_delay(mode, self.local_now().time());
            debug!(%mode, ?delay, "waiting for next poll");

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("shutting down");
        self.cleanup();
    }
}
