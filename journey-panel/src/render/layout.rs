//! Journey board layout.
//!
//! Layouts are pure: they turn journey data and geometry into a list of
//! [`DrawCommand`]s, which [`render`] then applies to any `embedded-graphics`
//! draw target. Keeping the two apart makes the layout testable without a
//! display.
//!
//! # Layout
//!
//! ```text
//! ┌────────────────────────┬────────────────────────┐
//! │ 08:42                  │                        │  ← time at (10, 10)
//! ├────────────────────────┼────────────────────────┤  ← y = 60
//! │      Hyllie -> Lund    │  Hyllie -> Østerport   │  ← title, y = 90
//! │  Departure Arrival Track │ ...                  │  ← headers, y = 150
//! │ ────────────────────── │ ────────────────────── │  ← y = 175
//! │ ! 08:50 +2  09:02   4  │ × 08:55  Cancelled     │  ← rows from y = 180
//! │   09:05     09:17   4  │   09:10    09:45   1b  │     every 50 px
//! └────────────────────────┴────────────────────────┘
//! ```

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

use crate::domain::{ClockTime, JourneyRecord};

use super::fonts::{FontSet, FontSize};

/// Maximum journey rows per section.
pub const MAX_ROWS: usize = 5;

/// Where the clock is drawn.
pub const TIME_ANCHOR: Point = Point::new(10, 10);

/// Area cleared and redrawn by a time-only update.
pub const TIME_REGION: Rectangle = Rectangle::new(TIME_ANCHOR, Size::new(201, 61));

const HEADER_RULE_Y: i32 = 60;
const TITLE_Y: i32 = 90;
const HEADERS_Y: i32 = 150;
const HEADER_RULE_OFFSET: i32 = 25;
const FIRST_ROW_Y: i32 = 180;
const ROW_PITCH: i32 = 50;
const COLUMN_PADDING: i32 = 10;
const SYMBOL_GUTTER: i32 = 30;
/// Approximate title glyph width used for centering.
const TITLE_GLYPH_WIDTH: i32 = 18;
const DELAY_OFFSET: Point = Point::new(85, -8);

const CANCELLED_MARK: &str = "×";
const DELAYED_MARK: &str = "!";

/// A single drawing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    /// Text with its top-left corner at `origin`.
    Text {
        origin: Point,
        text: String,
        font: FontSize,
    },
    /// One pixel wide line in ink.
    Line { start: Point, end: Point },
    /// Fill a rectangle with paper.
    ClearRect(Rectangle),
}

impl DrawCommand {
    fn text(x: i32, y: i32, text: impl Into<String>, font: FontSize) -> Self {
        DrawCommand::Text {
            origin: Point::new(x, y),
            text: text.into(),
            font,
        }
    }

    fn line(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        DrawCommand::Line {
            start: Point::new(x0, y0),
            end: Point::new(x1, y1),
        }
    }
}

/// One route's column on the journey board.
#[derive(Debug, Clone, Copy)]
pub struct BoardSection<'a> {
    pub title: &'a str,
    pub journeys: &'a [JourneyRecord],
}

/// Fixed frame: centre divider, header rule and the clock.
pub fn base_layout(width: u32, height: u32, now: ClockTime) -> Vec<DrawCommand> {
    let width = width as i32;
    let height = height as i32;
    vec![
        DrawCommand::line(width / 2, 0, width / 2, height),
        DrawCommand::line(0, HEADER_RULE_Y, width, HEADER_RULE_Y),
        DrawCommand::text(TIME_ANCHOR.x, TIME_ANCHOR.y, now.to_string(), FontSize::Large),
    ]
}

/// Title, column headers and up to [`MAX_ROWS`] journeys for one route.
pub fn journey_section(
    journeys: &[JourneyRecord],
    title: &str,
    start_x: i32,
    section_width: i32,
) -> Vec<DrawCommand> {
    let content_x = start_x + COLUMN_PADDING + SYMBOL_GUTTER;
    let column_width = (section_width - 2 * COLUMN_PADDING - SYMBOL_GUTTER).div_euclid(3);

    let departure_x = content_x;
    let arrival_x = departure_x + column_width;
    let track_x = arrival_x + column_width;
    let symbol_x = start_x + COLUMN_PADDING;

    let title_width = title.chars().count() as i32 * TITLE_GLYPH_WIDTH;
    let title_x = start_x + (section_width - title_width).div_euclid(2);

    let mut commands = vec![
        DrawCommand::text(title_x, TITLE_Y, title, FontSize::MediumLarge),
        DrawCommand::text(departure_x, HEADERS_Y, "Departure", FontSize::Small),
        DrawCommand::text(arrival_x + 10, HEADERS_Y, "Arrival", FontSize::Small),
        DrawCommand::text(track_x, HEADERS_Y, "Track", FontSize::Small),
        DrawCommand::line(
            start_x + 5,
            HEADERS_Y + HEADER_RULE_OFFSET,
            start_x + section_width - 5,
            HEADERS_Y + HEADER_RULE_OFFSET,
        ),
    ];

    for (i, journey) in journeys.iter().take(MAX_ROWS).enumerate() {
        let y = FIRST_ROW_Y + ROW_PITCH * i as i32;

        if journey.is_cancelled() {
            commands.push(DrawCommand::text(symbol_x, y, CANCELLED_MARK, FontSize::Medium));
        } else if journey.is_delayed() {
            commands.push(DrawCommand::text(symbol_x, y, DELAYED_MARK, FontSize::Medium));
        }

        commands.push(DrawCommand::text(
            departure_x,
            y,
            journey.departure().to_string(),
            FontSize::Medium,
        ));
        commands.push(DrawCommand::text(
            arrival_x,
            y,
            journey.arrival_label(),
            FontSize::Medium,
        ));
        if let Some(track) = journey.track_short() {
            commands.push(DrawCommand::text(track_x, y, track, FontSize::Medium));
        }

        if let Some(delay) = journey.delay_mins().filter(|_| journey.is_delayed()) {
            commands.push(DrawCommand::text(
                departure_x + DELAY_OFFSET.x,
                y + DELAY_OFFSET.y,
                format!("+{delay}"),
                FontSize::Small,
            ));
        }
    }

    commands
}

/// The complete journey board: base layout plus one section per route,
/// splitting the width evenly.
pub fn journey_board(
    width: u32,
    height: u32,
    now: ClockTime,
    sections: &[BoardSection<'_>],
) -> Vec<DrawCommand> {
    let mut commands = base_layout(width, height, now);
    if sections.is_empty() {
        return commands;
    }

    let section_width = width as i32 / sections.len() as i32;
    for (i, section) in sections.iter().enumerate() {
        commands.extend(journey_section(
            section.journeys,
            section.title,
            i as i32 * section_width,
            section_width,
        ));
    }
    commands
}

/// Clear the clock area and redraw the time, for partial refreshes.
pub fn time_overlay(now: ClockTime) -> Vec<DrawCommand> {
    vec![
        DrawCommand::ClearRect(TIME_REGION),
        DrawCommand::text(TIME_ANCHOR.x, TIME_ANCHOR.y, now.to_string(), FontSize::Large),
    ]
}

/// Apply draw commands to a target, in order.
pub fn render<D>(target: &mut D, commands: &[DrawCommand], fonts: &FontSet) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
    let paper = PrimitiveStyle::with_fill(BinaryColor::Off);

    for command in commands {
        match command {
            DrawCommand::Text { origin, text, font } => {
                let style = MonoTextStyle::new(fonts.get(*font), BinaryColor::On);
                Text::with_baseline(text, *origin, style, Baseline::Top).draw(target)?;
            }
            DrawCommand::Line { start, end } => {
                Line::new(*start, *end).into_styled(stroke).draw(target)?;
            }
            DrawCommand::ClearRect(rect) => {
                rect.into_styled(paper).draw(target)?;
            }
        }
    }
    Ok(())
}
