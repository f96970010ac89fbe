//! Turning journeys and artwork into panel frames.

mod art;
mod fonts;
mod frame;
mod layout;

pub use art::prepare_art;
pub use fonts::{FontSet, FontSize, FontSizes};
pub use frame::Frame;
pub use layout::{
    BoardSection, DrawCommand, MAX_ROWS, TIME_ANCHOR, TIME_REGION, base_layout, journey_board,
    journey_section, render, time_overlay,
};

/// Rasterise draw commands onto a frame.
pub fn draw(frame: &mut Frame, commands: &[DrawCommand], fonts: &FontSet) {
    // Drawing into a Frame cannot fail
    render(frame, commands, fonts).unwrap_or_else(|never| match never {});
}
