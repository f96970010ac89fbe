//! E-paper device abstraction.
//!
//! The controller drives the panel through [`EpdDevice`], which mirrors the
//! operations of a Waveshare-style 7.5" e-paper driver. All operations are
//! blocking.

mod preview;
#[cfg(test)]
pub(crate) mod recording;

pub use preview::PreviewDevice;

use embedded_graphics::geometry::Size;
use embedded_graphics::primitives::Rectangle;

/// Errors from a display device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// I/O with the device or its output failed
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a preview image failed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Submitted buffer does not match the panel size
    #[error("buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// An operation was attempted while the panel was asleep
    #[error("device is asleep; call init first")]
    Asleep,
}

/// Operations of an e-paper panel.
pub trait EpdDevice {
    /// Panel width and height in pixels.
    fn size(&self) -> Size;

    /// Wake the panel for slow, full-quality refreshes.
    fn init(&mut self) -> Result<(), DeviceError>;

    /// Wake the panel for faster full refreshes.
    fn init_fast(&mut self) -> Result<(), DeviceError>;

    /// Switch the panel to partial refresh mode.
    fn init_part(&mut self) -> Result<(), DeviceError>;

    /// Show a full packed frame (see [`Frame::pack`]).
    ///
    /// [`Frame::pack`]: crate::render::Frame::pack
    fn display(&mut self, buffer: &[u8]) -> Result<(), DeviceError>;

    /// Refresh only `region` of the panel from a full packed frame.
    fn display_partial(&mut self, buffer: &[u8], region: Rectangle) -> Result<(), DeviceError>;

    /// Blank the panel to paper.
    fn clear(&mut self) -> Result<(), DeviceError>;

    /// Enter deep sleep. Requires `init` before further use.
    fn sleep(&mut self) -> Result<(), DeviceError>;
}
