//! Monochrome frame buffer.

use core::convert::Infallible;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

/// A 1-bit raster the size of the panel.
///
/// [`BinaryColor::On`] is ink (black), [`BinaryColor::Off`] is paper.
/// Frames start blank (all paper).
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    ink: Vec<bool>,
}

impl Frame {
    /// Create a blank frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ink: vec![false; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at `(x, y)` is inked. Out of bounds reads as paper.
    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.index(x as i32, y as i32)
            .map(|i| self.ink[i])
            .unwrap_or(false)
    }

    /// Set a single pixel. Out of bounds writes are ignored.
    pub fn set_ink(&mut self, x: u32, y: u32, ink: bool) {
        if let Some(i) = self.index(x as i32, y as i32) {
            self.ink[i] = ink;
        }
    }

    /// Number of inked pixels.
    pub fn ink_count(&self) -> usize {
        self.ink.iter().filter(|&&b| b).count()
    }

    /// Pack into the controller's buffer format.
    ///
    /// One bit per pixel, rows padded to whole bytes, most significant bit
    /// first, `1` for paper and `0` for ink.
    pub fn pack(&self) -> Vec<u8> {
        let stride = self.stride();
        let mut buffer = vec![0xFF; stride * self.height as usize];
        for y in 0..self.height as usize {
            for x in 0..self.width as usize {
                if self.ink[y * self.width as usize + x] {
                    buffer[y * stride + x / 8] &= !(0x80 >> (x % 8));
                }
            }
        }
        buffer
    }

    /// Bytes per packed row.
    pub fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Frame({}x{}, {} inked)",
            self.width,
            self.height,
            self.ink_count()
        )
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Frame {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(i) = self.index(point.x, point.y) {
                self.ink[i] = color.is_on();
            }
        }
        Ok(())
    }
}
