//! A device that writes each refresh to a PNG file.
//!
//! Useful for developing layouts without the panel attached.

use std::path::{Path, PathBuf};

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use image::{GrayImage, Luma};
use tracing::debug;

use super::{DeviceError, EpdDevice};

/// Writes `frame-NNNN-<kind>.png` into a directory for every refresh.
#[derive(Debug)]
pub struct PreviewDevice {
    dir: PathBuf,
    width: u32,
    height: u32,
    /// Packed contents currently on the "panel".
    shown: Vec<u8>,
    awake: bool,
    sequence: u32,
}

impl PreviewDevice {
    /// Create a preview device, creating `dir` if needed.
    pub fn new(dir: impl AsRef<Path>, width: u32, height: u32) -> Result<Self, DeviceError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        let stride = (width as usize).div_ceil(8);
        Ok(Self {
            dir,
            width,
            height,
            shown: vec![0xFF; stride * height as usize],
            awake: false,
            sequence: 0,
        })
    }

    /// Number of images written so far.
    pub fn frames_written(&self) -> u32 {
        self.sequence
    }

    fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    fn check_awake(&self) -> Result<(), DeviceError> {
        if self.awake { Ok(()) } else { Err(DeviceError::Asleep) }
    }

    fn check_len(&self, buffer: &[u8]) -> Result<(), DeviceError> {
        if buffer.len() != self.shown.len() {
            return Err(DeviceError::BufferSize {
                expected: self.shown.len(),
                actual: buffer.len(),
            });
        }
        Ok(())
    }

    fn write_png(&mut self, kind: &str) -> Result<(), DeviceError> {
        self.sequence += 1;
        let path = self
            .dir
            .join(format!("frame-{:04}-{kind}.png", self.sequence));
        unpack(&self.shown, self.width, self.height).save(&path)?;
        debug!(path = %path.display(), "wrote preview frame");
        Ok(())
    }
}

impl EpdDevice for PreviewDevice {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn init(&mut self) -> Result<(), DeviceError> {
        self.awake = true;
        Ok(())
    }

    fn init_fast(&mut self) -> Result<(), DeviceError> {
        self.awake = true;
        Ok(())
    }

    fn init_part(&mut self) -> Result<(), DeviceError> {
        self.check_awake()
    }

    fn display(&mut self, buffer: &[u8]) -> Result<(), DeviceError> {
        self.check_awake()?;
        self.check_len(buffer)?;
        self.shown.copy_from_slice(buffer);
        self.write_png("full")
    }

    fn display_partial(&mut self, buffer: &[u8], region: Rectangle) -> Result<(), DeviceError> {
        self.check_awake()?;
        self.check_len(buffer)?;

        let stride = self.stride();
        let area = region.intersection(&Rectangle::new(
            Point::zero(),
            Size::new(self.width, self.height),
        ));
        for point in area.points() {
            let (x, y) = (point.x as usize, point.y as usize);
            let byte = y * stride + x / 8;
            let mask = 0x80 >> (x % 8);
            self.shown[byte] = (self.shown[byte] & !mask) | (buffer[byte] & mask);
        }
        self.write_png("partial")
    }

    fn clear(&mut self) -> Result<(), DeviceError> {
        self.check_awake()?;
        self.shown.fill(0xFF);
        self.write_png("clear")
    }

    fn sleep(&mut self) -> Result<(), DeviceError> {
        self.awake = false;
        Ok(())
    }
}

/// Expand a packed buffer to an 8-bit greyscale image.
fn unpack(buffer: &[u8], width: u32, height: u32) -> GrayImage {
    let stride = (width as usize).div_ceil(8);
    GrayImage::from_fn(width, height, |x, y| {
        let byte = buffer[y as usize * stride + x as usize / 8];
        let paper = byte & (0x80 >> (x % 8)) != 0;
        Luma([if paper { 255 } else { 0 }])
    })
}
