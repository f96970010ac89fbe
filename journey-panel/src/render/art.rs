//! Fitting artwork onto the panel.

use image::{DynamicImage, imageops::FilterType};

use super::Frame;

/// Luma values below this become ink.
const INK_THRESHOLD: u8 = 128;

/// Scale `image` to fit a `width` x `height` panel, keeping its aspect
/// ratio, centre it on paper and reduce it to one bit per pixel.
pub fn prepare_art(image: &DynamicImage, width: u32, height: u32) -> Frame {
    let mut frame = Frame::new(width, height);
    if image.width() == 0 || image.height() == 0 {
        return frame;
    }

    let (fit_width, fit_height) = fit_within(image.width(), image.height(), width, height);
    let scaled = image
        .resize_exact(fit_width, fit_height, FilterType::Lanczos3)
        .to_luma8();

    let x_offset = (width - fit_width) / 2;
    let y_offset = (height - fit_height) / 2;

    for (x, y, pixel) in scaled.enumerate_pixels() {
        if pixel.0[0] < INK_THRESHOLD {
            frame.set_ink(x + x_offset, y + y_offset, true);
        }
    }
    frame
}

/// Largest size with the image's aspect ratio that fits the panel.
fn fit_within(image_width: u32, image_height: u32, width: u32, height: u32) -> (u32, u32) {
    let image_ratio = image_width as f64 / image_height as f64;
    let panel_ratio = width as f64 / height as f64;

    let (w, h) = if image_ratio > panel_ratio {
        // Wider than the panel: full width, letterboxed
        (width, (width as f64 / image_ratio) as u32)
    } else {
        (((height as f64) * image_ratio) as u32, height)
    };
    (w.clamp(1, width), h.clamp(1, height))
}
