//! macOS backend
//!
//! Input via rdev (CGEvent under the hood), capture via CGWindowListCreateImage.
//! Both need Accessibility and Screen Recording permission for the terminal.

use crate::error::{Error, Result};
use crate::geometry::BoundingBox;
use crate::screen::{Frame, ScreenGrabber};
use core_graphics::geometry::{CGPoint, CGRect, CGSize};
use core_graphics::window::{
    create_image, kCGNullWindowID, kCGWindowImageNominalResolution, kCGWindowListOptionOnScreenOnly,
};

pub use super::simulate::SystemInput;

/// Captures on-screen pixels in global display coordinates (points).
pub struct SystemScreen;

impl SystemScreen {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }
}

impl ScreenGrabber for SystemScreen {
    fn grab(&mut self, region: &BoundingBox) -> Result<Frame> {
        region.validate()?;
        let rect = CGRect::new(
            &CGPoint::new(region.top_left.x as f64, region.top_left.y as f64),
            &CGSize::new(region.width() as f64, region.height() as f64),
        );

        // Nominal resolution keeps one pixel per point, so a region captured on
        // a Retina display has the same size as the box.
        let cg_image = create_image(
            rect,
            kCGWindowListOptionOnScreenOnly,
            kCGNullWindowID,
            kCGWindowImageNominalResolution,
        )
        .ok_or_else(|| {
            Error::capture_failed("CGWindowListCreateImage returned nothing")
                .with_suggestions(vec![
                    "Grant Screen Recording permission in System Settings > Privacy & Security".to_string(),
                ])
        })?;

        if cg_image.bits_per_pixel() != 32 {
            return Err(Error::capture_failed(format!(
                "unexpected pixel format: {} bits per pixel",
                cg_image.bits_per_pixel()
            )));
        }

        let width = cg_image.width() as u32;
        let height = cg_image.height() as u32;
        let stride = cg_image.bytes_per_row();
        let data = cg_image.data();
        let bytes = data.bytes();

        // Rows may be padded; pixels are BGRA.
        let mut frame = Frame::new(width, height);
        for (y, row) in bytes.chunks(stride).take(height as usize).enumerate() {
            for x in 0..width as usize {
                let px = &row[x * 4..x * 4 + 4];
                frame.put_pixel(x as u32, y as u32, image::Rgba([px[2], px[1], px[0], 255]));
            }
        }
        Ok(frame)
    }
}
