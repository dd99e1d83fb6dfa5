//! Screen capture seam and exact frame comparison

use crate::error::Result;
use crate::geometry::BoundingBox;
use image::RgbaImage;

/// Pixel contents of a captured region.
pub type Frame = RgbaImage;

/// Grabs the current pixels of a screen region.
pub trait ScreenGrabber {
    fn grab(&mut self, region: &BoundingBox) -> Result<Frame>;
}

/// Exact equality: same dimensions and every pixel identical. No tolerance.
pub fn frames_match(a: &Frame, b: &Frame) -> bool {
    a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw()
}

/// Index of the first differing pixel, `None` when the frames match.
pub fn first_difference(a: &Frame, b: &Frame) -> Option<(u32, u32)> {
    if a.dimensions() != b.dimensions() {
        return Some((0, 0));
    }
    a.enumerate_pixels()
        .zip(b.pixels())
        .find(|((_, _, pa), pb)| pa != pb)
        .map(|((x, y, _), _)| (x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, v: u8) -> Frame {
        RgbaImage::from_pixel(w, h, Rgba([v, v, v, 255]))
    }

    #[test]
    fn identical_frames_match() {
        assert!(frames_match(&solid(4, 3, 9), &solid(4, 3, 9)));
        assert_eq!(first_difference(&solid(4, 3, 9), &solid(4, 3, 9)), None);
    }

    #[test]
    fn one_pixel_breaks_the_match() {
        let a = solid(4, 3, 9);
        let mut b = a.clone();
        b.put_pixel(2, 1, Rgba([9, 9, 10, 255]));
        assert!(!frames_match(&a, &b));
        assert_eq!(first_difference(&a, &b), Some((2, 1)));
    }

    #[test]
    fn size_mismatch_never_matches() {
        assert!(!frames_match(&solid(4, 3, 0), &solid(3, 4, 0)));
    }
}
