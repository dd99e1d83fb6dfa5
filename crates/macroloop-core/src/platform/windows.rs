//! Windows backend
//!
//! Input via rdev (SendInput under the hood), capture via a GDI BitBlt of the
//! desktop device context.

use crate::error::{Error, Result};
use crate::geometry::BoundingBox;
use crate::screen::{Frame, ScreenGrabber};
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC, GetDIBits,
    ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, SRCCOPY,
};

pub use super::simulate::SystemInput;

pub struct SystemScreen;

impl SystemScreen {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }
}

impl ScreenGrabber for SystemScreen {
    fn grab(&mut self, region: &BoundingBox) -> Result<Frame> {
        region.validate()?;
        let (w, h) = (region.width(), region.height());
        let mut bgra = vec![0u8; (w as usize) * (h as usize) * 4];

        unsafe {
            let desktop = HWND::default();
            let screen = GetDC(desktop);
            if screen.is_invalid() {
                return Err(Error::capture_failed("GetDC failed for the desktop"));
            }
            let mem = CreateCompatibleDC(screen);
            let bitmap = CreateCompatibleBitmap(screen, w, h);
            let previous = SelectObject(mem, bitmap);

            let blit = BitBlt(
                mem,
                0,
                0,
                w,
                h,
                screen,
                region.top_left.x,
                region.top_left.y,
                SRCCOPY,
            );

            let mut info = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: w,
                    // Negative height: top-down rows.
                    biHeight: -h,
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                ..Default::default()
            };
            let lines = GetDIBits(
                mem,
                bitmap,
                0,
                h as u32,
                Some(bgra.as_mut_ptr().cast()),
                &mut info,
                DIB_RGB_COLORS,
            );

            SelectObject(mem, previous);
            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem);
            ReleaseDC(desktop, screen);

            blit.map_err(|e| Error::capture_failed(format!("BitBlt failed: {}", e)))?;
            if lines != h {
                return Err(Error::capture_failed(format!("GetDIBits copied {} of {} rows", lines, h)));
            }
        }

        let mut frame = Frame::new(w as u32, h as u32);
        for (dst, src) in frame.pixels_mut().zip(bgra.chunks_exact(4)) {
            *dst = image::Rgba([src[2], src[1], src[0], 255]);
        }
        Ok(frame)
    }
}
