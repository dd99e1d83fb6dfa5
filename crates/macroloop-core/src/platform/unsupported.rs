//! Fallback for platforms without a live backend yet (Linux, BSD)
//!
//! The engine runs anywhere; only the OS collaborators are missing.
//! Planned approach for Linux: XTest/uinput for injection, XGetImage or the
//! portal screenshot API for capture.

use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, Point};
use crate::input::{Button, InputSimulator, Key};
use crate::screen::{Frame, ScreenGrabber};

pub struct SystemInput;

impl SystemInput {
    pub fn new() -> Result<Self> {
        Err(Error::not_implemented("Input simulation"))
    }
}

impl InputSimulator for SystemInput {
    fn move_to(&mut self, _position: Point) -> Result<()> {
        Err(Error::not_implemented("Input simulation"))
    }

    fn click(&mut self, _button: Button) -> Result<()> {
        Err(Error::not_implemented("Input simulation"))
    }

    fn key_press(&mut self, _key: &Key) -> Result<()> {
        Err(Error::not_implemented("Input simulation"))
    }

    fn key_release(&mut self, _key: &Key) -> Result<()> {
        Err(Error::not_implemented("Input simulation"))
    }
}

pub struct SystemScreen;

impl SystemScreen {
    pub fn new() -> Result<Self> {
        Err(Error::not_implemented("Screen capture"))
    }
}

impl ScreenGrabber for SystemScreen {
    fn grab(&mut self, _region: &BoundingBox) -> Result<Frame> {
        Err(Error::not_implemented("Screen capture"))
    }
}
