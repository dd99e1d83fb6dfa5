//! Input injection through rdev

use super::keymap::{to_rdev_button, to_rdev_key};
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::input::{Button, InputSimulator, Key};
use rdev::EventType;
use std::thread;
use std::time::Duration;

/// Pause after each posted event so the OS registers it before the next.
const SETTLE: Duration = Duration::from_millis(10);

/// Posts synthetic events to the OS input queue.
pub struct SystemInput;

impl SystemInput {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    fn send(&self, event: &EventType, what: &str) -> Result<()> {
        rdev::simulate(event).map_err(|e| Error::input_failed(what, format!("{:?}", e)))?;
        thread::sleep(SETTLE);
        Ok(())
    }
}

impl InputSimulator for SystemInput {
    fn move_to(&mut self, position: Point) -> Result<()> {
        self.send(
            &EventType::MouseMove {
                x: position.x as f64,
                y: position.y as f64,
            },
            "move",
        )
    }

    fn click(&mut self, button: Button) -> Result<()> {
        let b = to_rdev_button(button);
        self.send(&EventType::ButtonPress(b), "mouse down")?;
        self.send(&EventType::ButtonRelease(b), "mouse up")
    }

    fn key_press(&mut self, key: &Key) -> Result<()> {
        let k = to_rdev_key(key).ok_or_else(|| Error::input_failed("key press", format!("no key for {}", key)))?;
        self.send(&EventType::KeyPress(k), "key press")
    }

    fn key_release(&mut self, key: &Key) -> Result<()> {
        let k = to_rdev_key(key).ok_or_else(|| Error::input_failed("key release", format!("no key for {}", key)))?;
        self.send(&EventType::KeyRelease(k), "key release")
    }
}
