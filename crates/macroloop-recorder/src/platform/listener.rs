//! Global input listener through rdev
//!
//! `rdev::listen` blocks its thread for the life of the process, so one
//! listener thread is started on first use and shared by every subscriber.
//! Needs Input Monitoring permission on macOS.

use crate::hub::{InputHub, InputSource, Subscription};
use macroloop_core::platform::keymap::{from_rdev_button, from_rdev_key};
use macroloop_core::{Error, InputEvent, Point, Result};
use rdev::EventType;
use std::sync::OnceLock;
use std::thread;
use tracing::{debug, error};

static HUB: OnceLock<InputHub> = OnceLock::new();

/// Subscriptions to the OS-wide input feed.
#[derive(Debug, Clone, Copy)]
pub struct SystemInputSource;

impl SystemInputSource {
    pub fn new() -> Result<Self> {
        let hub = global_hub();
        if hub.is_closed() {
            return Err(Error::listener_failed("input listener is not running").with_suggestions(vec![
                "Grant Input Monitoring and Accessibility permission to the terminal".to_string(),
            ]));
        }
        Ok(Self)
    }
}

impl InputSource for SystemInputSource {
    fn subscribe_with_capacity(&self, capacity: usize) -> Result<Subscription> {
        let hub = global_hub();
        if hub.is_closed() {
            return Err(Error::listener_failed("input listener stopped"));
        }
        Ok(hub.attach(capacity))
    }
}

fn global_hub() -> &'static InputHub {
    HUB.get_or_init(|| {
        let hub = InputHub::new();
        let feed = hub.clone();
        if let Err(e) = thread::Builder::new()
            .name("input-listener".to_string())
            .spawn(move || listen(feed))
        {
            error!(error = %e, "could not start input listener thread");
            hub.close();
        }
        hub
    })
}

fn listen(hub: InputHub) {
    let feed = hub.clone();
    // Button events carry no position; track the pointer.
    let mut pointer = Point::default();

    debug!("input listener started");
    let result = rdev::listen(move |event| {
        let input = match event.event_type {
            EventType::MouseMove { x, y } => {
                pointer = Point::new(x.round() as i32, y.round() as i32);
                return;
            }
            EventType::ButtonPress(b) => InputEvent::Click {
                button: from_rdev_button(b),
                position: pointer,
                pressed: true,
            },
            EventType::ButtonRelease(b) => InputEvent::Click {
                button: from_rdev_button(b),
                position: pointer,
                pressed: false,
            },
            EventType::KeyPress(k) => match from_rdev_key(k) {
                Some(key) => InputEvent::KeyPress(key),
                None => return,
            },
            EventType::KeyRelease(k) => match from_rdev_key(k) {
                Some(key) => InputEvent::KeyRelease(key),
                None => return,
            },
            EventType::Wheel { .. } => return,
        };
        feed.publish(input);
    });

    if let Err(e) = result {
        error!(error = ?e, "input listener failed");
        hub.close();
    }
}
