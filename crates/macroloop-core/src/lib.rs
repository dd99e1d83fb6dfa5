//! macroloop-core - primitives for looping desktop macros
//!
//! Portable types (geometry, keys, buttons, errors) and the collaborator
//! traits the engine drives: `InputSimulator`, `ScreenGrabber`, `Clock`.
//!
//! ## Platform Support
//!
//! - **macOS**: input via rdev, capture via CoreGraphics
//! - **Windows**: input via rdev, capture via GDI
//! - **Linux**: coming soon (live backends report `NotImplemented`)

pub mod clock;
pub mod error;
pub mod geometry;
pub mod input;
pub mod platform;
pub mod screen;

pub use clock::{Clock, MonotonicClock};
pub use error::{Error, ErrorCode, Result};
pub use geometry::{BoundingBox, Point};
pub use input::{Button, InputEvent, InputSimulator, Key, NamedKey};
pub use screen::{frames_match, Frame, ScreenGrabber};

pub mod prelude {
    pub use crate::clock::{Clock, MonotonicClock};
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::geometry::{BoundingBox, Point};
    pub use crate::input::{Button, InputEvent, InputSimulator, Key, NamedKey};
    pub use crate::platform::{SystemInput, SystemScreen};
    pub use crate::screen::{frames_match, Frame, ScreenGrabber};
}
