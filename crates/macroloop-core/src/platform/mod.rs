//! Platform abstraction layer
//!
//! Live input simulation and screen capture. Everything above this module
//! talks to the `InputSimulator` / `ScreenGrabber` traits only.

#[cfg(any(target_os = "macos", target_os = "windows"))]
pub mod keymap;
#[cfg(any(target_os = "macos", target_os = "windows"))]
mod simulate;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub mod unsupported;

// Re-export the current platform
#[cfg(target_os = "macos")]
pub use macos as current;

#[cfg(target_os = "windows")]
pub use windows as current;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub use unsupported as current;

pub use current::{SystemInput, SystemScreen};
