//! Platform layer for the global input listener
//!
//! The listener feeds one process-wide `InputHub`; consumers subscribe
//! through `SystemInputSource`.

#[cfg(any(target_os = "macos", target_os = "windows"))]
pub mod listener;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub mod unsupported;

// Re-export the current platform
#[cfg(any(target_os = "macos", target_os = "windows"))]
pub use listener as current;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub use unsupported as current;

pub use current::SystemInputSource;
