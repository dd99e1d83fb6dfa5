//! macroloop-recorder - record a desktop macro once, replay it forever
//!
//! Recording turns live input into timestamped records (`macro.txt`) with
//! screenshot checkpoints of a chosen region (`box.txt`, `screen<N>.png`).
//! Replay loops the records on a fixed period and stops as soon as a
//! checkpoint no longer matches pixel for pixel.
//!
//! ## Platform Support
//!
//! - **macOS**: global input listener via rdev
//! - **Windows**: global input listener via rdev
//! - **Linux**: coming soon (the engine runs; the listener reports `NotImplemented`)

pub mod events;
pub mod hub;
pub mod interpreter;
pub mod log;
pub mod platform;
pub mod recorder;
pub mod region;
pub mod replay;
pub mod session;
pub mod storage;
pub mod verifier;

pub use events::{Action, ActionKind, Step};
pub use hub::{CancelToken, InputHub, InputSource, Subscription};
pub use interpreter::{Interpreter, Program};
pub use log::EventLog;
pub use platform::SystemInputSource;
pub use recorder::{Recorder, RecorderConfig, RecordingTarget};
pub use region::{Corner, RegionSelector};
pub use replay::{
    Devices, Player, PlayerState, ReplayConfig, ReplayOutcome, ReplayStats, StopListener,
};
pub use session::{RecordingSummary, Session};
pub use storage::MacroStore;
pub use verifier::ScreenVerifier;

pub mod prelude {
    pub use crate::events::{Action, ActionKind, Step};
    pub use crate::hub::{CancelToken, InputHub, InputSource, Subscription};
    pub use crate::interpreter::{Interpreter, Program};
    pub use crate::log::EventLog;
    pub use crate::platform::SystemInputSource;
    pub use crate::recorder::{Recorder, RecorderConfig, RecordingTarget};
    pub use crate::region::{Corner, RegionSelector};
    pub use crate::replay::{
        Devices, Player, PlayerState, ReplayConfig, ReplayOutcome, ReplayStats,
    };
    pub use crate::session::{RecordingSummary, Session};
    pub use crate::storage::MacroStore;
    pub use crate::verifier::ScreenVerifier;
}
