//! # macroloop
//!
//! Record a desktop macro once, replay it forever, and stop the moment the
//! screen stops looking the way it did when you recorded it.
//!
//! ## Features
//!
//! - **Recording**: clicks and keys with offsets, plus screenshot checkpoints
//! - **Replay**: fixed-period loop on a phase grid that never drifts
//! - **Verification**: pixel-exact checkpoint comparison aborts the loop
//! - **Cross-platform**: macOS and Windows now, Linux coming
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use macroloop::prelude::*;
//!
//! let session = Session::new("macros/login", false)?;
//! let mut player = session.player(ReplayConfig::default())?;
//!
//! let source = SystemInputSource::new()?;
//! let mut input = SystemInput::new()?;
//! let mut screen = SystemScreen::new()?;
//! let outcome = player.run_until_stop_key(
//!     &source,
//!     Devices { input: &mut input, screen: &mut screen },
//!     &mut MonotonicClock::new(),
//!     &CancelToken::new(),
//! )?;
//! println!("{:?}", outcome.stats());
//! # Ok::<(), macroloop::Error>(())
//! ```

// Re-export core primitives
pub use macroloop_core::*;

// Re-export the engine
pub use macroloop_recorder as recorder;

pub use macroloop_recorder::{
    Action, CancelToken, Devices, EventLog, InputHub, InputSource, Interpreter, MacroStore, Player,
    PlayerState, Program, Recorder, RecorderConfig, RegionSelector, ReplayConfig, ReplayOutcome,
    ReplayStats, ScreenVerifier, Session, SystemInputSource,
};

/// Prelude - import everything you need
pub mod prelude {
    pub use macroloop_core::prelude::*;
    pub use macroloop_recorder::prelude::*;
}
