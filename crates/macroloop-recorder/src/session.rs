//! Entry point: a macro directory plus a fresh-recording flag
//!
//! A fresh session records into the directory (region, log, checkpoints)
//! before replay; a reused session loads what an earlier recording left.

use crate::hub::{CancelToken, InputSource};
use crate::interpreter::{Interpreter, Program};
use crate::log::EventLog;
use crate::recorder::{Recorder, RecordingTarget};
use crate::region::{Corner, RegionSelector};
use crate::replay::{Player, ReplayConfig};
use crate::storage::MacroStore;
use crate::verifier::ScreenVerifier;
use macroloop_core::{BoundingBox, Clock, Error, Point, Result, ScreenGrabber};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a finished recording produced.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingSummary {
    pub path: PathBuf,
    pub actions: usize,
    pub checkpoints: usize,
    pub period: f64,
}

pub struct Session {
    store: MacroStore,
    fresh: bool,
}

impl Session {
    /// Fresh sessions create the directory; reused ones need a complete
    /// recording already on disk.
    pub fn new(address: impl AsRef<Path>, fresh: bool) -> Result<Self> {
        let store = if fresh {
            MacroStore::create(address)?
        } else {
            let store = MacroStore::open(address)?;
            if !store.is_complete() {
                let missing = if store.macro_path().is_file() {
                    store.box_path()
                } else {
                    store.macro_path()
                };
                return Err(Error::missing_file(&missing));
            }
            store
        };
        info!(dir = %store.dir().display(), fresh, "session opened");
        Ok(Self { store, fresh })
    }

    pub fn store(&self) -> &MacroStore {
        &self.store
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Capture the two corners and persist them as `box.txt`.
    pub fn select_region(
        &self,
        source: &dyn InputSource,
        on_corner: impl FnMut(Corner, Point),
    ) -> Result<BoundingBox> {
        let region = RegionSelector::capture(source, on_corner)?;
        RegionSelector::save(&self.store, &region)?;
        info!(%region, "region saved");
        Ok(region)
    }

    /// Record into this directory and persist the log.
    pub fn record(
        &self,
        region: BoundingBox,
        recorder: &Recorder,
        source: &dyn InputSource,
        clock: &mut dyn Clock,
        screen: &mut dyn ScreenGrabber,
        cancel: &CancelToken,
    ) -> Result<RecordingSummary> {
        let mut verifier = ScreenVerifier::new(region, self.store.clone());
        let log = recorder.record(
            source,
            RecordingTarget {
                clock,
                verifier: &mut verifier,
                screen,
            },
            cancel,
        )?;
        let path = log.save(&self.store)?;
        verifier.reset();

        let steps = log.steps()?;
        let summary = RecordingSummary {
            path,
            actions: steps.len(),
            checkpoints: steps.iter().filter(|s| s.action.is_screenshot()).count(),
            period: steps.last().map_or(0.0, |s| s.offset),
        };
        info!(actions = summary.actions, checkpoints = summary.checkpoints, "recording saved");
        Ok(summary)
    }

    pub fn region(&self) -> Result<BoundingBox> {
        RegionSelector::load(&self.store)
    }

    pub fn program(&self) -> Result<Program> {
        Interpreter::parse(&EventLog::load(&self.store)?)
    }

    /// Load region and program and build a player ready to run.
    pub fn player(&self, config: ReplayConfig) -> Result<Player> {
        let region = self.region()?;
        let program = self.program()?;
        let verifier = ScreenVerifier::new(region, self.store.clone());
        Ok(Player::new(program, verifier).with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroloop_core::ErrorCode;

    #[test]
    fn reuse_needs_a_complete_macro() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::new(dir.path(), false).err().map(|e| e.code);
        assert_eq!(err, Some(ErrorCode::MissingFile));

        let err = Session::new(dir.path().join("nope"), false).err().map(|e| e.code);
        assert_eq!(err, Some(ErrorCode::MacroNotFound));
    }

    #[test]
    fn reuse_names_the_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = MacroStore::at(dir.path());
        store.write_text(&store.macro_path(), "1.0:\tscreenshot\n").unwrap();
        assert!(!store.is_complete());

        let err = Session::new(dir.path(), false).err().unwrap();
        assert_eq!(err.code, ErrorCode::MissingFile);
        assert!(err.message.contains("box.txt"));
    }

    #[test]
    fn fresh_creates_the_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("login-loop");
        let session = Session::new(&dir, true).unwrap();
        assert!(session.is_fresh());
        assert!(dir.is_dir());
    }

    #[test]
    fn player_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = MacroStore::at(dir.path());
        store
            .save_box(&BoundingBox::new(Point::new(0, 0), Point::new(8, 8)))
            .unwrap();
        store
            .write_text(&store.macro_path(), "0.0:\tclick(Button.left, 10, 20)\n1.5:\tscreenshot\n")
            .unwrap();

        let session = Session::new(dir.path(), false).unwrap();
        let player = session.player(ReplayConfig::default()).unwrap();
        assert_eq!(player.period(), 1.5);
        assert_eq!(player.checkpoint_total(), 1);
        assert_eq!(player.verifier().region().width(), 8);
    }
}
