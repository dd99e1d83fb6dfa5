//! Screenshot checkpoints: capture during recording, exact comparison on replay

use crate::storage::MacroStore;
use macroloop_core::screen::first_difference;
use macroloop_core::{frames_match, BoundingBox, Frame, Result, ScreenGrabber};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub struct ScreenVerifier {
    region: BoundingBox,
    store: MacroStore,
    checkpoint_index: usize,
    last_result: bool,
    references: HashMap<usize, Frame>,
}

impl ScreenVerifier {
    pub fn new(region: BoundingBox, store: MacroStore) -> Self {
        Self {
            region,
            store,
            checkpoint_index: 1,
            last_result: true,
            references: HashMap::new(),
        }
    }

    pub fn region(&self) -> &BoundingBox {
        &self.region
    }

    /// Number of the next checkpoint to capture or verify, 1-based.
    pub fn checkpoint_index(&self) -> usize {
        self.checkpoint_index
    }

    pub fn last_result(&self) -> bool {
        self.last_result
    }

    /// Grab the region and save it as the next reference image.
    pub fn capture_checkpoint(&mut self, screen: &mut dyn ScreenGrabber) -> Result<usize> {
        let n = self.checkpoint_index;
        let frame = screen.grab(&self.region)?;
        let path = self.store.save_checkpoint(n, &frame)?;
        info!(checkpoint = n, path = %path.display(), "checkpoint captured");
        self.references.insert(n, frame);
        self.checkpoint_index += 1;
        Ok(n)
    }

    /// Grab the region and compare it pixel for pixel against the reference
    /// with the current number.
    pub fn verify_checkpoint(&mut self, screen: &mut dyn ScreenGrabber) -> Result<bool> {
        let n = self.checkpoint_index;
        let live = screen.grab(&self.region)?;
        let matched = {
            let reference = self.reference(n)?;
            let matched = frames_match(reference, &live);
            if !matched {
                warn!(
                    checkpoint = n,
                    first_difference = ?first_difference(reference, &live),
                    "checkpoint differs from reference"
                );
            }
            matched
        };
        debug!(checkpoint = n, matched, "checkpoint verified");
        self.last_result = matched;
        self.checkpoint_index += 1;
        Ok(matched)
    }

    /// Restart numbering at 1 once the counter passes `total`. Returns true
    /// when it wrapped.
    pub fn wrap(&mut self, total: usize) -> bool {
        if self.checkpoint_index > total {
            self.checkpoint_index = 1;
            true
        } else {
            false
        }
    }

    /// Back to checkpoint 1 with a passing result, ready for replay.
    pub fn reset(&mut self) {
        self.checkpoint_index = 1;
        self.last_result = true;
    }

    fn reference(&mut self, n: usize) -> Result<&Frame> {
        match self.references.entry(n) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => Ok(slot.insert(self.store.load_checkpoint(n)?)),
        }
    }
}
