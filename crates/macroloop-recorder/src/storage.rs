//! Macro directory layout
//!
//! ```text
//! <dir>/macro.txt       recorded actions
//! <dir>/box.txt         checkpoint region, "x0xy0 x1xy1"
//! <dir>/screen1.png     reference image per checkpoint, 1-based
//! ```

use macroloop_core::{BoundingBox, Error, Frame, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const MACRO_FILE: &str = "macro.txt";
pub const BOX_FILE: &str = "box.txt";

pub fn screen_file(n: usize) -> String {
    format!("screen{}.png", n)
}

#[derive(Debug, Clone)]
pub struct MacroStore {
    dir: PathBuf,
}

impl MacroStore {
    /// Address a directory without touching the filesystem.
    pub fn at(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Existing macro directory; fails when it is missing.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let store = Self::at(dir);
        if !store.dir.is_dir() {
            return Err(Error::macro_not_found(&store.dir));
        }
        Ok(store)
    }

    /// Directory for a fresh recording, created if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let store = Self::at(dir);
        fs::create_dir_all(&store.dir).map_err(|e| Error::io(&store.dir, e))?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn macro_path(&self) -> PathBuf {
        self.dir.join(MACRO_FILE)
    }

    pub fn box_path(&self) -> PathBuf {
        self.dir.join(BOX_FILE)
    }

    pub fn screen_path(&self, n: usize) -> PathBuf {
        self.dir.join(screen_file(n))
    }

    /// True when both the log and the region are present.
    pub fn is_complete(&self) -> bool {
        self.macro_path().is_file() && self.box_path().is_file()
    }

    pub fn write_text(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).map_err(|e| Error::io(path, e))
    }

    pub fn read_text(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::missing_file(path),
            _ => Error::io(path, e),
        })
    }

    pub fn save_box(&self, region: &BoundingBox) -> Result<PathBuf> {
        let path = self.box_path();
        self.write_text(&path, &format!("{}\n", region))?;
        Ok(path)
    }

    pub fn load_box(&self) -> Result<BoundingBox> {
        self.read_text(&self.box_path())?.trim().parse()
    }

    pub fn save_checkpoint(&self, n: usize, frame: &Frame) -> Result<PathBuf> {
        let path = self.screen_path(n);
        frame.save_with_format(&path, image::ImageFormat::Png)?;
        Ok(path)
    }

    pub fn load_checkpoint(&self, n: usize) -> Result<Frame> {
        let path = self.screen_path(n);
        if !path.is_file() {
            return Err(Error::missing_file(&path));
        }
        Ok(image::open(&path)?.to_rgba8())
    }

    /// Checkpoint numbers with an image on disk, ascending.
    pub fn checkpoints(&self) -> Result<Vec<usize>> {
        let mut numbers = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))? {
            let entry = entry.map_err(|e| Error::io(&self.dir, e))?;
            let name = entry.file_name();
            if let Some(n) = name
                .to_str()
                .and_then(|s| s.strip_prefix("screen"))
                .and_then(|s| s.strip_suffix(".png"))
                .and_then(|s| s.parse().ok())
            {
                numbers.push(n);
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }

    /// Macro directories directly under `root`, sorted by path.
    pub fn discover(root: impl AsRef<Path>) -> Result<Vec<MacroStore>> {
        let root = root.as_ref();
        let mut found = Vec::new();
        for entry in fs::read_dir(root).map_err(|e| Error::io(root, e))? {
            let entry = entry.map_err(|e| Error::io(root, e))?;
            let store = MacroStore::at(entry.path());
            if store.macro_path().is_file() {
                found.push(store);
            }
        }
        found.sort_by(|a, b| a.dir.cmp(&b.dir));
        Ok(found)
    }
}
