//! EventLog - the ordered text records of one recording
//!
//! Persisted as `macro.txt`, one record per line, closed by a trailer line
//! `end:\t<count>`. Files without the trailer are still accepted.

use crate::events::{Action, Step, RECORD_SEPARATOR};
use crate::storage::MacroStore;
use macroloop_core::{Error, Result};
use std::path::PathBuf;

const TRAILER_TAG: &str = "end";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    records: Vec<String>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: impl Into<String>) {
        self.records.push(record.into());
    }

    /// Format and append one action at `offset` seconds.
    pub fn push(&mut self, offset: f64, action: &Action) {
        self.append(format!("{}{}{}", offset, RECORD_SEPARATOR, action));
    }

    pub fn records(&self) -> &[String] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse every record into a step. Fails on the first bad line.
    pub fn steps(&self) -> Result<Vec<Step>> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| Step::parse_record(i + 1, record))
            .collect()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(record);
            out.push('\n');
        }
        out.push_str(&format!("{}{}{}\n", TRAILER_TAG, RECORD_SEPARATOR, self.records.len()));
        out
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut records: Vec<String> = text.lines().map(str::to_string).collect();

        // `lines()` already drops the entry after the final newline; any other
        // trailing blanks come from hand edits.
        while records.last().is_some_and(|r| r.trim().is_empty()) {
            records.pop();
        }

        if let Some(last) = records.last() {
            if let Some(count) = trailer_count(last) {
                let line = records.len();
                let count = count.map_err(|_| Error::invalid_format(line, last, "bad record count"))?;
                records.pop();
                if count != records.len() {
                    return Err(Error::invalid_format(
                        line,
                        &format!("{}{}{}", TRAILER_TAG, RECORD_SEPARATOR, count),
                        &format!("trailer expects {} records, found {}", count, records.len()),
                    ));
                }
            }
        }

        Ok(Self { records })
    }

    /// Write `macro.txt`, replacing any previous recording.
    pub fn save(&self, store: &MacroStore) -> Result<PathBuf> {
        let path = store.macro_path();
        store.write_text(&path, &self.render())?;
        Ok(path)
    }

    pub fn load(store: &MacroStore) -> Result<Self> {
        let text = store.read_text(&store.macro_path())?;
        Self::parse(&text)
    }
}

fn trailer_count(line: &str) -> Option<std::result::Result<usize, std::num::ParseIntError>> {
    line.strip_prefix(TRAILER_TAG)
        .and_then(|rest| rest.strip_prefix(RECORD_SEPARATOR))
        .map(|n| n.trim().parse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroloop_core::{Button, ErrorCode, Key, NamedKey, Point};

    fn sample() -> EventLog {
        let mut log = EventLog::new();
        log.push(
            0.0,
            &Action::Click {
                button: Button::Left,
                position: Point::new(10, 20),
            },
        );
        log.push(0.5, &Action::KeyPress(Key::Char('a')));
        log.push(0.6, &Action::KeyRelease(Key::Named(NamedKey::Shift)));
        log.push(1.5, &Action::Screenshot);
        log
    }

    #[test]
    fn render_adds_trailer() {
        let text = sample().render();
        assert!(text.starts_with("0:\tclick(Button.left, 10, 20)\n"));
        assert!(text.ends_with("1.5:\tscreenshot\nend:\t4\n"));
    }

    #[test]
    fn parse_reads_rendered_text() {
        let log = sample();
        assert_eq!(EventLog::parse(&log.render()).unwrap(), log);
    }

    #[test]
    fn parse_accepts_trailerless_files() {
        let log = EventLog::parse("0.0:\tclick(Button.left, 10, 20)\n1.5:\tscreenshot\n").unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[1], "1.5:\tscreenshot");
    }

    #[test]
    fn truncated_file_is_a_format_error() {
        let err = EventLog::parse("0.0:\tscreenshot\nend:\t3\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn steps_report_the_failing_line() {
        let mut log = sample();
        log.append("2.0:\tdance()");
        let err = log.steps().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert!(err.message.starts_with("line 5:"));
    }

    #[test]
    fn save_then_load_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = MacroStore::at(dir.path());
        let log = sample();

        let path = log.save(&store).unwrap();
        assert_eq!(path, dir.path().join("macro.txt"));
        let loaded = EventLog::load(&store).unwrap();
        assert_eq!(loaded.records(), log.records());
        assert_eq!(loaded.steps().unwrap(), log.steps().unwrap());

        // Saving again overwrites rather than appends.
        log.save(&store).unwrap();
        assert_eq!(EventLog::load(&store).unwrap().len(), log.len());
    }

    #[test]
    fn load_without_a_file_is_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EventLog::load(&MacroStore::at(dir.path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingFile);
    }
}
