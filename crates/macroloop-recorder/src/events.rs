//! Recorded actions and their direction strings
//!
//! One record per line in `macro.txt`:
//!
//! ```text
//! 0.41:	click(Button.left, 812, 377)
//! 1.02:	key_press('a')
//! 1.13:	key_release(Key.shift)
//! 2.5:	screenshot
//! ```

use macroloop_core::{Button, Error, Key, Point, Result};
use serde::Serialize;
use std::fmt;

/// Separator between the offset and the direction string.
pub const RECORD_SEPARATOR: &str = ":\t";

/// One recorded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Click { button: Button, position: Point },
    KeyPress(Key),
    KeyRelease(Key),
    Screenshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    KeyPress,
    KeyRelease,
    Screenshot,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Click { .. } => ActionKind::Click,
            Action::KeyPress(_) => ActionKind::KeyPress,
            Action::KeyRelease(_) => ActionKind::KeyRelease,
            Action::Screenshot => ActionKind::Screenshot,
        }
    }

    pub fn is_screenshot(&self) -> bool {
        matches!(self, Action::Screenshot)
    }

    /// Parse a direction string. Returns a plain reason on failure; the
    /// caller attaches the line number.
    pub fn parse_direction(s: &str) -> std::result::Result<Self, String> {
        let s = s.trim();
        if s == "screenshot" {
            return Ok(Action::Screenshot);
        }

        let (name, args) = s
            .split_once('(')
            .and_then(|(name, rest)| rest.strip_suffix(')').map(|args| (name.trim(), args)))
            .ok_or_else(|| format!("unrecognized direction {:?}", s))?;

        match name {
            "click" => parse_click(args),
            "key_press" => parse_key(args).map(Action::KeyPress),
            "key_release" => parse_key(args).map(Action::KeyRelease),
            other => Err(format!("unknown action {:?}", other)),
        }
    }
}

fn parse_click(args: &str) -> std::result::Result<Action, String> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let [button, x, y] = parts.as_slice() else {
        return Err(format!("click expects (button, x, y), got ({})", args));
    };
    let button: Button = button.parse().map_err(|e: Error| e.message)?;
    Ok(Action::Click {
        button,
        position: Point::new(coordinate(x)?, coordinate(y)?),
    })
}

/// Some listeners report fractional positions; round to the pixel grid.
fn coordinate(v: &str) -> std::result::Result<i32, String> {
    v.parse::<i32>()
        .or_else(|_| v.parse::<f64>().map(|f| f.round() as i32))
        .map_err(|_| format!("bad coordinate {:?}", v))
}

fn parse_key(args: &str) -> std::result::Result<Key, String> {
    // Only strip outside the quotes: `' '` is the space key.
    args.trim_matches(|c: char| c == ' ' || c == '\t')
        .parse::<Key>()
        .map_err(|e| e.message)
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Click { button, position } => {
                write!(f, "click({}, {}, {})", button, position.x, position.y)
            }
            Action::KeyPress(key) => write!(f, "key_press({})", key),
            Action::KeyRelease(key) => write!(f, "key_release({})", key),
            Action::Screenshot => f.write_str("screenshot"),
        }
    }
}

/// An action bound to its due offset, in seconds from loop start.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub offset: f64,
    pub action: Action,
}

impl Step {
    pub fn new(offset: f64, action: Action) -> Self {
        Self { offset, action }
    }

    /// Parse one `"<offset>:\t<direction>"` record. `line` is 1-based.
    pub fn parse_record(line: usize, record: &str) -> Result<Self> {
        let (offset, direction) = record
            .split_once(RECORD_SEPARATOR)
            .ok_or_else(|| Error::invalid_format(line, record, "missing offset separator"))?;
        let offset: f64 = offset
            .trim()
            .parse()
            .map_err(|_| Error::invalid_format(line, record, "offset is not a number"))?;
        if !offset.is_finite() || offset < 0.0 {
            return Err(Error::invalid_format(line, record, "offset must be a non-negative number"));
        }
        let action = Action::parse_direction(direction)
            .map_err(|reason| Error::invalid_format(line, record, &reason))?;
        Ok(Self { offset, action })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.offset, RECORD_SEPARATOR, self.action)
    }
}
