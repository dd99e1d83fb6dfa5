//! Mouse buttons, keys, observed input events and the simulation seam
//!
//! Text forms follow the macro file vocabulary:
//!   Button.left            - mouse button
//!   'a'                    - printable key
//!   Key.enter              - named key
//!   <65437>                - raw platform key code

use crate::error::{Error, ErrorCode, Result};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefixes written by older recordings; accepted and ignored on parse.
const LEGACY_MOUSE_PREFIX: &str = "pynput.mouse.";
const LEGACY_KEYBOARD_PREFIX: &str = "pynput.keyboard.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
    Middle,
    Other(u8),
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Button::Left => f.write_str("Button.left"),
            Button::Right => f.write_str("Button.right"),
            Button::Middle => f.write_str("Button.middle"),
            Button::Other(n) => write!(f, "Button.button{}", n),
        }
    }
}

impl FromStr for Button {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let name = s.strip_prefix(LEGACY_MOUSE_PREFIX).unwrap_or(s);
        let name = name.strip_prefix("Button.").unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "left" => Ok(Button::Left),
            "right" => Ok(Button::Right),
            "middle" => Ok(Button::Middle),
            other => other
                .strip_prefix("button")
                .and_then(|n| n.parse().ok())
                .map(Button::Other)
                .ok_or_else(|| Error::new(ErrorCode::InvalidFormat, format!("Unknown button: {}", s))),
        }
    }
}

macro_rules! named_keys {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Non-printable keys, named as they appear after `Key.` in macro files.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NamedKey {
            $($variant),*
        }

        impl NamedKey {
            pub const ALL: &'static [NamedKey] = &[$(NamedKey::$variant),*];

            pub fn name(&self) -> &'static str {
                match self {
                    $(NamedKey::$variant => $name),*
                }
            }

            fn from_canonical(s: &str) -> Option<Self> {
                match s {
                    $($name => Some(NamedKey::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

named_keys! {
    Alt => "alt",
    AltGr => "alt_gr",
    Backspace => "backspace",
    CapsLock => "caps_lock",
    Cmd => "cmd",
    CmdRight => "cmd_r",
    Ctrl => "ctrl",
    CtrlRight => "ctrl_r",
    Delete => "delete",
    Down => "down",
    End => "end",
    Enter => "enter",
    Esc => "esc",
    F1 => "f1",
    F2 => "f2",
    F3 => "f3",
    F4 => "f4",
    F5 => "f5",
    F6 => "f6",
    F7 => "f7",
    F8 => "f8",
    F9 => "f9",
    F10 => "f10",
    F11 => "f11",
    F12 => "f12",
    Function => "fn",
    Home => "home",
    Insert => "insert",
    Left => "left",
    NumLock => "num_lock",
    PageDown => "page_down",
    PageUp => "page_up",
    Pause => "pause",
    PrintScreen => "print_screen",
    Right => "right",
    ScrollLock => "scroll_lock",
    Shift => "shift",
    ShiftRight => "shift_r",
    Space => "space",
    Tab => "tab",
    Up => "up",
    IntlBackslash => "intl_backslash",
    Kp0 => "kp_0",
    Kp1 => "kp_1",
    Kp2 => "kp_2",
    Kp3 => "kp_3",
    Kp4 => "kp_4",
    Kp5 => "kp_5",
    Kp6 => "kp_6",
    Kp7 => "kp_7",
    Kp8 => "kp_8",
    Kp9 => "kp_9",
    KpDelete => "kp_delete",
    KpDivide => "kp_divide",
    KpEnter => "kp_enter",
    KpMinus => "kp_minus",
    KpMultiply => "kp_multiply",
    KpPlus => "kp_plus",
}

impl NamedKey {
    /// Case-insensitive lookup, including common aliases.
    pub fn from_name(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let canonical = match lower.as_str() {
            "return" => "enter",
            "escape" => "esc",
            "ctrl_l" | "control" => "ctrl",
            "shift_l" => "shift",
            "cmd_l" | "command" | "meta" => "cmd",
            "alt_l" | "option" => "alt",
            "alt_r" => "alt_gr",
            "pageup" => "page_up",
            "pagedown" => "page_down",
            other => other,
        };
        Self::from_canonical(canonical)
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Key {
    /// Printable key, unshifted.
    Char(char),
    Named(NamedKey),
    /// Platform key code with no portable name.
    Code(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char('\'') => f.write_str(r"'\''"),
            Key::Char('\\') => f.write_str(r"'\\'"),
            Key::Char('\n') => f.write_str(r"'\n'"),
            Key::Char('\r') => f.write_str(r"'\r'"),
            Key::Char('\t') => f.write_str(r"'\t'"),
            Key::Char(c) if c.is_control() => write!(f, "'\\x{:02x}'", *c as u32),
            Key::Char(c) => write!(f, "'{}'", c),
            Key::Named(k) => write!(f, "Key.{}", k),
            Key::Code(code) => write!(f, "<{}>", code),
        }
    }
}

impl FromStr for Key {
    type Err = Error;

    /// Accepts the macro file forms (`'a'`, `Key.enter`, `<65437>`) as well as
    /// bare names and single characters for command-line use (`enter`, `q`).
    fn from_str(s: &str) -> Result<Self> {
        let unknown = || Error::new(ErrorCode::InvalidFormat, format!("Unknown key: {}", s));
        let t = s.trim_matches(|c: char| c == '\n' || c == '\r');
        if t.is_empty() {
            return Err(unknown());
        }
        let t = t.strip_prefix(LEGACY_KEYBOARD_PREFIX).unwrap_or(t);

        if let Some(inner) = quoted(t, '\'').or_else(|| quoted(t, '"')) {
            let c = unescape_char(inner).ok_or_else(unknown)?;
            return Ok(Key::Char(c));
        }

        if let Some(code) = t.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
            return code.parse().map(Key::Code).map_err(|_| unknown());
        }

        let name = t.strip_prefix("Key.").unwrap_or(t);
        if let Some(named) = NamedKey::from_name(name) {
            return Ok(Key::Named(named));
        }

        let mut chars = t.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Key::Char(c)),
            _ => Err(unknown()),
        }
    }
}

/// One character written the way older recordings quote it: literal, or a
/// backslash escape (`\n`, `\t`, `\x03`, `\u00e9`, `\U0001f600`).
fn unescape_char(inner: &str) -> Option<char> {
    let Some(rest) = inner.strip_prefix('\\') else {
        let mut chars = inner.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        };
    };
    let hex = |digits: &str, width: usize| {
        if digits.len() != width || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
    };
    match rest {
        "'" => Some('\''),
        "\"" => Some('"'),
        "\\" => Some('\\'),
        "n" => Some('\n'),
        "r" => Some('\r'),
        "t" => Some('\t'),
        "0" => Some('\0'),
        _ => {
            let mut chars = rest.chars();
            let kind = chars.next()?;
            let digits = chars.as_str();
            match kind {
                'x' => hex(digits, 2),
                'u' => hex(digits, 4),
                'U' => hex(digits, 8),
                _ => None,
            }
        }
    }
}

fn quoted(s: &str, q: char) -> Option<&str> {
    if s.len() >= 3 {
        s.strip_prefix(q).and_then(|r| r.strip_suffix(q))
    } else {
        None
    }
}

impl From<Key> for String {
    fn from(k: Key) -> Self {
        k.to_string()
    }
}

impl TryFrom<String> for Key {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// One observed user input, as delivered by an input listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Click {
        button: Button,
        position: Point,
        pressed: bool,
    },
    KeyPress(Key),
    KeyRelease(Key),
}

/// Synthesizes input. Implemented by the OS backend and by test doubles.
pub trait InputSimulator {
    fn move_to(&mut self, position: Point) -> Result<()>;
    fn click(&mut self, button: Button) -> Result<()>;
    fn key_press(&mut self, key: &Key) -> Result<()>;
    fn key_release(&mut self, key: &Key) -> Result<()>;
}
