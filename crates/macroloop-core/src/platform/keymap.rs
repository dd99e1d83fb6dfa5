//! Translation between rdev's physical keys/buttons and the macro vocabulary

use crate::input::{Button, Key, NamedKey};
use rdev::Key as RKey;

/// Printable keys by their unshifted character (US layout).
const CHAR_KEYS: &[(char, RKey)] = &[
    ('`', RKey::BackQuote),
    ('1', RKey::Num1),
    ('2', RKey::Num2),
    ('3', RKey::Num3),
    ('4', RKey::Num4),
    ('5', RKey::Num5),
    ('6', RKey::Num6),
    ('7', RKey::Num7),
    ('8', RKey::Num8),
    ('9', RKey::Num9),
    ('0', RKey::Num0),
    ('-', RKey::Minus),
    ('=', RKey::Equal),
    ('q', RKey::KeyQ),
    ('w', RKey::KeyW),
    ('e', RKey::KeyE),
    ('r', RKey::KeyR),
    ('t', RKey::KeyT),
    ('y', RKey::KeyY),
    ('u', RKey::KeyU),
    ('i', RKey::KeyI),
    ('o', RKey::KeyO),
    ('p', RKey::KeyP),
    ('[', RKey::LeftBracket),
    (']', RKey::RightBracket),
    ('a', RKey::KeyA),
    ('s', RKey::KeyS),
    ('d', RKey::KeyD),
    ('f', RKey::KeyF),
    ('g', RKey::KeyG),
    ('h', RKey::KeyH),
    ('j', RKey::KeyJ),
    ('k', RKey::KeyK),
    ('l', RKey::KeyL),
    (';', RKey::SemiColon),
    ('\'', RKey::Quote),
    ('\\', RKey::BackSlash),
    ('z', RKey::KeyZ),
    ('x', RKey::KeyX),
    ('c', RKey::KeyC),
    ('v', RKey::KeyV),
    ('b', RKey::KeyB),
    ('n', RKey::KeyN),
    ('m', RKey::KeyM),
    (',', RKey::Comma),
    ('.', RKey::Dot),
    ('/', RKey::Slash),
];

/// Shifted characters map back to the key that produces them.
const SHIFTED: &[(char, char)] = &[
    ('~', '`'),
    ('!', '1'),
    ('@', '2'),
    ('#', '3'),
    ('$', '4'),
    ('%', '5'),
    ('^', '6'),
    ('&', '7'),
    ('*', '8'),
    ('(', '9'),
    (')', '0'),
    ('_', '-'),
    ('+', '='),
    ('{', '['),
    ('}', ']'),
    (':', ';'),
    ('"', '\''),
    ('|', '\\'),
    ('<', ','),
    ('>', '.'),
    ('?', '/'),
];

const NAMED_KEYS: &[(NamedKey, RKey)] = &[
    (NamedKey::Alt, RKey::Alt),
    (NamedKey::AltGr, RKey::AltGr),
    (NamedKey::Backspace, RKey::Backspace),
    (NamedKey::CapsLock, RKey::CapsLock),
    (NamedKey::Cmd, RKey::MetaLeft),
    (NamedKey::CmdRight, RKey::MetaRight),
    (NamedKey::Ctrl, RKey::ControlLeft),
    (NamedKey::CtrlRight, RKey::ControlRight),
    (NamedKey::Delete, RKey::Delete),
    (NamedKey::Down, RKey::DownArrow),
    (NamedKey::End, RKey::End),
    (NamedKey::Enter, RKey::Return),
    (NamedKey::Esc, RKey::Escape),
    (NamedKey::F1, RKey::F1),
    (NamedKey::F2, RKey::F2),
    (NamedKey::F3, RKey::F3),
    (NamedKey::F4, RKey::F4),
    (NamedKey::F5, RKey::F5),
    (NamedKey::F6, RKey::F6),
    (NamedKey::F7, RKey::F7),
    (NamedKey::F8, RKey::F8),
    (NamedKey::F9, RKey::F9),
    (NamedKey::F10, RKey::F10),
    (NamedKey::F11, RKey::F11),
    (NamedKey::F12, RKey::F12),
    (NamedKey::Function, RKey::Function),
    (NamedKey::Home, RKey::Home),
    (NamedKey::Insert, RKey::Insert),
    (NamedKey::Left, RKey::LeftArrow),
    (NamedKey::NumLock, RKey::NumLock),
    (NamedKey::PageDown, RKey::PageDown),
    (NamedKey::PageUp, RKey::PageUp),
    (NamedKey::Pause, RKey::Pause),
    (NamedKey::PrintScreen, RKey::PrintScreen),
    (NamedKey::Right, RKey::RightArrow),
    (NamedKey::ScrollLock, RKey::ScrollLock),
    (NamedKey::Shift, RKey::ShiftLeft),
    (NamedKey::ShiftRight, RKey::ShiftRight),
    (NamedKey::Space, RKey::Space),
    (NamedKey::Tab, RKey::Tab),
    (NamedKey::Up, RKey::UpArrow),
    (NamedKey::IntlBackslash, RKey::IntlBackslash),
    (NamedKey::Kp0, RKey::Kp0),
    (NamedKey::Kp1, RKey::Kp1),
    (NamedKey::Kp2, RKey::Kp2),
    (NamedKey::Kp3, RKey::Kp3),
    (NamedKey::Kp4, RKey::Kp4),
    (NamedKey::Kp5, RKey::Kp5),
    (NamedKey::Kp6, RKey::Kp6),
    (NamedKey::Kp7, RKey::Kp7),
    (NamedKey::Kp8, RKey::Kp8),
    (NamedKey::Kp9, RKey::Kp9),
    (NamedKey::KpDelete, RKey::KpDelete),
    (NamedKey::KpDivide, RKey::KpDivide),
    (NamedKey::KpEnter, RKey::KpReturn),
    (NamedKey::KpMinus, RKey::KpMinus),
    (NamedKey::KpMultiply, RKey::KpMultiply),
    (NamedKey::KpPlus, RKey::KpPlus),
];

pub fn from_rdev_key(key: RKey) -> Option<Key> {
    if let RKey::Unknown(code) = key {
        return Some(Key::Code(code));
    }
    if let Some((c, _)) = CHAR_KEYS.iter().find(|(_, k)| *k == key) {
        return Some(Key::Char(*c));
    }
    NAMED_KEYS
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(n, _)| Key::Named(*n))
}

pub fn to_rdev_key(key: &Key) -> Option<RKey> {
    match key {
        Key::Code(code) => Some(RKey::Unknown(*code)),
        Key::Named(named) => NAMED_KEYS
            .iter()
            .find(|(n, _)| n == named)
            .map(|(_, k)| *k),
        Key::Char(' ') => Some(RKey::Space),
        Key::Char('\t') => Some(RKey::Tab),
        Key::Char('\n') | Key::Char('\r') => Some(RKey::Return),
        Key::Char(c) => {
            let c = c.to_ascii_lowercase();
            let base = SHIFTED
                .iter()
                .find(|(shifted, _)| *shifted == c)
                .map(|(_, base)| *base)
                .unwrap_or(c);
            CHAR_KEYS.iter().find(|(ch, _)| *ch == base).map(|(_, k)| *k)
        }
    }
}

pub fn from_rdev_button(button: rdev::Button) -> Button {
    match button {
        rdev::Button::Left => Button::Left,
        rdev::Button::Right => Button::Right,
        rdev::Button::Middle => Button::Middle,
        rdev::Button::Unknown(n) => Button::Other(n),
    }
}

pub fn to_rdev_button(button: Button) -> rdev::Button {
    match button {
        Button::Left => rdev::Button::Left,
        Button::Right => rdev::Button::Right,
        Button::Middle => rdev::Button::Middle,
        Button::Other(n) => rdev::Button::Unknown(n),
    }
}
