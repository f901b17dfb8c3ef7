use brutal_engine::{Binding, InputAction, KeyCode, MOUSE_BUTTON_COUNT};

use super::settings::SettingsError;

const MOUSE_PREFIX: &str = "mouse";

const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("escape", KeyCode::Escape),
    ("space", KeyCode::Space),
    ("return", KeyCode::Enter),
    ("enter", KeyCode::Enter),
    ("tab", KeyCode::Tab),
    ("backspace", KeyCode::Backspace),
    ("insert", KeyCode::Insert),
    ("delete", KeyCode::Delete),
    ("home", KeyCode::Home),
    ("end", KeyCode::End),
    ("pageup", KeyCode::PageUp),
    ("pagedown", KeyCode::PageDown),
    ("left", KeyCode::ArrowLeft),
    ("right", KeyCode::ArrowRight),
    ("up", KeyCode::ArrowUp),
    ("down", KeyCode::ArrowDown),
    ("lshift", KeyCode::ShiftLeft),
    ("rshift", KeyCode::ShiftRight),
    ("lctrl", KeyCode::ControlLeft),
    ("rctrl", KeyCode::ControlRight),
    ("lalt", KeyCode::AltLeft),
    ("ralt", KeyCode::AltRight),
    ("f1", KeyCode::F1),
    ("f2", KeyCode::F2),
    ("f3", KeyCode::F3),
    ("f4", KeyCode::F4),
    ("f5", KeyCode::F5),
    ("f6", KeyCode::F6),
    ("f7", KeyCode::F7),
    ("f8", KeyCode::F8),
    ("f9", KeyCode::F9),
    ("f10", KeyCode::F10),
    ("f11", KeyCode::F11),
    ("f12", KeyCode::F12),
    ("kp0", KeyCode::Numpad0),
    ("kp1", KeyCode::Numpad1),
    ("kp2", KeyCode::Numpad2),
    ("kp3", KeyCode::Numpad3),
    ("kp4", KeyCode::Numpad4),
    ("kp5", KeyCode::Numpad5),
    ("kp6", KeyCode::Numpad6),
    ("kp7", KeyCode::Numpad7),
    ("kp8", KeyCode::Numpad8),
    ("kp9", KeyCode::Numpad9),
];

/// Resolves a control value from the settings file. Accepts `mouse1` to
/// `mouse3`, a single character, or a key name from `NAMED_KEYS`.
pub(crate) fn parse_control(
    control: &'static str,
    action: InputAction,
    raw: &str,
) -> Result<Binding, SettingsError> {
    let value = raw.trim().to_ascii_lowercase();

    if let Some(button) = mouse_button(&value) {
        if !action.allows_mouse() {
            return Err(SettingsError::MouseNotAllowed { control });
        }
        return Ok(Binding::Mouse(button));
    }

    let mut chars = value.chars();
    let key = match (chars.next(), chars.next()) {
        (Some(single), None) => char_key(single),
        _ => named_key(&value),
    };

    key.map(Binding::Key)
        .ok_or_else(|| SettingsError::InvalidControl {
            control,
            value: raw.to_string(),
        })
}

pub(crate) fn named_key(name: &str) -> Option<KeyCode> {
    NAMED_KEYS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, code)| *code)
}

fn mouse_button(value: &str) -> Option<u8> {
    let digit = value.strip_prefix(MOUSE_PREFIX)?;
    let number = digit.parse::<u8>().ok()?;
    if (1..=MOUSE_BUTTON_COUNT as u8).contains(&number) && digit.len() == 1 {
        Some(number - 1)
    } else {
        None
    }
}

fn char_key(c: char) -> Option<KeyCode> {
    let code = match c {
        'a' => KeyCode::KeyA,
        'b' => KeyCode::KeyB,
        'c' => KeyCode::KeyC,
        'd' => KeyCode::KeyD,
        'e' => KeyCode::KeyE,
        'f' => KeyCode::KeyF,
        'g' => KeyCode::KeyG,
        'h' => KeyCode::KeyH,
        'i' => KeyCode::KeyI,
        'j' => KeyCode::KeyJ,
        'k' => KeyCode::KeyK,
        'l' => KeyCode::KeyL,
        'm' => KeyCode::KeyM,
        'n' => KeyCode::KeyN,
        'o' => KeyCode::KeyO,
        'p' => KeyCode::KeyP,
        'q' => KeyCode::KeyQ,
        'r' => KeyCode::KeyR,
        's' => KeyCode::KeyS,
        't' => KeyCode::KeyT,
        'u' => KeyCode::KeyU,
        'v' => KeyCode::KeyV,
        'w' => KeyCode::KeyW,
        'x' => KeyCode::KeyX,
        'y' => KeyCode::KeyY,
        'z' => KeyCode::KeyZ,
        '0' => KeyCode::Digit0,
        '1' => KeyCode::Digit1,
        '2' => KeyCode::Digit2,
        '3' => KeyCode::Digit3,
        '4' => KeyCode::Digit4,
        '5' => KeyCode::Digit5,
        '6' => KeyCode::Digit6,
        '7' => KeyCode::Digit7,
        '8' => KeyCode::Digit8,
        '9' => KeyCode::Digit9,
        '-' => KeyCode::Minus,
        '=' => KeyCode::Equal,
        '[' => KeyCode::BracketLeft,
        ']' => KeyCode::BracketRight,
        ';' => KeyCode::Semicolon,
        '\'' => KeyCode::Quote,
        ',' => KeyCode::Comma,
        '.' => KeyCode::Period,
        '/' => KeyCode::Slash,
        '\\' => KeyCode::Backslash,
        '`' => KeyCode::Backquote,
        _ => return None,
    };
    Some(code)
}
