use std::collections::HashSet;

use thiserror::Error;
use winit::keyboard::KeyCode;

pub const MOUSE_BUTTON_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    NewGame,
    TogglePause,
    ToggleMute,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Shot,
    Slash,
}

const ACTION_COUNT: usize = 9;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::NewGame,
        InputAction::TogglePause,
        InputAction::ToggleMute,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::Shot,
        InputAction::Slash,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::NewGame => 0,
            InputAction::TogglePause => 1,
            InputAction::ToggleMute => 2,
            InputAction::MoveLeft => 3,
            InputAction::MoveRight => 4,
            InputAction::MoveUp => 5,
            InputAction::MoveDown => 6,
            InputAction::Shot => 7,
            InputAction::Slash => 8,
        }
    }

    pub const fn alias(self) -> &'static str {
        match self {
            InputAction::NewGame => "new",
            InputAction::TogglePause => "pause",
            InputAction::ToggleMute => "mute",
            InputAction::MoveLeft => "left",
            InputAction::MoveRight => "right",
            InputAction::MoveUp => "up",
            InputAction::MoveDown => "down",
            InputAction::Shot => "shot",
            InputAction::Slash => "slash",
        }
    }

    /// Only the two attack actions may be driven by a mouse button.
    pub const fn allows_mouse(self) -> bool {
        matches!(self, InputAction::Shot | InputAction::Slash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Key(KeyCode),
    /// Zero-based mouse button index: 0 left, 1 middle, 2 right.
    Mouse(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("{alias}: mouse is not a suitable control")]
    MouseNotAllowed { alias: &'static str },
    #[error("{alias}: mouse button index {index} is out of range")]
    MouseButtonOutOfRange { alias: &'static str, index: u8 },
    #[error("{alias}: bound more than once")]
    DuplicateBinding { alias: &'static str },
    #[error("{alias}: no control bound")]
    Unbound { alias: &'static str },
}

/// Validated alias to physical input mapping. Every action has exactly one
/// binding, and only attack actions are mouse-bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingTable {
    bindings: [Binding; ACTION_COUNT],
}

impl BindingTable {
    pub fn from_bindings<I>(bindings: I) -> Result<Self, BindingError>
    where
        I: IntoIterator<Item = (InputAction, Binding)>,
    {
        let mut slots: [Option<Binding>; ACTION_COUNT] = [None; ACTION_COUNT];
        for (action, binding) in bindings {
            if let Binding::Mouse(index) = binding {
                if !action.allows_mouse() {
                    return Err(BindingError::MouseNotAllowed {
                        alias: action.alias(),
                    });
                }
                if usize::from(index) >= MOUSE_BUTTON_COUNT {
                    return Err(BindingError::MouseButtonOutOfRange {
                        alias: action.alias(),
                        index,
                    });
                }
            }

            let slot = &mut slots[action.index()];
            if slot.is_some() {
                return Err(BindingError::DuplicateBinding {
                    alias: action.alias(),
                });
            }
            *slot = Some(binding);
        }

        let mut resolved = [Binding::Key(KeyCode::Escape); ACTION_COUNT];
        for action in InputAction::ALL {
            resolved[action.index()] = slots[action.index()].ok_or(BindingError::Unbound {
                alias: action.alias(),
            })?;
        }

        Ok(Self { bindings: resolved })
    }

    pub fn binding(&self, action: InputAction) -> Binding {
        self.bindings[action.index()]
    }

    pub fn key(&self, action: InputAction) -> Option<KeyCode> {
        match self.binding(action) {
            Binding::Key(code) => Some(code),
            Binding::Mouse(_) => None,
        }
    }

    pub fn mouse(&self, action: InputAction) -> Option<u8> {
        match self.binding(action) {
            Binding::Mouse(index) => Some(index),
            Binding::Key(_) => None,
        }
    }

    pub fn matches_key(&self, action: InputAction, code: KeyCode) -> bool {
        self.key(action) == Some(code)
    }
}

impl Default for BindingTable {
    fn default() -> Self {
        Self {
            bindings: [
                Binding::Key(KeyCode::F2),
                Binding::Key(KeyCode::KeyP),
                Binding::Key(KeyCode::KeyM),
                Binding::Key(KeyCode::KeyA),
                Binding::Key(KeyCode::KeyD),
                Binding::Key(KeyCode::KeyW),
                Binding::Key(KeyCode::KeyS),
                Binding::Mouse(0),
                Binding::Mouse(2),
            ],
        }
    }
}

/// Pressed state of every physical key and mouse button at sampling time.
#[derive(Debug, Clone, Default)]
pub struct PressedInputs {
    keys: HashSet<KeyCode>,
    mouse_buttons: [bool; MOUSE_BUTTON_COUNT],
}

impl PressedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, code: KeyCode, is_down: bool) {
        if is_down {
            self.keys.insert(code);
        } else {
            self.keys.remove(&code);
        }
    }

    pub fn set_mouse_button(&mut self, index: u8, is_down: bool) {
        if let Some(slot) = self.mouse_buttons.get_mut(usize::from(index)) {
            *slot = is_down;
        }
    }

    pub fn is_key_down(&self, code: KeyCode) -> bool {
        self.keys.contains(&code)
    }

    pub fn is_mouse_down(&self, index: u8) -> bool {
        self.mouse_buttons
            .get(usize::from(index))
            .copied()
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.mouse_buttons = [false; MOUSE_BUTTON_COUNT];
    }

    pub fn with_key_down(mut self, code: KeyCode) -> Self {
        self.set_key(code, true);
        self
    }

    pub fn with_mouse_down(mut self, index: u8) -> Self {
        self.set_mouse_button(index, true);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionalIntent {
    pub x: i8,
    pub y: i8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslatedInput {
    pub intent: DirectionalIntent,
    pub firing: bool,
    pub slashing: bool,
}

pub fn translate(pressed: &PressedInputs, bindings: &BindingTable) -> TranslatedInput {
    let x = axis(pressed, bindings, InputAction::MoveLeft, InputAction::MoveRight);
    let y = axis(pressed, bindings, InputAction::MoveUp, InputAction::MoveDown);

    TranslatedInput {
        intent: DirectionalIntent { x, y },
        firing: is_action_down(pressed, bindings, InputAction::Shot),
        slashing: is_action_down(pressed, bindings, InputAction::Slash),
    }
}

fn axis(
    pressed: &PressedInputs,
    bindings: &BindingTable,
    positive: InputAction,
    negative: InputAction,
) -> i8 {
    i8::from(is_action_down(pressed, bindings, positive))
        - i8::from(is_action_down(pressed, bindings, negative))
}

fn is_action_down(pressed: &PressedInputs, bindings: &BindingTable, action: InputAction) -> bool {
    match bindings.key(action) {
        Some(code) => pressed.is_key_down(code),
        None => bindings
            .mouse(action)
            .is_some_and(|index| pressed.is_mouse_down(index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_keys_table() -> BindingTable {
        BindingTable::from_bindings([
            (InputAction::NewGame, Binding::Key(KeyCode::F2)),
            (InputAction::TogglePause, Binding::Key(KeyCode::KeyP)),
            (InputAction::ToggleMute, Binding::Key(KeyCode::KeyM)),
            (InputAction::MoveLeft, Binding::Key(KeyCode::ArrowLeft)),
            (InputAction::MoveRight, Binding::Key(KeyCode::ArrowRight)),
            (InputAction::MoveUp, Binding::Key(KeyCode::ArrowUp)),
            (InputAction::MoveDown, Binding::Key(KeyCode::ArrowDown)),
            (InputAction::Shot, Binding::Key(KeyCode::KeyJ)),
            (InputAction::Slash, Binding::Key(KeyCode::KeyK)),
        ])
        .expect("valid table")
    }

    #[test]
    fn opposing_keys_cancel_out() {
        let bindings = BindingTable::default();
        let pressed = PressedInputs::new()
            .with_key_down(KeyCode::KeyA)
            .with_key_down(KeyCode::KeyD)
            .with_key_down(KeyCode::KeyW);

        let translated = translate(&pressed, &bindings);
        assert_eq!(translated.intent, DirectionalIntent { x: 0, y: 1 });
    }

    #[test]
    fn left_and_down_map_to_positive_x_negative_y() {
        let bindings = BindingTable::default();
        let pressed = PressedInputs::new()
            .with_key_down(KeyCode::KeyA)
            .with_key_down(KeyCode::KeyS);

        let translated = translate(&pressed, &bindings);
        assert_eq!(translated.intent, DirectionalIntent { x: 1, y: -1 });
    }

    #[test]
    fn attacks_fall_back_to_mouse_buttons() {
        let bindings = BindingTable::default();
        let pressed = PressedInputs::new().with_mouse_down(2);

        let translated = translate(&pressed, &bindings);
        assert!(!translated.firing);
        assert!(translated.slashing);
    }

    #[test]
    fn key_bound_attack_ignores_mouse_state() {
        let bindings = all_keys_table();
        let pressed = PressedInputs::new()
            .with_mouse_down(0)
            .with_key_down(KeyCode::KeyK);

        let translated = translate(&pressed, &bindings);
        assert!(!translated.firing);
        assert!(translated.slashing);
    }

    #[test]
    fn released_key_is_no_longer_down() {
        let mut pressed = PressedInputs::new().with_key_down(KeyCode::KeyD);
        pressed.set_key(KeyCode::KeyD, false);

        let translated = translate(&pressed, &BindingTable::default());
        assert_eq!(translated.intent, DirectionalIntent::default());
    }

    #[test]
    fn clear_releases_keys_and_buttons() {
        let mut pressed = PressedInputs::new()
            .with_key_down(KeyCode::KeyW)
            .with_mouse_down(0);
        pressed.clear();

        assert!(!pressed.is_key_down(KeyCode::KeyW));
        assert!(!pressed.is_mouse_down(0));
    }

    #[test]
    fn out_of_range_mouse_button_is_never_down() {
        let pressed = PressedInputs::new().with_mouse_down(7);
        assert!(!pressed.is_mouse_down(7));
    }

    #[test]
    fn mouse_binding_rejected_for_movement() {
        let mut entries = all_keys_table_entries();
        entries[3] = (InputAction::MoveLeft, Binding::Mouse(0));

        let error = BindingTable::from_bindings(entries).expect_err("mouse move");
        assert_eq!(error, BindingError::MouseNotAllowed { alias: "left" });
    }

    #[test]
    fn missing_alias_is_rejected() {
        let entries = all_keys_table_entries();
        let error = BindingTable::from_bindings(entries.into_iter().take(8)).expect_err("unbound");
        assert_eq!(error, BindingError::Unbound { alias: "slash" });
    }

    #[test]
    fn duplicate_alias_is_rejected() {
        let mut entries = all_keys_table_entries().to_vec();
        entries.push((InputAction::Shot, Binding::Mouse(1)));

        let error = BindingTable::from_bindings(entries).expect_err("duplicate");
        assert_eq!(error, BindingError::DuplicateBinding { alias: "shot" });
    }

    #[test]
    fn mouse_index_must_be_in_range() {
        let mut entries = all_keys_table_entries();
        entries[7] = (InputAction::Shot, Binding::Mouse(3));

        let error = BindingTable::from_bindings(entries).expect_err("range");
        assert_eq!(
            error,
            BindingError::MouseButtonOutOfRange {
                alias: "shot",
                index: 3
            }
        );
    }

    fn all_keys_table_entries() -> [(InputAction, Binding); ACTION_COUNT] {
        let table = all_keys_table();
        InputAction::ALL.map(|action| (action, table.binding(action)))
    }
}
