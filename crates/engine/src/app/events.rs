use tracing::{debug, info};
use winit::keyboard::KeyCode;

use super::audio::{disengage_music, engage_music, AudioSubsystem, MusicSettings};
use super::input::{BindingTable, InputAction};
use super::world::World;

/// Discrete platform events, in the order the platform delivered them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    Quit,
    Resized { width: u32, height: u32 },
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseDown(u8),
    MouseUp(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopFlags {
    pub paused: bool,
    pub muted: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub quit: bool,
    pub world_reset: bool,
}

#[derive(Debug, Clone)]
pub struct EventDispatcher {
    bindings: BindingTable,
    music: MusicSettings,
}

impl EventDispatcher {
    pub fn new(bindings: BindingTable, music: MusicSettings) -> Self {
        Self { bindings, music }
    }

    pub fn music(&self) -> &MusicSettings {
        &self.music
    }

    /// Applies queued events in order. Processing stops at the first `Quit`;
    /// anything queued behind it is dropped.
    pub fn dispatch<I, W, A>(
        &self,
        events: I,
        world: &mut W,
        audio: &mut A,
        flags: &mut LoopFlags,
        current_fps: f32,
    ) -> DispatchOutcome
    where
        I: IntoIterator<Item = LoopEvent>,
        W: World + ?Sized,
        A: AudioSubsystem + ?Sized,
    {
        let mut outcome = DispatchOutcome::default();

        for event in events {
            match event {
                LoopEvent::Quit => {
                    outcome.quit = true;
                    return outcome;
                }
                LoopEvent::Resized { width, height } => {
                    world.resize(width, height);
                    debug!(width, height, "world_resized");
                }
                LoopEvent::KeyDown(code) => {
                    if self.handle_key_down(code, world, audio, flags, current_fps) {
                        outcome.world_reset = true;
                    }
                }
                LoopEvent::KeyUp(_) | LoopEvent::MouseDown(_) | LoopEvent::MouseUp(_) => {}
            }
        }

        outcome
    }

    fn handle_key_down<W, A>(
        &self,
        code: KeyCode,
        world: &mut W,
        audio: &mut A,
        flags: &mut LoopFlags,
        current_fps: f32,
    ) -> bool
    where
        W: World + ?Sized,
        A: AudioSubsystem + ?Sized,
    {
        if self.bindings.matches_key(InputAction::NewGame, code) {
            world.reset(current_fps);
            flags.paused = false;
            info!(fps = current_fps, "new_game");
            return true;
        }

        if self.bindings.matches_key(InputAction::TogglePause, code) {
            if !world.hero_dead() {
                flags.paused = !flags.paused;
                info!(paused = flags.paused, "paused_toggled");
            }
        } else if self.bindings.matches_key(InputAction::ToggleMute, code) {
            flags.muted = !flags.muted;
            if flags.muted {
                disengage_music(audio);
            } else {
                engage_music(audio, &self.music);
            }
            info!(muted = flags.muted, "mute_toggled");
        }

        false
    }
}
