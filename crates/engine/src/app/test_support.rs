use std::path::{Path, PathBuf};
use std::time::Instant;

use super::audio::{AudioError, AudioSubsystem, MusicSettings};
use super::movement::VelocityState;
use super::world::World;

#[derive(Debug)]
pub(crate) struct FakeWorld {
    pub updates: Vec<f32>,
    pub resizes: Vec<(u32, u32)>,
    pub resets: Vec<f32>,
    pub distance: f32,
    pub velocity: VelocityState,
    pub next_move: Option<Instant>,
    pub dead: bool,
    pub firing: bool,
    pub slashing: bool,
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self {
            updates: Vec::new(),
            resizes: Vec::new(),
            resets: Vec::new(),
            distance: 100.0,
            velocity: VelocityState::default(),
            next_move: None,
            dead: false,
            firing: false,
            slashing: false,
        }
    }
}

impl World for FakeWorld {
    fn update(&mut self, fps: f32) {
        self.updates.push(fps);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }

    fn reset(&mut self, fps: f32) {
        self.resets.push(fps);
        self.velocity = VelocityState::default();
        self.next_move = None;
        self.dead = false;
        self.firing = false;
        self.slashing = false;
    }

    fn distance(&self) -> f32 {
        self.distance
    }

    fn set_velocity(&mut self, velocity: VelocityState) {
        self.velocity = velocity;
    }

    fn next_move(&self) -> Option<Instant> {
        self.next_move
    }

    fn hero_dead(&self) -> bool {
        self.dead
    }

    fn set_hero_actions(&mut self, firing: bool, slashing: bool) {
        self.firing = firing;
        self.slashing = slashing;
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeAudio {
    pub initialized: bool,
    pub sample_rate: Option<u32>,
    pub loaded: Option<PathBuf>,
    pub volume: f32,
    pub playing_looped: Option<bool>,
    pub init_calls: u32,
    pub shutdown_calls: u32,
    pub fail_init: bool,
    pub fail_load: bool,
}

impl AudioSubsystem for FakeAudio {
    fn initialize(&mut self, sample_rate: u32) -> Result<(), AudioError> {
        self.init_calls += 1;
        if self.fail_init {
            return Err(AudioError::Device("no device".to_string()));
        }
        self.initialized = true;
        self.sample_rate = Some(sample_rate);
        Ok(())
    }

    fn load(&mut self, track: &Path) -> Result<(), AudioError> {
        if !self.initialized {
            return Err(AudioError::NotInitialized);
        }
        if self.fail_load {
            return Err(AudioError::Load {
                path: track.to_path_buf(),
                message: "missing".to_string(),
            });
        }
        self.loaded = Some(track.to_path_buf());
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.volume = volume;
        Ok(())
    }

    fn play(&mut self, looped: bool) -> Result<(), AudioError> {
        if self.loaded.is_none() {
            return Err(AudioError::NoTrack);
        }
        self.playing_looped = Some(looped);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.shutdown_calls += 1;
        self.initialized = false;
        self.loaded = None;
        self.playing_looped = None;
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

pub(crate) fn theme_music() -> MusicSettings {
    MusicSettings {
        track: Some(PathBuf::from("theme.ogg")),
        ..MusicSettings::default()
    }
}
