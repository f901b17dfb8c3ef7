use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

pub const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio device unavailable: {0}")]
    Device(String),
    #[error("failed to load track {path}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("audio subsystem is not initialized")]
    NotInitialized,
    #[error("no track loaded")]
    NoTrack,
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Audio device lifecycle as seen by the control loop.
pub trait AudioSubsystem {
    fn initialize(&mut self, sample_rate: u32) -> Result<(), AudioError>;
    fn load(&mut self, track: &Path) -> Result<(), AudioError>;
    /// `volume` is linear amplitude in `[0, 1]`.
    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError>;
    fn play(&mut self, looped: bool) -> Result<(), AudioError>;
    fn shutdown(&mut self);
    fn is_initialized(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MusicSettings {
    /// Looping background track. `None` keeps the loop silent.
    pub track: Option<PathBuf>,
    pub volume: f32,
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self {
            track: None,
            volume: 1.0,
        }
    }
}

/// Brings the audio subsystem up and starts the looping music track. On
/// failure the subsystem is torn down again and the loop carries on silent.
pub(crate) fn engage_music<A>(audio: &mut A, music: &MusicSettings) -> bool
where
    A: AudioSubsystem + ?Sized,
{
    let Some(track) = music.track.as_deref() else {
        debug!("music_not_configured");
        return false;
    };

    match start_music(audio, track, music.volume) {
        Ok(()) => {
            info!(track = %track.display(), volume = music.volume, "music_started");
            true
        }
        Err(error) => {
            warn!(error = %error, track = %track.display(), "music_unavailable");
            audio.shutdown();
            false
        }
    }
}

pub(crate) fn disengage_music<A>(audio: &mut A)
where
    A: AudioSubsystem + ?Sized,
{
    if audio.is_initialized() {
        audio.shutdown();
        info!("music_stopped");
    }
}

fn start_music<A>(audio: &mut A, track: &Path, volume: f32) -> Result<(), AudioError>
where
    A: AudioSubsystem + ?Sized,
{
    if !audio.is_initialized() {
        audio.initialize(SAMPLE_RATE)?;
    }
    audio.load(track)?;
    audio.set_volume(volume.clamp(0.0, 1.0))?;
    audio.play(true)
}
