use std::path::{Path, PathBuf};

use brutal_engine::{AudioError, AudioSubsystem};
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, AudioManagerSettings, Decibels, DefaultBackend, Tween};
use tracing::debug;

const SILENCE_DB: f32 = -60.0;

/// Music playback on the default output device.
#[derive(Default)]
pub(crate) struct KiraAudio {
    manager: Option<AudioManager<DefaultBackend>>,
    track: Option<LoadedTrack>,
    playing: Option<StaticSoundHandle>,
    volume: f32,
}

struct LoadedTrack {
    path: PathBuf,
    data: StaticSoundData,
}

impl KiraAudio {
    pub(crate) fn new() -> Self {
        Self {
            volume: 1.0,
            ..Self::default()
        }
    }
}

impl AudioSubsystem for KiraAudio {
    fn initialize(&mut self, sample_rate: u32) -> Result<(), AudioError> {
        if self.manager.is_some() {
            return Ok(());
        }
        // The backend negotiates the device rate itself.
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| AudioError::Device(e.to_string()))?;
        debug!(requested_sample_rate = sample_rate, "audio_device_opened");
        self.manager = Some(manager);
        Ok(())
    }

    fn load(&mut self, track: &Path) -> Result<(), AudioError> {
        if self.manager.is_none() {
            return Err(AudioError::NotInitialized);
        }
        if self.track.as_ref().is_some_and(|loaded| loaded.path == track) {
            return Ok(());
        }
        let data = StaticSoundData::from_file(track).map_err(|e| AudioError::Load {
            path: track.to_path_buf(),
            message: e.to_string(),
        })?;
        self.track = Some(LoadedTrack {
            path: track.to_path_buf(),
            data,
        });
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(handle) = self.playing.as_mut() {
            handle.set_volume(amplitude_to_db(self.volume), Tween::default());
        }
        Ok(())
    }

    fn play(&mut self, looped: bool) -> Result<(), AudioError> {
        let manager = self.manager.as_mut().ok_or(AudioError::NotInitialized)?;
        let track = self.track.as_ref().ok_or(AudioError::NoTrack)?;

        let mut data = track.data.clone().volume(amplitude_to_db(self.volume));
        if looped {
            data = data.loop_region(..);
        }

        if let Some(mut previous) = self.playing.take() {
            previous.stop(Tween::default());
        }
        let handle = manager
            .play(data)
            .map_err(|e| AudioError::Playback(e.to_string()))?;
        self.playing = Some(handle);
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(mut handle) = self.playing.take() {
            handle.stop(Tween::default());
        }
        self.track = None;
        self.manager = None;
    }

    fn is_initialized(&self) -> bool {
        self.manager.is_some()
    }
}

/// Linear amplitude to decibels, floored at silence.
fn amplitude_to_db(amplitude: f32) -> Decibels {
    if amplitude <= 0.0 {
        Decibels(SILENCE_DB)
    } else {
        Decibels((20.0 * amplitude.log10()).max(SILENCE_DB))
    }
}
