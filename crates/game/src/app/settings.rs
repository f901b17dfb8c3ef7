use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use brutal_engine::{BindingError, BindingTable, InputAction, LoopConfig, MusicSettings};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::cli::Cli;
use super::controls::parse_control;

const DEFAULT_SETTINGS: &str = include_str!("../../assets/settings.default.json");
const DEFAULTS_ORIGIN: &str = "<built-in defaults>";
const APP_DIR_NAME: &str = "brutalmaze";
const SETTINGS_FILE_NAME: &str = "settings.json";
const SITE_DIRS_ENV: &str = "XDG_CONFIG_DIRS";
const DEFAULT_SITE_DIR: &str = "/etc/xdg";

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{origin} is not valid JSON: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid settings at {field}: {message}")]
    Schema { field: String, message: String },
    #[error("{control}: {value} is not recognized as a valid control key")]
    InvalidControl {
        control: &'static str,
        value: String,
    },
    #[error("{control}: mouse is not a suitable control")]
    MouseNotAllowed { control: &'static str },
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error("failed to write default settings to {path}: {source}")]
    WriteDefaults {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Settings {
    pub graphics: GraphicsSettings,
    pub sound: SoundSettings,
    pub control: ControlSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GraphicsSettings {
    pub screen_width: u32,
    pub screen_height: u32,
    pub max_fps: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SoundSettings {
    pub muted: bool,
    pub music_volume: f32,
    /// Relative paths are resolved against the settings file that set them.
    pub music_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ControlSettings {
    pub new_game: String,
    pub toggle_pause: String,
    pub toggle_mute: String,
    pub move_left: String,
    pub move_right: String,
    pub move_up: String,
    pub move_down: String,
    pub long_range_attack: String,
    pub close_range_attack: String,
}

impl ControlSettings {
    fn entries(&self) -> [(&'static str, InputAction, &str); 9] {
        [
            ("new_game", InputAction::NewGame, self.new_game.as_str()),
            ("toggle_pause", InputAction::TogglePause, self.toggle_pause.as_str()),
            ("toggle_mute", InputAction::ToggleMute, self.toggle_mute.as_str()),
            ("move_left", InputAction::MoveLeft, self.move_left.as_str()),
            ("move_right", InputAction::MoveRight, self.move_right.as_str()),
            ("move_up", InputAction::MoveUp, self.move_up.as_str()),
            ("move_down", InputAction::MoveDown, self.move_down.as_str()),
            ("long_range_attack", InputAction::Shot, self.long_range_attack.as_str()),
            ("close_range_attack", InputAction::Slash, self.close_range_attack.as_str()),
        ]
    }
}

impl Settings {
    pub(crate) fn bindings(&self) -> Result<BindingTable, SettingsError> {
        let mut bindings = Vec::with_capacity(InputAction::ALL.len());
        for (control, action, raw) in self.control.entries() {
            bindings.push((action, parse_control(control, action, raw)?));
        }
        Ok(BindingTable::from_bindings(bindings)?)
    }

    pub(crate) fn loop_config(&self, bindings: BindingTable) -> LoopConfig {
        LoopConfig {
            window_width: self.graphics.screen_width,
            window_height: self.graphics.screen_height,
            max_fps: self.graphics.max_fps,
            muted: self.sound.muted,
            music: MusicSettings {
                track: self.sound.music_path.clone(),
                volume: self.sound.music_volume,
            },
            bindings,
            ..LoopConfig::default()
        }
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some((width, height)) = cli.size() {
            self.graphics.screen_width = width;
            self.graphics.screen_height = height;
        }
        if let Some(max_fps) = cli.max_fps {
            self.graphics.max_fps = max_fps;
        }
        if let Some(muted) = cli.muted() {
            self.sound.muted = muted;
        }
        if let Some(volume) = cli.music_volume {
            self.sound.music_volume = volume;
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.graphics.screen_width == 0 || self.graphics.screen_height == 0 {
            return Err(SettingsError::InvalidValue {
                field: "graphics.screen_width/screen_height",
                message: "screen size must be non-zero".to_string(),
            });
        }
        if self.graphics.max_fps == 0 {
            return Err(SettingsError::InvalidValue {
                field: "graphics.max_fps",
                message: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.sound.music_volume) {
            return Err(SettingsError::InvalidValue {
                field: "sound.music_volume",
                message: format!("{} is not between 0.0 and 1.0", self.sound.music_volume),
            });
        }
        Ok(())
    }
}

/// Site-wide settings files, one per entry of `XDG_CONFIG_DIRS` in listed
/// order. Falls back to `/etc/xdg` on Unix when the variable is unset.
fn site_settings_paths(config_dirs: Option<OsString>) -> Vec<PathBuf> {
    let dirs: Vec<PathBuf> = match config_dirs.filter(|raw| !raw.is_empty()) {
        Some(raw) => env::split_paths(&raw).collect(),
        None if cfg!(unix) => vec![PathBuf::from(DEFAULT_SITE_DIR)],
        None => Vec::new(),
    };
    dirs.into_iter()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
        .collect()
}

/// Per-user settings file, if the platform has a config directory.
fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
}

/// Site and user files are optional and skipped when absent; an explicit
/// `--config` file must exist.
fn layer_files(site: Vec<PathBuf>, user: Option<PathBuf>, explicit: Option<&Path>) -> Vec<PathBuf> {
    site.into_iter()
        .chain(user)
        .filter(|path| path.is_file())
        .chain(explicit.map(Path::to_path_buf))
        .collect()
}

/// Loads defaults, then site files, the user file, `--config`, and finally
/// command-line overrides. Later layers replace individual fields.
pub(crate) fn load(cli: &Cli) -> Result<Settings, SettingsError> {
    let files = layer_files(
        site_settings_paths(env::var_os(SITE_DIRS_ENV)),
        user_settings_path(),
        cli.config.as_deref(),
    );
    load_layers(files.iter().map(PathBuf::as_path), cli)
}

fn load_layers<'a, I>(files: I, cli: &Cli) -> Result<Settings, SettingsError>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut merged = parse_layer(DEFAULTS_ORIGIN, DEFAULT_SETTINGS)?;
    for path in files {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut layer = parse_layer(&path.display().to_string(), &raw)?;
        if let Some(base) = path.parent() {
            anchor_music_path(&mut layer, base);
        }
        merge_layer(&mut merged, layer);
        info!(path = %path.display(), "settings_layer_loaded");
    }

    let mut settings = deserialize_settings(merged)?;
    settings.apply_overrides(cli);
    settings.validate()?;
    debug!(?settings, "settings_resolved");
    Ok(settings)
}

fn anchor_music_path(layer: &mut Value, base: &Path) {
    let Some(Value::String(raw)) = layer.pointer_mut("/sound/music_path") else {
        return;
    };
    let track = Path::new(raw.as_str());
    if track.is_relative() {
        *raw = base.join(track).to_string_lossy().into_owned();
    }
}

fn parse_layer(origin: &str, raw: &str) -> Result<Value, SettingsError> {
    serde_json::from_str(raw).map_err(|source| SettingsError::Parse {
        origin: origin.to_string(),
        source,
    })
}

fn merge_layer(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_layer(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn deserialize_settings(merged: Value) -> Result<Settings, SettingsError> {
    serde_path_to_error::deserialize(merged).map_err(|error| SettingsError::Schema {
        field: error.path().to_string(),
        message: error.inner().to_string(),
    })
}

pub(crate) fn write_default_settings(target: Option<&Path>) -> Result<(), SettingsError> {
    match target {
        Some(path) => fs::write(path, DEFAULT_SETTINGS).map_err(|source| {
            SettingsError::WriteDefaults {
                path: path.to_path_buf(),
                source,
            }
        }),
        None => {
            print!("{DEFAULT_SETTINGS}");
            Ok(())
        }
    }
}
