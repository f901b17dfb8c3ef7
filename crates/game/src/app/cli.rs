use std::path::PathBuf;

use clap::{ArgAction, Parser};

const STDOUT_MARKER: &str = "-";

#[derive(Debug, Parser)]
#[command(name = "brutalmaze")]
#[command(version, disable_version_flag = true)]
#[command(about = "Minimalist thrilling shoot 'em up game")]
pub(crate) struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    _version: Option<bool>,

    /// Write the default settings to PATH (or stdout) and exit
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = STDOUT_MARKER)]
    pub write_config: Option<PathBuf>,

    /// Read settings from PATH, overriding the user settings file
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Initial window size
    #[arg(short = 's', long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    pub size: Option<Vec<u32>>,

    /// Upper bound on the frame rate
    #[arg(short = 'f', long, value_name = "FPS")]
    pub max_fps: Option<u32>,

    /// Start with the music muted
    #[arg(short = 'm', long, conflicts_with = "unmute")]
    pub mute: bool,

    /// Start with the music playing
    #[arg(long)]
    pub unmute: bool,

    /// Music volume between 0.0 and 1.0
    #[arg(long, value_name = "VOLUME")]
    pub music_volume: Option<f32>,
}

/// Where `--write-config` should send the default settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WriteTarget {
    Stdout,
    File(PathBuf),
}

impl Cli {
    pub(crate) fn size(&self) -> Option<(u32, u32)> {
        match self.size.as_deref() {
            Some([width, height]) => Some((*width, *height)),
            _ => None,
        }
    }

    pub(crate) fn muted(&self) -> Option<bool> {
        match (self.mute, self.unmute) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }

    pub(crate) fn write_target(&self) -> Option<WriteTarget> {
        let path = self.write_config.as_ref()?;
        if path.as_os_str() == STDOUT_MARKER {
            Some(WriteTarget::Stdout)
        } else {
            Some(WriteTarget::File(path.clone()))
        }
    }
}
