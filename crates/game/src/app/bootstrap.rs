use brutal_engine::LoopConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::audio::KiraAudio;
use super::cli::{Cli, WriteTarget};
use super::settings::{self, SettingsError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) audio: KiraAudio,
}

/// Runs before any subscriber is installed so stdout carries only the
/// settings document.
pub(crate) fn write_defaults(target: &WriteTarget) -> Result<(), SettingsError> {
    match target {
        WriteTarget::Stdout => settings::write_default_settings(None),
        WriteTarget::File(path) => settings::write_default_settings(Some(path.as_path())),
    }
}

pub(crate) fn build_app(cli: &Cli) -> Result<AppWiring, SettingsError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "startup");

    let settings = settings::load(cli)?;
    let bindings = settings.bindings()?;

    Ok(AppWiring {
        config: settings.loop_config(bindings),
        audio: KiraAudio::new(),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
