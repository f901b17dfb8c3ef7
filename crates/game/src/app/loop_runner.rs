use std::process::ExitCode;

use brutal_engine::run_app;
use tracing::error;

use super::arena::ArenaWorld;
use super::bootstrap::{build_app, write_defaults, AppWiring};
use super::cli::Cli;

pub(crate) fn run(cli: Cli) -> ExitCode {
    if let Some(target) = cli.write_target() {
        return match write_defaults(&target) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("brutalmaze: {err}");
                ExitCode::FAILURE
            }
        };
    }

    match build_app(&cli) {
        Ok(app) => run_loop(app),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

fn run_loop(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app(app.config, app.audio, ArenaWorld::new) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
