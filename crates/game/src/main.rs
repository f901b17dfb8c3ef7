use std::process::ExitCode;

use clap::Parser;

mod app;

fn main() -> ExitCode {
    app::run(app::Cli::parse())
}
