mod arena;
mod audio;
mod bootstrap;
mod cli;
mod controls;
mod loop_runner;
mod settings;

pub(crate) use cli::Cli;
pub(crate) use loop_runner::run;
