#![doc = include_str!("../README.md")]

pub mod cli;
pub mod command;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod version;
pub mod xml;

pub use error::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> Result<()> {
    use clap::Parser;

    let cli = cli::Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();

    log::debug!("manifest-fixer {}", VERSION);
    command::fix::execute(cli.fix)
}
