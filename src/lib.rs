mod cli;
pub mod config;
pub mod docker_client;
pub mod error;
pub mod executor;
pub mod git_client;
pub mod github_client;
pub mod kube_client;
pub mod repo_sync;
pub mod types;

use clap::Parser;
pub use cli::{CLI, Command, dispatch, execute};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub async fn run() -> ExitCode {
    let cli = CLI::parse();
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    execute(cli).await
}
