use crate::config::Config;
use crate::docker_client::DockerClient;
use crate::error::{DpError, Result};
use crate::executor::{DryRunExecutor, Executor, SystemExecutor, run_sequence};
use crate::kube_client::KubeClient;
use crate::repo_sync::RepoSync;
use crate::types::{CloneProtocol, Status};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "dp", version, about = "Engineering CLI")]
pub struct CLI {
    #[command(subcommand)]
    pub command: Command,
    #[arg(short, long, action = ArgAction::Count, global = true, help = "Increase verbosity (-v, -vv, etc.)")]
    pub verbose: u8,
    #[arg(
        long,
        global = true,
        help = "Print the commands that would run instead of running them"
    )]
    pub dry_run: bool,
    #[arg(long, global = true, value_name = "ORG", help = "Organization to sync repositories from")]
    pub org: Option<String>,
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Directory repositories are synced into"
    )]
    pub output_dir: Option<PathBuf>,
    #[arg(long, global = true, value_name = "ssh|https", help = "Clone protocol for new repositories")]
    pub protocol: Option<CloneProtocol>,
    #[arg(
        short = 'e',
        long = "env-file",
        default_value = ".env",
        global = true,
        help = "Path to .env file"
    )]
    pub env_file: PathBuf,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sync all repos
    Sync,
    /// List Kube contexts
    Ctx,
    /// Deploy an environment's manifests
    Deploy { env: String },
    /// Show logs from service
    Logs { service: String },
    /// Restart a service
    Restart { service: String },
    /// Build/push Docker image
    Docker { service: String },
}

/// Runs the handler bound to `command` and returns the external tool's status.
pub async fn dispatch<E: Executor>(
    command: &Command,
    config: &Config,
    executor: &E,
) -> Result<Status> {
    match command {
        Command::Sync => {
            let sync = config.sync_config()?;
            println!("🔄 Syncing repos from {}...", sync.org);
            RepoSync::new(&sync, executor).sync().await
        }
        Command::Ctx => {
            println!("📦 Available Kubernetes Contexts:");
            executor.run(&KubeClient::new(config).get_contexts()).await
        }
        Command::Deploy { env } => {
            println!("🚀 Deploying environment: {env}");
            executor.run(&KubeClient::new(config).deploy(env)).await
        }
        Command::Logs { service } => {
            let tail = config.log_tail()?;
            println!("📜 Logs for: {service}");
            executor.run(&KubeClient::new(config).logs(service, tail)).await
        }
        Command::Restart { service } => {
            println!("🔁 Restarting: {service}");
            executor.run(&KubeClient::new(config).restart(service)).await
        }
        Command::Docker { service } => {
            println!("🐳 Building & pushing Docker image for: {service}");
            run_sequence(executor, &DockerClient::new(config).build_and_push(service)).await
        }
    }
}

// Main application logic
pub async fn execute(cli: CLI) -> ExitCode {
    let config = match Config::from_env_and_cli(&cli) {
        Ok(config) => config,
        Err(e) => return config_failure(&e),
    };

    let result = if cli.dry_run {
        dispatch(&cli.command, &config, &DryRunExecutor::new(SystemExecutor)).await
    } else {
        dispatch(&cli.command, &config, &SystemExecutor).await
    };

    match result {
        Ok(status) => {
            if !status.success() {
                warn!("{:?} exited with {}", cli.command, status);
            }
            status.into()
        }
        Err(e @ (DpError::Config(_) | DpError::HomeNotFound)) => config_failure(&e),
        Err(e) => {
            eprintln!("error: {}", e);
            e.exit_code().into()
        }
    }
}

fn config_failure(e: &DpError) -> ExitCode {
    eprintln!("Configuration error: {}", e);
    println!();
    Config::show_configuration_help();
    e.exit_code().into()
}
