mod common;

use clap::Parser;
use common::RecordingExecutor;
use dp::config::Config;
use dp::error::DpError;
use dp::{CLI, Command, dispatch};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command as Process;
use tempfile::tempdir;

fn config(cli: &CLI) -> Config {
    Config::resolve(
        cli,
        &HashMap::new(),
        &HashMap::new(),
        Some(PathBuf::from("/nonexistent/dp-tests")),
    )
}

async fn dispatch_args(args: &[&str], executor: &RecordingExecutor) -> i32 {
    let cli = CLI::try_parse_from(std::iter::once("dp").chain(args.iter().copied())).unwrap();
    dispatch(&cli.command, &config(&cli), executor)
        .await
        .unwrap()
        .code()
}

#[tokio::test]
async fn test_restart_passes_service_name_through() {
    let executor = RecordingExecutor::default();
    let code = dispatch_args(&["restart", "payments-api"], &executor).await;

    assert_eq!(code, 0);
    assert_eq!(
        executor.runs(),
        ["kubectl rollout restart deployment/payments-api"]
    );
}

#[tokio::test]
async fn test_deploy_staging_only_touches_staging() {
    let executor = RecordingExecutor::default();
    dispatch_args(&["deploy", "staging"], &executor).await;

    let runs = executor.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0], "kustomize build k8s/staging | kubectl apply -f -");
    for other in ["production", "prod", "dev"] {
        assert!(!runs[0].contains(other));
    }
}

#[tokio::test]
async fn test_logs_and_ctx() {
    let executor = RecordingExecutor::default();
    dispatch_args(&["ctx"], &executor).await;
    dispatch_args(&["logs", "billing"], &executor).await;

    assert_eq!(
        executor.runs(),
        [
            "kubectl config get-contexts",
            "kubectl logs deployment/billing --tail=100 -f"
        ]
    );
}

#[tokio::test]
async fn test_invalid_log_tail_fails_only_logs() {
    let executor = RecordingExecutor::default();
    let cli = CLI::try_parse_from(["dp", "logs", "billing"]).unwrap();
    let config = Config::resolve(
        &cli,
        &[("DP_LOG_TAIL".to_string(), "lots".to_string())].into(),
        &HashMap::new(),
        None,
    );

    let err = dispatch(&cli.command, &config, &executor).await.unwrap_err();
    assert!(matches!(err, DpError::Config(_)));
    assert!(executor.runs().is_empty());

    let restart = Command::Restart {
        service: "billing".to_string(),
    };
    let status = dispatch(&restart, &config, &executor).await.unwrap();
    assert!(status.success());
    assert_eq!(executor.runs(), ["kubectl rollout restart deployment/billing"]);
}

#[tokio::test]
async fn test_exit_status_propagates() {
    let executor = RecordingExecutor::default().fail_on("rollout restart", 1);
    let code = dispatch_args(&["restart", "ghost"], &executor).await;
    assert_eq!(code, 1);
}

#[tokio::test]
async fn test_docker_builds_then_pushes() {
    let executor = RecordingExecutor::default();
    let code = dispatch_args(&["docker", "api"], &executor).await;

    assert_eq!(code, 0);
    assert_eq!(
        executor.runs(),
        [
            "docker build -t acr.io/api:latest repos/api",
            "docker push acr.io/api:latest"
        ]
    );
}

#[tokio::test]
async fn test_failed_build_is_not_pushed() {
    let executor = RecordingExecutor::default().fail_on("docker build", 17);
    let code = dispatch_args(&["docker", "api"], &executor).await;

    assert_eq!(code, 17);
    assert_eq!(executor.count("docker push"), 0);
}

#[test]
fn test_parser_rejects_unknown_and_malformed_commands() {
    assert!(CLI::try_parse_from(["dp", "frobnicate"]).is_err());
    assert!(CLI::try_parse_from(["dp", "restart"]).is_err());
    assert!(CLI::try_parse_from(["dp", "ctx", "extra"]).is_err());
    assert!(CLI::try_parse_from(["dp", "deploy", "a", "b"]).is_err());
    assert_eq!(
        CLI::try_parse_from(["dp", "deploy", "staging"])
            .unwrap()
            .command,
        Command::Deploy {
            env: "staging".to_string()
        }
    );
}

#[test]
fn test_binary_unknown_command_exits_non_zero() {
    let output = Process::new(env!("CARGO_BIN_EXE_dp"))
        .arg("frobnicate")
        .output()
        .expect("run dp");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("frobnicate"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_binary_dry_run_prints_command_line() {
    let temp_dir = tempdir().unwrap();
    let output = Process::new(env!("CARGO_BIN_EXE_dp"))
        .env("HOME", temp_dir.path())
        .arg("--env-file")
        .arg(temp_dir.path().join("missing.env"))
        .arg("--dry-run")
        .arg("restart")
        .arg("payments-api")
        .output()
        .expect("run dp");

    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("🔁 Restarting: payments-api"));
    assert!(stdout.contains("[dry-run] kubectl rollout restart deployment/payments-api"));
}

#[test]
fn test_binary_bad_sync_settings_do_not_block_restart() {
    let temp_dir = tempdir().unwrap();
    let env_path = temp_dir.path().join("bad_sync.env");
    std::fs::write(&env_path, "DP_CLONE_PROTOCOL=carrier-pigeon\n").unwrap();

    let output = Process::new(env!("CARGO_BIN_EXE_dp"))
        .env("HOME", temp_dir.path())
        .env("DP_REPO_LIMIT", "lots")
        .arg("--env-file")
        .arg(&env_path)
        .arg("--dry-run")
        .arg("restart")
        .arg("payments-api")
        .output()
        .expect("run dp");

    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[dry-run] kubectl rollout restart deployment/payments-api"));
    assert!(!stdout.contains("Configuration options:"));
}

#[test]
fn test_binary_bad_sync_settings_fail_sync() {
    let temp_dir = tempdir().unwrap();
    let output = Process::new(env!("CARGO_BIN_EXE_dp"))
        .env("HOME", temp_dir.path())
        .env("DP_REPO_LIMIT", "lots")
        .arg("--env-file")
        .arg(temp_dir.path().join("missing.env"))
        .arg("--dry-run")
        .arg("sync")
        .output()
        .expect("run dp");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DP_REPO_LIMIT"), "stderr: {stderr}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Configuration options:"));
    assert!(!stdout.contains("Syncing repos"));
}
