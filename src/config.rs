use crate::cli::CLI;
use crate::error::{DpError, Result};
use crate::types::CloneProtocol;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_ORG: &str = "Docpier-Labs";
pub const DEFAULT_REPO_LIMIT: u32 = 1000;
pub const DEFAULT_MANIFESTS_DIR: &str = "k8s";
pub const DEFAULT_REPOS_DIR: &str = "repos";
pub const DEFAULT_REGISTRY: &str = "acr.io";
pub const DEFAULT_IMAGE_TAG: &str = "latest";
pub const DEFAULT_LOG_TAIL: u32 = 100;

/// Everything the sync routine needs, resolved before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub org: String,
    pub output_dir: PathBuf,
    pub protocol: CloneProtocol,
    pub limit: u32,
}

/// Settings every command can use. The sync settings and the log tail are
/// validated by their accessors, only when a command reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub manifests_dir: PathBuf,
    pub repos_dir: PathBuf,
    pub registry: String,
    pub image_tag: String,
    vars: HashMap<String, String>,
    org: Option<String>,
    output_dir: Option<PathBuf>,
    protocol: Option<CloneProtocol>,
    home: Option<PathBuf>,
}

impl Config {
    /// Loads the env file named by `--env-file`, the process environment and
    /// the home directory, then resolves.
    pub fn from_env_and_cli(cli: &CLI) -> Result<Self> {
        let file_vars = read_env_file(&cli.env_file)?;
        let process_vars: HashMap<String, String> = std::env::vars().collect();
        Ok(Self::resolve(cli, &process_vars, &file_vars, dirs::home_dir()))
    }

    /// Priority: CLI flags > process environment > env file > defaults.
    /// Blank values count as unset in every source.
    pub fn resolve(
        cli: &CLI,
        process_vars: &HashMap<String, String>,
        file_vars: &HashMap<String, String>,
        home: Option<PathBuf>,
    ) -> Self {
        let mut vars = HashMap::new();
        for (key, value) in file_vars.iter().chain(process_vars) {
            let value = value.trim();
            if key.starts_with("DP_") && !value.is_empty() {
                vars.insert(key.clone(), value.to_string());
            }
        }

        let setting = |key: &str, default: &str| -> String {
            vars.get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        let manifests_dir = PathBuf::from(setting("DP_MANIFESTS_DIR", DEFAULT_MANIFESTS_DIR));
        let repos_dir = PathBuf::from(setting("DP_REPOS_DIR", DEFAULT_REPOS_DIR));
        let registry = setting("DP_REGISTRY", DEFAULT_REGISTRY);
        let image_tag = setting("DP_IMAGE_TAG", DEFAULT_IMAGE_TAG);

        Config {
            manifests_dir,
            repos_dir,
            registry,
            image_tag,
            org: cli.org.clone(),
            output_dir: cli.output_dir.clone(),
            protocol: cli.protocol,
            home,
            vars,
        }
    }

    pub fn sync_config(&self) -> Result<SyncConfig> {
        let org = self
            .org
            .clone()
            .or_else(|| self.vars.get("DP_ORG").cloned())
            .unwrap_or_else(|| DEFAULT_ORG.to_string());
        if org.trim().is_empty() {
            return Err(DpError::Config("organization name must not be empty".into()));
        }

        let output_dir = match self
            .output_dir
            .clone()
            .or_else(|| self.vars.get("DP_OUTPUT_DIR").map(PathBuf::from))
        {
            Some(dir) => dir,
            None => default_output_dir(self.home.as_deref()).ok_or(DpError::HomeNotFound)?,
        };

        let protocol = match self.protocol {
            Some(protocol) => protocol,
            None => self.parse_var("DP_CLONE_PROTOCOL")?.unwrap_or_default(),
        };

        let limit = self
            .parse_var("DP_REPO_LIMIT")?
            .unwrap_or(DEFAULT_REPO_LIMIT);
        if limit == 0 {
            return Err(DpError::Config("DP_REPO_LIMIT must be at least 1".into()));
        }

        Ok(SyncConfig {
            org,
            output_dir,
            protocol,
            limit,
        })
    }

    pub fn log_tail(&self) -> Result<u32> {
        Ok(self.parse_var("DP_LOG_TAIL")?.unwrap_or(DEFAULT_LOG_TAIL))
    }

    fn parse_var<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.vars
            .get(key)
            .map(|value| {
                value
                    .parse::<T>()
                    .map_err(|e| DpError::Config(format!("invalid {key} '{value}': {e}")))
            })
            .transpose()
    }

    pub fn show_configuration_help() {
        println!("Configuration options:");
        println!("  1. Command line flags:");
        println!(
            "     dp sync --org Docpier-Labs --output-dir ~/Engineering/repos --protocol ssh --env-file .env"
        );
        println!();
        println!("  2. Environment variables, or a .env file (use --env-file to pick another):");
        println!("     DP_ORG={DEFAULT_ORG}");
        println!("     DP_OUTPUT_DIR=~/Engineering/repos");
        println!("     DP_CLONE_PROTOCOL=ssh            # or https");
        println!("     DP_REPO_LIMIT={DEFAULT_REPO_LIMIT}");
        println!("     DP_MANIFESTS_DIR={DEFAULT_MANIFESTS_DIR}");
        println!("     DP_REPOS_DIR={DEFAULT_REPOS_DIR}");
        println!("     DP_REGISTRY={DEFAULT_REGISTRY}");
        println!("     DP_IMAGE_TAG={DEFAULT_IMAGE_TAG}");
        println!("     DP_LOG_TAIL={DEFAULT_LOG_TAIL}");
        println!();
        println!(
            "Command line flags take precedence over environment variables, which take precedence over the .env file."
        );
    }
}

/// Parses a dotenv-style file. A missing file yields an empty map.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(HashMap::new());
        }
        Err(e) => {
            return Err(DpError::Config(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };

    iter.map(|item| {
        item.map_err(|e| DpError::Config(format!("failed to parse {}: {}", path.display(), e)))
    })
    .collect()
}

fn default_output_dir(home: Option<&Path>) -> Option<PathBuf> {
    home.map(|home| home.join("Engineering").join("repos"))
}
