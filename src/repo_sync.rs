use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::error::Result;
use crate::executor::Executor;
use crate::git_client::GitClient;
use crate::github_client::GitHubClient;
use crate::types::Status;

/// Brings `output_dir` in line with every repository the organization owns:
/// missing checkouts are cloned, existing ones are pulled.
pub struct RepoSync<'a, E> {
    config: &'a SyncConfig,
    executor: &'a E,
    github: GitHubClient,
    git: GitClient,
}

impl<'a, E: Executor> RepoSync<'a, E> {
    pub fn new(config: &'a SyncConfig, executor: &'a E) -> Self {
        Self {
            config,
            executor,
            github: GitHubClient,
            git: GitClient,
        }
    }

    /// Repositories are handled one at a time in listing order. The first
    /// clone or pull that exits non-zero ends the run with its status.
    pub async fn sync(&self) -> Result<Status> {
        let repos = self
            .github
            .list_repos(self.executor, &self.config.org, self.config.limit)
            .await?;

        let mut cloned = 0usize;
        let mut updated = 0usize;

        for repo in &repos {
            let local_path = self.config.output_dir.join(&repo.name);

            let status = if local_path.exists() {
                let status = self.git.pull(self.executor, &local_path).await?;
                updated += 1;
                status
            } else {
                let address = repo.clone_address(self.config.protocol);
                let status = self
                    .git
                    .clone_repository(self.executor, address, &local_path)
                    .await?;
                cloned += 1;
                status
            };

            if !status.success() {
                warn!("Stopping sync: {} failed with {}", repo.name, status);
                return Ok(status);
            }
        }

        info!(
            "Synced {} repositories from {} ({} cloned, {} updated)",
            repos.len(),
            self.config.org,
            cloned,
            updated
        );
        Ok(Status::SUCCESS)
    }
}
