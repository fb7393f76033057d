use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::executor::{Executor, Invocation, Pipeline};
use crate::types::Status;

pub struct GitClient;

impl GitClient {
    pub fn clone_command(&self, address: &str, destination: &Path) -> Pipeline {
        Invocation::new("git")
            .arg("clone")
            .arg(address)
            .arg(destination.display().to_string())
            .into()
    }

    /// `git pull` is fetch + merge of the tracked upstream branch.
    pub fn pull_command(&self, repo_dir: &Path) -> Pipeline {
        Invocation::new("git")
            .arg("-C")
            .arg(repo_dir.display().to_string())
            .arg("pull")
            .into()
    }

    pub async fn clone_repository<E: Executor>(
        &self,
        executor: &E,
        address: &str,
        destination: &Path,
    ) -> Result<Status> {
        info!("Cloning {} into {}", address, destination.display());
        executor
            .run(&self.clone_command(address, destination))
            .await
    }

    pub async fn pull<E: Executor>(&self, executor: &E, repo_dir: &Path) -> Result<Status> {
        info!("Pulling latest changes in {}", repo_dir.display());
        executor.run(&self.pull_command(repo_dir)).await
    }
}
