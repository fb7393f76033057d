use std::path::PathBuf;

use crate::config::Config;
use crate::executor::{Invocation, Pipeline};

/// Builds and pushes service images with the `docker` CLI.
pub struct DockerClient {
    registry: String,
    tag: String,
    repos_dir: PathBuf,
}

impl DockerClient {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: config.registry.clone(),
            tag: config.image_tag.clone(),
            repos_dir: config.repos_dir.clone(),
        }
    }

    pub fn image_ref(&self, service: &str) -> String {
        format!(
            "{}/{}:{}",
            self.registry.trim_end_matches('/'),
            service,
            self.tag
        )
    }

    pub fn build(&self, service: &str) -> Pipeline {
        Invocation::new("docker")
            .arg("build")
            .arg("-t")
            .arg(self.image_ref(service))
            .arg(self.repos_dir.join(service).display().to_string())
            .into()
    }

    pub fn push(&self, service: &str) -> Pipeline {
        Invocation::new("docker")
            .arg("push")
            .arg(self.image_ref(service))
            .into()
    }

    /// Build then push; meant for [`crate::executor::run_sequence`] so a failed
    /// build never pushes.
    pub fn build_and_push(&self, service: &str) -> Vec<Pipeline> {
        vec![self.build(service), self.push(service)]
    }
}
