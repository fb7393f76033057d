use std::path::PathBuf;

use crate::config::Config;
use crate::executor::{Invocation, Pipeline};

/// Builds `kubectl`/`kustomize` command lines against the current context.
pub struct KubeClient {
    manifests_dir: PathBuf,
}

impl KubeClient {
    pub fn new(config: &Config) -> Self {
        Self {
            manifests_dir: config.manifests_dir.clone(),
        }
    }

    pub fn get_contexts(&self) -> Pipeline {
        Invocation::new("kubectl")
            .args(["config", "get-contexts"])
            .into()
    }

    /// `kustomize build <manifests>/<env> | kubectl apply -f -`
    pub fn deploy(&self, env: &str) -> Pipeline {
        let overlay = self.manifests_dir.join(env);
        Pipeline::from(
            Invocation::new("kustomize")
                .arg("build")
                .arg(overlay.display().to_string()),
        )
        .pipe(Invocation::new("kubectl").args(["apply", "-f", "-"]))
    }

    pub fn logs(&self, service: &str, tail: u32) -> Pipeline {
        Invocation::new("kubectl")
            .arg("logs")
            .arg(format!("deployment/{service}"))
            .arg(format!("--tail={tail}"))
            .arg("-f")
            .into()
    }

    pub fn restart(&self, service: &str) -> Pipeline {
        Invocation::new("kubectl")
            .args(["rollout", "restart"])
            .arg(format!("deployment/{service}"))
            .into()
    }
}
