use std::io;

use thiserror::Error;

use crate::types::Status;

pub type Result<T> = std::result::Result<T, DpError>;

#[derive(Debug, Error)]
pub enum DpError {
    /// The program could not be spawned because it is not on `PATH`.
    #[error("`{program}` was not found on PATH; {hint}")]
    ToolNotFound { program: String, hint: &'static str },

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The repository host refused or failed the listing query.
    #[error("listing repositories for {org} failed with {status}")]
    Listing { org: String, status: Status },

    #[error("could not parse repository listing: {0}")]
    ListingFormat(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot determine home directory; pass --output-dir or set DP_OUTPUT_DIR")]
    HomeNotFound,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DpError {
    pub(crate) fn spawn(program: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            DpError::ToolNotFound {
                program: program.to_string(),
                hint: install_hint(program),
            }
        } else {
            DpError::Spawn {
                program: program.to_string(),
                source,
            }
        }
    }

    /// Exit status the process should end with when this error surfaces.
    pub fn exit_code(&self) -> Status {
        match self {
            DpError::Listing { status, .. } => *status,
            DpError::ToolNotFound { .. } => Status::from_code(127),
            _ => Status::from_code(1),
        }
    }
}

fn install_hint(program: &str) -> &'static str {
    match program {
        "gh" => "install the GitHub CLI (https://cli.github.com) and run `gh auth login`",
        "git" => "install git (https://git-scm.com/downloads)",
        "kubectl" => "install kubectl (https://kubernetes.io/docs/tasks/tools/)",
        "kustomize" => "install kustomize (https://kubectl.docs.kubernetes.io/installation/kustomize/)",
        "docker" => "install Docker (https://docs.docker.com/get-docker/)",
        _ => "install it or add it to PATH",
    }
}
