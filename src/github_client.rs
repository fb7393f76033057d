use tracing::{debug, info};

use crate::error::{DpError, Result};
use crate::executor::{Executor, Invocation};
use crate::types::RemoteRepo;

/// Lists an organization's repositories through the `gh` CLI, which carries
/// its own authentication.
pub struct GitHubClient;

impl GitHubClient {
    pub fn list_repos_command(&self, org: &str, limit: u32) -> Invocation {
        Invocation::new("gh")
            .args(["repo", "list", org])
            .arg("--limit")
            .arg(limit.to_string())
            .args(["--json", "name,sshUrl,url"])
            .env("GH_PROMPT_DISABLED", "1")
    }

    pub async fn list_repos<E: Executor>(
        &self,
        executor: &E,
        org: &str,
        limit: u32,
    ) -> Result<Vec<RemoteRepo>> {
        info!("Listing repositories for {} (limit {})", org, limit);

        let captured = executor
            .capture(&self.list_repos_command(org, limit))
            .await?;
        if !captured.status.success() {
            return Err(DpError::Listing {
                org: org.to_string(),
                status: captured.status,
            });
        }

        let repos = parse_listing(&captured.stdout)?;
        debug!("{} repositories listed for {}", repos.len(), org);
        Ok(repos)
    }
}

pub fn parse_listing(stdout: &str) -> Result<Vec<RemoteRepo>> {
    let body = stdout.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_command_caps_results() {
        let command = GitHubClient.list_repos_command("Docpier-Labs", 1000);
        assert_eq!(
            command.get_args(),
            [
                "repo",
                "list",
                "Docpier-Labs",
                "--limit",
                "1000",
                "--json",
                "name,sshUrl,url"
            ]
        );
    }

    #[test]
    fn test_parse_listing_keeps_host_order() {
        let repos = parse_listing(
            r#"[
                {"name":"web","sshUrl":"git@github.com:acme/web.git","url":"https://github.com/acme/web"},
                {"name":"api","sshUrl":"git@github.com:acme/api.git","url":"https://github.com/acme/api"}
            ]"#,
        )
        .unwrap();
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["web", "api"]);
    }

    #[test]
    fn test_parse_listing_empty_output() {
        assert!(parse_listing("").unwrap().is_empty());
        assert!(parse_listing("[]\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_listing_rejects_garbage() {
        let err = parse_listing("HTTP 401: Bad credentials").unwrap_err();
        assert!(matches!(err, DpError::ListingFormat(_)));
    }
}
