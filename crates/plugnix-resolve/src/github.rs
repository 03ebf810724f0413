//! Upstream revision resolution
//!
//! GitHub-hosted plugins resolve through the commits API; anything else
//! falls back to `git ls-remote`. The pinned version string is the commit
//! date, which is what the generated manifest records.

use serde::Deserialize;
use std::process::Command;
use tracing::debug;

use plugnix_eval::Prefetch;
use plugnix_manifest::{PluginDescriptor, RepoHost, ResolvedPlugin};

use crate::errors::ResolveError;

/// Resolve one descriptor to a pinned plugin. Implementations own all
/// network and subprocess traffic; the caller only sees the result.
pub trait RevisionSource {
    fn resolve(&self, desc: &PluginDescriptor) -> Result<ResolvedPlugin, ResolveError>;
}

/// Production `RevisionSource`: GitHub API + `git ls-remote`, with the
/// source hash computed by the injected prefetcher.
pub struct RemoteSource<P> {
    http: reqwest::blocking::Client,
    api_base: String,
    git_path: String,
    prefetch: P,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    committer: Option<CommitSignature>,
    author: Option<CommitSignature>,
}

#[derive(Deserialize)]
struct CommitSignature {
    date: String,
}

impl<P: Prefetch> RemoteSource<P> {
    pub fn new(api_base: String, git_path: String, prefetch: P) -> Result<Self, ResolveError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("plugnix/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(RemoteSource {
            http,
            api_base,
            git_path,
            prefetch,
        })
    }

    /// Latest commit id and date on the requested ref
    fn latest_github_commit(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> Result<(String, String), ResolveError> {
        let url = format!(
            "{}/repos/{}/{}/commits/{}",
            self.api_base, owner, repo, reference
        );
        debug!("GET {}", url);

        let response: CommitResponse = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()?
            .error_for_status()?
            .json()?;

        let signature = response.commit.committer.or(response.commit.author).ok_or(
            ResolveError::NoRevision {
                url,
                reference: reference.to_string(),
            },
        )?;

        Ok((response.sha, signature.date))
    }

    /// Latest commit id on the requested ref of an arbitrary git host
    fn ls_remote(&self, url: &str, reference: &str) -> Result<String, ResolveError> {
        debug!("git ls-remote {} {}", url, reference);
        let output = Command::new(&self.git_path)
            .args(["ls-remote", url, reference])
            .output()?;

        if !output.status.success() {
            return Err(ResolveError::CommandFailed {
                command: format!("{} ls-remote {} {}", self.git_path, url, reference),
                status: output.status.code(),
            });
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().next())
            .map(str::to_string)
            .ok_or(ResolveError::NoRevision {
                url: url.to_string(),
                reference: reference.to_string(),
            })
    }
}

impl<P: Prefetch> RevisionSource for RemoteSource<P> {
    fn resolve(&self, desc: &PluginDescriptor) -> Result<ResolvedPlugin, ResolveError> {
        let reference = desc.branch.as_deref().unwrap_or("HEAD");

        match desc.host() {
            RepoHost::GitHub { owner, repo } => {
                let (commit, date) = self.latest_github_commit(owner, repo, reference)?;
                let sha256 = self.prefetch.github_archive(owner, repo, &commit)?;
                Ok(ResolvedPlugin {
                    name: desc.name().to_string(),
                    version: short_date(&date),
                    commit,
                    sha256,
                })
            }
            RepoHost::Git => {
                let url = desc.uri();
                let commit = self.ls_remote(&url, reference)?;
                let archive = self.prefetch.git_checkout(&url, &commit)?;
                Ok(ResolvedPlugin {
                    name: desc.name().to_string(),
                    version: short_date(&archive.date),
                    commit,
                    sha256: archive.sha256,
                })
            }
        }
    }
}

/// `YYYY-MM-DD` portion of an ISO-8601 timestamp
fn short_date(date: &str) -> String {
    date.get(..10).unwrap_or(date).to_string()
}
