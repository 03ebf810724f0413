//! Fixed-output hash prefetch for plugin sources
//!
//! GitHub sources hash the release tarball via `nix-prefetch-url --unpack`;
//! anything else goes through `nix-prefetch-git`. Both tools ship with the
//! standard nix install and are looked up on PATH.

use std::process::Command;
use tracing::debug;

use crate::errors::EvalError;

/// Result of prefetching a generic git checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitArchive {
    pub sha256: String,
    /// Commit timestamp as reported by the prefetch tool (ISO-8601)
    pub date: String,
}

/// Compute the source hash for a pinned revision
pub trait Prefetch {
    fn github_archive(&self, owner: &str, repo: &str, rev: &str) -> Result<String, EvalError>;

    fn git_checkout(&self, url: &str, rev: &str) -> Result<GitArchive, EvalError>;
}

/// `Prefetch` backed by the nix prefetch tools
#[derive(Debug, Default)]
pub struct NixPrefetch;

impl NixPrefetch {
    pub fn new() -> Self {
        NixPrefetch
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<String, EvalError> {
        debug!("{} {}", program, args.join(" "));
        let output = Command::new(program).args(args).output()?;
        if !output.status.success() {
            return Err(EvalError::CommandFailed {
                command: format!("{} {}", program, args.join(" ")),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8(output.stdout)?)
    }
}

impl Prefetch for NixPrefetch {
    fn github_archive(&self, owner: &str, repo: &str, rev: &str) -> Result<String, EvalError> {
        let url = format!("https://github.com/{}/{}/archive/{}.tar.gz", owner, repo, rev);
        let stdout = self.run("nix-prefetch-url", &["--unpack", &url])?;
        parse_prefetch_url_hash(&stdout).ok_or(EvalError::NoHash { url })
    }

    fn git_checkout(&self, url: &str, rev: &str) -> Result<GitArchive, EvalError> {
        let stdout = self.run("nix-prefetch-git", &["--url", url, "--rev", rev])?;
        parse_prefetch_git(&stdout).ok_or(EvalError::NoHash {
            url: url.to_string(),
        })
    }
}

/// `nix-prefetch-url` prints progress noise before the hash; the hash is the
/// last non-empty stdout line.
fn parse_prefetch_url_hash(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// `nix-prefetch-git` prints a JSON document carrying the hash and the
/// commit timestamp
fn parse_prefetch_git(stdout: &str) -> Option<GitArchive> {
    let value: serde_json::Value = serde_json::from_str(stdout).ok()?;
    let sha256 = value.get("sha256")?.as_str()?.to_string();
    let date = value.get("date")?.as_str()?.to_string();
    Some(GitArchive { sha256, date })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefetch_url_takes_last_line() {
        let stdout = "path is '/nix/store/xxx-source'\n0f37p6sa60cl2g5f5kx4xgcja2zl8mqn27qhci0p21wsjzvkvipz\n";
        assert_eq!(
            parse_prefetch_url_hash(stdout),
            Some("0f37p6sa60cl2g5f5kx4xgcja2zl8mqn27qhci0p21wsjzvkvipz".to_string())
        );
    }

    #[test]
    fn test_parse_prefetch_url_empty_output() {
        assert_eq!(parse_prefetch_url_hash("\n\n"), None);
    }

    #[test]
    fn test_parse_prefetch_git_reads_hash_and_date() {
        let stdout = r#"{
  "url": "https://example.org/repo",
  "rev": "deadbeef",
  "date": "2024-03-01T12:34:56+00:00",
  "sha256": "1gvpaqvvxjma0dl1zai68bpv42608apzzl2nsgj2kr0p9nnnycdv",
  "fetchSubmodules": false
}"#;
        assert_eq!(
            parse_prefetch_git(stdout),
            Some(GitArchive {
                sha256: "1gvpaqvvxjma0dl1zai68bpv42608apzzl2nsgj2kr0p9nnnycdv".to_string(),
                date: "2024-03-01T12:34:56+00:00".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_prefetch_git_rejects_non_json() {
        assert_eq!(parse_prefetch_git("not json"), None);
    }

    #[test]
    fn test_parse_prefetch_git_requires_hash() {
        assert_eq!(
            parse_prefetch_git(r#"{"date": "2024-03-01T12:34:56+00:00"}"#),
            None
        );
    }
}
