//! Core types for the plugin set
//!
//! A `PluginDescriptor` is one entry of the plugin-list source: where the
//! plugin lives. A `ResolvedPlugin` is the pinned result of resolving that
//! entry. The `MembershipSet` is the companion Lua package set used purely
//! as a classification oracle.

use std::collections::HashSet;

/// Where a plugin repository is hosted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoHost {
    GitHub { owner: String, repo: String },
    Git,
}

/// One entry of the plugin-list source, read-only after parsing
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    url: String,
    host: RepoHost,
    repo_name: String,
    pub branch: Option<String>,
    pub alias: Option<String>,
}

impl PluginDescriptor {
    pub fn new(url: &str, branch: Option<String>, alias: Option<String>) -> Self {
        let trimmed = url.trim_end_matches('/');
        let repo_name = trimmed
            .rsplit('/')
            .next()
            .unwrap_or(trimmed)
            .trim_end_matches(".git")
            .to_string();

        PluginDescriptor {
            url: url.to_string(),
            host: parse_host(trimmed),
            repo_name,
            branch,
            alias,
        }
    }

    /// Human-readable name: the alias when given, the repository basename
    /// otherwise. This is the manifest sort key.
    pub fn name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.repo_name)
    }

    pub fn host(&self) -> &RepoHost {
        &self.host
    }

    /// Homepage literal for the manifest fragment. GitHub repositories are
    /// canonicalized so that list formatting does not leak into the output.
    pub fn uri(&self) -> String {
        match self.host {
            RepoHost::GitHub {
                ref owner,
                ref repo,
            } => format!("https://github.com/{}/{}/", owner, repo),
            RepoHost::Git => self.url.clone(),
        }
    }

    /// Render the fetcher expression pinning this plugin's source
    pub fn src_expr(&self, plugin: &ResolvedPlugin) -> String {
        match self.host {
            RepoHost::GitHub {
                ref owner,
                ref repo,
            } => format!(
                "fetchFromGitHub {{\n      owner = \"{}\";\n      repo = \"{}\";\n      rev = \"{}\";\n      sha256 = \"{}\";\n    }}",
                owner, repo, plugin.commit, plugin.sha256
            ),
            RepoHost::Git => format!(
                "fetchgit {{\n      url = \"{}\";\n      rev = \"{}\";\n      sha256 = \"{}\";\n    }}",
                self.url, plugin.commit, plugin.sha256
            ),
        }
    }
}

fn parse_host(url: &str) -> RepoHost {
    if let Some(rest) = url
        .split_once("github.com/")
        .map(|(_, rest)| rest)
    {
        let mut segments = rest.split('/').filter(|s| !s.is_empty());
        if let (Some(owner), Some(repo)) = (segments.next(), segments.next()) {
            return RepoHost::GitHub {
                owner: owner.to_string(),
                repo: repo.trim_end_matches(".git").to_string(),
            };
        }
    }
    RepoHost::Git
}

/// Immutable result of one plugin resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlugin {
    /// Human-readable name, matching the descriptor's
    pub name: String,
    /// Pinned version string: the commit date, `YYYY-MM-DD`
    pub version: String,
    /// Pinned revision identifier
    pub commit: String,
    /// Prefetched fixed-output hash of the source
    pub sha256: String,
}

impl ResolvedPlugin {
    /// Nix attribute name: dots become dashes, and a leading digit gets a
    /// `_` prefix since attribute names cannot start with one.
    pub fn normalized_name(&self) -> String {
        let name = self.name.replace('.', "-");
        if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            format!("_{}", name)
        } else {
            name
        }
    }
}

/// Normalized names available under the companion build strategy.
/// Built once per run from the sidecar query, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct MembershipSet(HashSet<String>);

impl MembershipSet {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for MembershipSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        MembershipSet(iter.into_iter().collect())
    }
}
