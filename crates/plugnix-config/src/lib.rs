//! Configuration for the plugnix CLI
//!
//! The configuration lives in a TOML file (default
//! `~/.config/plugnix/plugnix.toml`, override with `PLUGNIX_CONFIG`) and
//! stores the target tree root, file-path overrides, and the resolved
//! locations of the external `nix` and `git` binaries.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use which::which;

/// Plugin set directory, relative to the tree root
pub const PLUGIN_DIR: &str = "pkgs/applications/editors/vim/plugins";

/// Plugin-list source file, relative to the tree root
pub const PLUGIN_FILE: &str = "pkgs/applications/editors/vim/plugins/vim-plugin-names";

/// Generated manifest, relative to the tree root
pub const MANIFEST_FILE: &str = "pkgs/applications/editors/vim/plugins/generated.nix";

/// Subdirectory owning the grammar sub-update, relative to the tree root
pub const TREESITTER_DIR: &str = "pkgs/applications/editors/vim/plugins/nvim-treesitter";

/// Derived grammar artifact, relative to the tree root
pub const TREESITTER_ARTIFACT: &str =
    "pkgs/applications/editors/vim/plugins/nvim-treesitter/generated.nix";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{tool} is not installed or not on PATH ({hint})")]
    MissingTool { tool: String, hint: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nix_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_api: Option<String>,
}

impl Config {
    pub fn path() -> PathBuf {
        // Honor explicit override via PLUGNIX_CONFIG for tests / isolated runs.
        if let Ok(env_path) = std::env::var("PLUGNIX_CONFIG") {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        let default = Self::default_path();

        // A pointer file next to the default config may redirect to another
        // location, e.g. ~/.config/plugnix/.plugnix_config_path
        if let Some(parent) = default.parent() {
            let pointer = parent.join(".plugnix_config_path");
            if pointer.exists() {
                if let Ok(contents) = fs::read_to_string(&pointer) {
                    let trimmed = contents.trim();
                    if !trimmed.is_empty() {
                        return PathBuf::from(trimmed);
                    }
                }
            }
        }

        default
    }

    fn default_path() -> PathBuf {
        #[cfg(not(target_os = "windows"))]
        let base = dirs::home_dir().map(|home| home.join(".config"));

        #[cfg(target_os = "windows")]
        let base = dirs::config_dir();

        // Without a resolvable home, fall back to the working directory
        base.unwrap_or_default().join("plugnix").join("plugnix.toml")
    }

    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "root" => self.root.clone(),
            "plugin-file" => self.plugin_file.clone(),
            "manifest-path" => self.manifest_path.clone(),
            "nix-path" => self.nix_path.clone(),
            "git-path" => self.git_path.clone(),
            "github-api" => self.github_api.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) {
        match key {
            "root" => self.root = Some(value),
            "plugin-file" => self.plugin_file = Some(value),
            "manifest-path" => self.manifest_path = Some(value),
            "nix-path" => self.nix_path = Some(value),
            "git-path" => self.git_path = Some(value),
            "github-api" => self.github_api = Some(value),
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
            && self.plugin_file.is_none()
            && self.manifest_path.is_none()
            && self.nix_path.is_none()
            && self.git_path.is_none()
            && self.github_api.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&str, String)> {
        let mut values = Vec::new();
        if let Some(ref val) = self.root {
            values.push(("root", val.clone()));
        }
        if let Some(ref val) = self.plugin_file {
            values.push(("plugin-file", val.clone()));
        }
        if let Some(ref val) = self.manifest_path {
            values.push(("manifest-path", val.clone()));
        }
        if let Some(ref val) = self.nix_path {
            values.push(("nix-path", val.clone()));
        }
        if let Some(ref val) = self.git_path {
            values.push(("git-path", val.clone()));
        }
        if let Some(ref val) = self.github_api {
            values.push(("github-api", val.clone()));
        }
        values
    }

    /// Root of the target tree; defaults to the working directory
    pub fn get_root(&self) -> PathBuf {
        match self.root {
            Some(ref root) => PathBuf::from(root),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn get_plugin_file(&self) -> PathBuf {
        match self.plugin_file {
            Some(ref path) => PathBuf::from(path),
            None => self.get_root().join(PLUGIN_FILE),
        }
    }

    pub fn get_manifest_path(&self) -> PathBuf {
        match self.manifest_path {
            Some(ref path) => PathBuf::from(path),
            None => self.get_root().join(MANIFEST_FILE),
        }
    }

    pub fn get_treesitter_dir(&self) -> PathBuf {
        self.get_root().join(TREESITTER_DIR)
    }

    /// Grammar artifact path relative to the tree root, as git reports it
    pub fn treesitter_artifact(&self) -> &'static str {
        TREESITTER_ARTIFACT
    }

    /// GitHub API base URL; overridable for tests
    pub fn get_github_api(&self) -> String {
        self.github_api
            .clone()
            .unwrap_or_else(|| "https://api.github.com".to_string())
    }

    pub fn ensure_nix_path(&mut self) -> Result<String, ConfigError> {
        self.ensure_tool_path(
            "nix",
            "install nix from https://nixos.org/download or set nix-path in the config",
        )
    }

    pub fn ensure_git_path(&mut self) -> Result<String, ConfigError> {
        self.ensure_tool_path("git", "install git or set git-path in the config")
    }

    fn ensure_tool_path(&mut self, tool: &str, hint: &str) -> Result<String, ConfigError> {
        let stored = match tool {
            "nix" => &mut self.nix_path,
            _ => &mut self.git_path,
        };

        // Check if the stored path still exists
        if let Some(path) = stored.clone() {
            if std::path::Path::new(&path).exists() {
                return Ok(path);
            }
            // Path was in config but doesn't exist, clear it
            *stored = None;
        }

        match which(tool) {
            Ok(path) => {
                let path_str = path.to_string_lossy().trim().to_string();
                self.set(&format!("{}-path", tool), path_str.clone());
                self.save()?;
                Ok(path_str)
            }
            Err(_) => Err(ConfigError::MissingTool {
                tool: tool.to_string(),
                hint: hint.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = Config::default();
        assert!(config.is_empty());
    }

    #[test]
    fn test_config_set_get() {
        let mut config = Config::default();
        config.set("root", "/src/nixpkgs".to_string());
        assert_eq!(config.get("root"), Some("/src/nixpkgs".to_string()));
    }

    #[test]
    fn test_config_unknown_key() {
        let mut config = Config::default();
        config.set("unknown-key", "value".to_string());
        assert_eq!(config.get("unknown-key"), None);
    }

    #[test]
    fn test_default_paths_derive_from_root() {
        let mut config = Config::default();
        config.set("root", "/src/nixpkgs".to_string());
        assert_eq!(
            config.get_plugin_file(),
            PathBuf::from("/src/nixpkgs").join(PLUGIN_FILE)
        );
        assert_eq!(
            config.get_manifest_path(),
            PathBuf::from("/src/nixpkgs").join(MANIFEST_FILE)
        );
        assert_eq!(
            config.get_treesitter_dir(),
            PathBuf::from("/src/nixpkgs").join(TREESITTER_DIR)
        );
    }

    #[test]
    fn test_explicit_paths_win_over_root() {
        let mut config = Config::default();
        config.set("root", "/src/nixpkgs".to_string());
        config.set("manifest-path", "/tmp/generated.nix".to_string());
        assert_eq!(
            config.get_manifest_path(),
            PathBuf::from("/tmp/generated.nix")
        );
    }

    #[test]
    fn test_github_api_default() {
        let config = Config::default();
        assert_eq!(config.get_github_api(), "https://api.github.com");
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = Config::default();
        config.set("root", "/src/nixpkgs".to_string());
        config.set("git-path", "/usr/bin/git".to_string());

        let Ok(text) = toml::to_string_pretty(&config) else {
            return;
        };
        let parsed: Result<Config, _> = toml::from_str(&text);
        assert!(parsed.is_ok_and(|c| c.get("root") == Some("/src/nixpkgs".to_string())
            && c.get("git-path") == Some("/usr/bin/git".to_string())));
    }
}
