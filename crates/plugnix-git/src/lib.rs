//! Version-control binding
//!
//! The cascade controller stages and commits exactly one generated file.
//! The `Vcs` trait is the seam it consumes; `GitCli` is the production
//! implementation driving the `git` binary inside the target tree.

pub mod errors;

pub use errors::GitError;

use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// The slice of version control the cascade needs: working-tree diff for
/// one path, staging that path, and committing.
pub trait Vcs {
    /// Whether the working tree shows a change for exactly this path
    fn has_changes(&self, path: &str) -> Result<bool, GitError>;

    fn stage(&self, path: &str) -> Result<(), GitError>;

    fn commit(&self, message: &str) -> Result<(), GitError>;
}

/// `Vcs` backed by the `git` binary, operating inside one repository
pub struct GitCli {
    git_path: String,
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(git_path: String, workdir: PathBuf) -> Self {
        GitCli { git_path, workdir }
    }

    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        debug!("git {}", args.join(" "));
        let output = Command::new(&self.git_path)
            .current_dir(&self.workdir)
            .args(args)
            .output()?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Vcs for GitCli {
    fn has_changes(&self, path: &str) -> Result<bool, GitError> {
        let stdout = self.run(&["diff", "--name-only", "--", path])?;
        Ok(stdout.lines().any(|line| !line.trim().is_empty()))
    }

    fn stage(&self, path: &str) -> Result<(), GitError> {
        self.run(&["add", "--", path])?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run(&["commit", "-m", message])?;
        Ok(())
    }
}
