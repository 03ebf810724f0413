//! Nix evaluation sidecar
//!
//! Wraps the `nix` binary for read-only expression queries against the
//! target tree, reachable through `<localpkgs>`. The `Evaluator` trait is
//! the seam consumed by the orchestrator and the cascade controller; tests
//! substitute fakes instead of spawning processes.

pub mod errors;
pub mod prefetch;

pub use errors::EvalError;
pub use prefetch::{GitArchive, NixPrefetch, Prefetch};

use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Names available under the companion Lua package set
pub const LUA_PACKAGES_EXPR: &str = "with import <localpkgs> { }; lib.attrNames lua51Packages";

/// Currently pinned revision of the tracked plugin in the tree snapshot
pub const TREESITTER_REV_EXPR: &str =
    "(import <localpkgs> { }).vimPlugins.nvim-treesitter.src.rev";

/// Read-only expression evaluation against the current tree snapshot
pub trait Evaluator {
    /// Evaluate to a bare string (`--raw`)
    fn raw(&self, expr: &str) -> Result<String, EvalError>;

    /// Evaluate to a JSON value (`--json`)
    fn json(&self, expr: &str) -> Result<serde_json::Value, EvalError>;
}

/// `Evaluator` backed by the `nix` binary
pub struct NixEval {
    nix_path: String,
    root: PathBuf,
}

impl NixEval {
    pub fn new(nix_path: String, root: PathBuf) -> Self {
        NixEval { nix_path, root }
    }

    fn run(&self, mode: &str, expr: &str) -> Result<String, EvalError> {
        let include = format!("localpkgs={}", self.root.display());
        let args = [
            "eval",
            "--extra-experimental-features",
            "nix-command",
            "--impure",
            "-I",
            include.as_str(),
            mode,
            "--expr",
            expr,
        ];
        debug!("nix {}", args.join(" "));

        let output = Command::new(&self.nix_path).args(args).output()?;
        if !output.status.success() {
            return Err(EvalError::CommandFailed {
                command: format!("{} eval {} --expr {}", self.nix_path, mode, expr),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}

impl Evaluator for NixEval {
    fn raw(&self, expr: &str) -> Result<String, EvalError> {
        Ok(self.run("--raw", expr)?.trim().to_string())
    }

    fn json(&self, expr: &str) -> Result<serde_json::Value, EvalError> {
        Ok(serde_json::from_str(&self.run("--json", expr)?)?)
    }
}

/// Query the companion package set once and return its attribute names
pub fn query_membership(eval: &dyn Evaluator) -> Result<Vec<String>, EvalError> {
    let value = eval.json(LUA_PACKAGES_EXPR)?;
    Ok(serde_json::from_value(value)?)
}
