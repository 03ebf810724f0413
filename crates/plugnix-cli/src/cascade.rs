//! Grammar-update cascade
//!
//! After a manifest run, the tracked nvim-treesitter plugin may have moved
//! to a new revision. When it has, its own update program must regenerate
//! the grammar definitions, and the resulting artifact change is committed:
//! one commit, one path, nothing else. When the revision is unchanged, or
//! the nested update leaves the artifact identical, no commit is made, so
//! running twice in a row without upstream changes commits nothing.

use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

use plugnix_eval::{EvalError, Evaluator, TREESITTER_REV_EXPR};
use plugnix_git::{GitError, Vcs};

/// The plugin whose revision advance triggers the cascade
pub const TRACKED_PLUGIN: &str = "nvim-treesitter";

/// Fixed message for the grammar artifact commit
pub const GRAMMAR_COMMIT_MSG: &str = "vimPlugins.nvim-treesitter: update grammars";

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Version-control error: {0}")]
    Git(#[from] GitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Grammar update failed: {command} (exit {status:?})")]
    UpdateFailed {
        command: String,
        status: Option<i32>,
    },
}

/// Nested update process regenerating the tracked plugin's derived artifact
pub trait GrammarUpdater {
    fn update(&self) -> Result<(), CascadeError>;
}

/// Runs the tracked plugin's own update program, with the working directory
/// fixed to that plugin's subdirectory. Output streams through to the user.
pub struct ProcessUpdater {
    program: PathBuf,
    workdir: PathBuf,
}

impl ProcessUpdater {
    pub fn new(workdir: PathBuf) -> Self {
        ProcessUpdater {
            program: workdir.join("update.py"),
            workdir,
        }
    }
}

impl GrammarUpdater for ProcessUpdater {
    fn update(&self) -> Result<(), CascadeError> {
        let status = Command::new(&self.program)
            .current_dir(&self.workdir)
            .status()?;

        if !status.success() {
            return Err(CascadeError::UpdateFailed {
                command: self.program.display().to_string(),
                status: status.code(),
            });
        }
        Ok(())
    }
}

/// Pinned revision of the tracked plugin in the current tree snapshot,
/// queried before the manifest is assembled
pub fn snapshot_revision(eval: &dyn Evaluator) -> Result<String, CascadeError> {
    Ok(eval.raw(TREESITTER_REV_EXPR)?)
}

/// Terminal state of one cascade pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// Revision unchanged, or the tracked plugin was not part of this run
    NoOp,
    /// Nested update ran but the derived artifact is identical
    NoArtifactChange,
    Committed,
}

/// Compare the pre-run snapshot against the freshly resolved revision and,
/// on a mismatch, run the nested update and commit the artifact change.
pub fn run(
    snapshot: &str,
    resolved: Option<&str>,
    updater: &dyn GrammarUpdater,
    vcs: &dyn Vcs,
    artifact: &str,
) -> Result<CascadeOutcome, CascadeError> {
    let Some(fresh) = resolved else {
        return Ok(CascadeOutcome::NoOp);
    };
    if fresh == snapshot {
        return Ok(CascadeOutcome::NoOp);
    }

    println!("updating {} grammars", TRACKED_PLUGIN);
    updater.update()?;

    // The revision comparison and the working-tree diff may disagree; the
    // diff wins and an unchanged artifact means no commit.
    if !vcs.has_changes(artifact)? {
        println!("no updates to {} grammars", TRACKED_PLUGIN);
        return Ok(CascadeOutcome::NoArtifactChange);
    }

    println!("committing to nixpkgs: {}", GRAMMAR_COMMIT_MSG);
    vcs.stage(artifact)?;
    vcs.commit(GRAMMAR_COMMIT_MSG)?;
    Ok(CascadeOutcome::Committed)
}
