use thiserror::Error;

use plugnix_eval::EvalError;
use plugnix_manifest::ManifestError;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Prefetch failed: {0}")]
    Prefetch(#[from] EvalError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("git ls-remote {url} returned no revision for '{reference}'")]
    NoRevision { url: String, reference: String },

    #[error("Command failed: {command} (exit {status:?})")]
    CommandFailed {
        command: String,
        status: Option<i32>,
    },
}
