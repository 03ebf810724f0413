use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command failed: {command} (exit {status:?}): {stderr}")]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Failed to parse evaluation output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Evaluation produced non-UTF-8 output")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Prefetch produced no hash for {url}")]
    NoHash { url: String },
}
