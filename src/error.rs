//! Error types for sysdialog

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DialogError {
    /// None of the known helper programs could be found. Permanent for the
    /// lifetime of the `Selector` that reported it.
    #[error("no dialog backend available (searched: {})", .searched.join(", "))]
    NoBackendAvailable { searched: Vec<String> },

    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("dialog timed out")]
    TimedOut,

    /// The caller's cancellation token fired before the dialog returned.
    #[error("dialog interrupted")]
    Interrupted,

    /// The optional third button was pressed; carries its label.
    #[error("extra button pressed: {0}")]
    ExtraButton(String),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dialog backend failed (exit code {}): {stderr}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ExecutionFailed { code: Option<i32>, stderr: String },

    #[error("malformed dialog output: {0}")]
    MalformedOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DialogError {
    /// True for both a configured timeout and a dialog that gave up on its own.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DialogError::TimedOut)
    }
}

pub type Result<T> = std::result::Result<T, DialogError>;
