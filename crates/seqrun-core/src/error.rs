//! Error taxonomy for a run.
//!
//! Every failure is fatal to the whole run. [`RunError`] names the file or
//! script involved so the CLI can print a single identifying message and
//! exit with [`RunError::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

/// A fatal failure while loading configuration or running scripts.
#[derive(Debug, Error)]
pub enum RunError {
    /// Env file or plan file missing, unreadable, or malformed.
    #[error("Config error in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// Working directory missing, not a directory, or unreadable.
    #[error("Directory error for {}: {reason}", path.display())]
    Directory { path: PathBuf, reason: String },

    /// A listed script does not exist in the working directory.
    #[error("Script '{script}' not found at {}", path.display())]
    NotFound { script: String, path: PathBuf },

    /// A script ran and exited non-zero.
    #[error("Script '{script}' failed with exit code {code}")]
    Subprocess { script: String, code: i32 },

    /// The interpreter could not be started at all.
    #[error("Failed to start '{}' for script '{script}': {source}", interpreter.display())]
    Spawn {
        script: String,
        interpreter: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    pub fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn directory(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Directory {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Process exit code for this failure. Always `1`.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Name of the script this error is about, if any.
    pub fn script(&self) -> Option<&str> {
        match self {
            Self::NotFound { script, .. }
            | Self::Subprocess { script, .. }
            | Self::Spawn { script, .. } => Some(script),
            Self::Config { .. } | Self::Directory { .. } => None,
        }
    }

    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Directory { .. } => "directory",
            Self::NotFound { .. } => "not-found",
            Self::Subprocess { .. } => "subprocess",
            Self::Spawn { .. } => "spawn",
        }
    }
}

pub type Result<T> = std::result::Result<T, RunError>;
