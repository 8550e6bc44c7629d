//! Failure taxonomy for a finishing run.
//!
//! Every step returns `Result<_, FinishError>`. None of these are retried;
//! the driver stops at the first one and reports its message verbatim.

use pyfinish_schema::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Status returned to the caller when any step fails.
pub const EXIT_PROGRAM_FAILURE: i32 = -100;

/// Prefix the outermost boundary puts in front of a failure message.
pub const PROGRAM_FAILURE_MARKER: &str = "Program failure: ";

#[derive(Error, Debug)]
pub enum FinishError {
    #[error("Unable to determine the host OS type")]
    UnknownPlatform,

    #[error("Unable to find the LLDB.framework directory '{}'", path.display())]
    FrameworkDirectoryMissing { path: PathBuf },

    #[error("Subpackage path '{relative}' is missing its leading slash")]
    MalformedSubpackagePath { relative: String },

    #[error("Unable to create directory '{}' error: {reason}", path.display())]
    DirectoryCreateFailed { path: PathBuf, reason: String },

    #[error("I/O error: {reason} copying Src:'{}' Dst:'{}'", src.display(), dest.display())]
    FileCopyFailed {
        src: PathBuf,
        dest: PathBuf,
        reason: String,
    },

    #[error("{reason} creating link Src:'{}' Target:'{}'", src.display(), target.display())]
    LinkCreationFailed {
        src: PathBuf,
        target: PathBuf,
        reason: String,
    },

    #[error("Unable to locate lldb.py at path '{}'", path.display())]
    PrimaryGlueFileMissing { path: PathBuf },

    #[error("Unable to query the Python interpreter: {reason}")]
    InterpreterUnavailable { reason: String },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl FinishError {
    pub(crate) fn copy_failed(
        src: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::FileCopyFailed {
            src: src.into(),
            dest: dest.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn interpreter(reason: impl std::fmt::Display) -> Self {
        Self::InterpreterUnavailable {
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for finishing operations
pub type Result<T> = std::result::Result<T, FinishError>;
