//! Core data types for sketches, launch outcomes, and errors.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Suffix appended to a sketch source file when it is replaced.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Summary of one sketch directory as found on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SketchInfo {
    pub name: String,
    pub source_path: PathBuf,
    /// Size of the primary source file, if present.
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub has_backup: bool,
}

/// Result of launching the runner for a sketch.
///
/// The runner usually keeps its own window open, so an unfinished process
/// after the launch timeout counts as `Started`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum LaunchOutcome {
    /// Runner finished quietly or is still running.
    Started,
    /// Runner wrote to stderr before the timeout. It may still be running.
    StartedWithWarning(String),
    /// The runner process could not be spawned or waited on.
    FailedToStart(String),
}

/// Coarse category of a [`SketchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    NotFound,
    InvalidInput,
    Io,
}

/// Errors that can occur in the sketch bridge.
#[derive(thiserror::Error, Debug)]
pub enum SketchError {
    #[error("Sketch directory {0} does not exist")]
    RootMissing(PathBuf),

    #[error("Runner executable does not exist at {0}")]
    RunnerMissing(PathBuf),

    #[error("Sketch {name} does not exist in {root}")]
    SketchNotFound { name: String, root: PathBuf },

    #[error("Invalid sketch name {0:?}")]
    InvalidName(String),

    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SketchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SketchError::RootMissing(_) | SketchError::RunnerMissing(_) => ErrorKind::Config,
            SketchError::SketchNotFound { .. } => ErrorKind::NotFound,
            SketchError::InvalidName(_) => ErrorKind::InvalidInput,
            SketchError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SketchError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Convenience result type.
pub type SketchResult<T> = Result<T, SketchError>;
