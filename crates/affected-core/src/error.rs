//! Error types for the resolution pipeline and its collaborators

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Fatal errors of one invocation.
#[derive(Debug, Error)]
pub enum AffectedError {
    #[error("no readable project files found under {}", .root.display())]
    Discovery {
        root: PathBuf,
        filter: Option<PathBuf>,
    },

    #[error("invalid exclusion pattern {pattern:?}: {source}")]
    InvalidExclusion {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    ChangeSet(#[from] ChangeSetError),
}

/// A project file could not be turned into a `RawProject`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed project file {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    /// The file parses but describes no buildable project (e.g. a virtual Cargo manifest).
    #[error("{} does not define a project", .path.display())]
    NotAProject { path: PathBuf },

    #[error("no reader for {}", .path.display())]
    Unsupported { path: PathBuf },
}

impl ParseError {
    pub fn path(&self) -> &Path {
        match self {
            ParseError::Io { path, .. }
            | ParseError::Malformed { path, .. }
            | ParseError::NotAProject { path }
            | ParseError::Unsupported { path } => path,
        }
    }
}

/// Project discovery failed before any project was read.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {reason}", .root.display())]
    Walk { root: PathBuf, reason: String },

    #[error("invalid project pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid filter file {}: {reason}", .path.display())]
    InvalidFilterFile { path: PathBuf, reason: String },
}

/// The change set could not be computed.
#[derive(Debug, Error)]
pub enum ChangeSetError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("{} is not inside a git repository", .path.display())]
    NotARepository { path: PathBuf },

    #[error("invalid change range: {reason}")]
    InvalidRange { reason: String },
}

/// Distinguished outcome: nothing changed and nothing is affected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no affected projects were found for the given changes")]
pub struct NoChangesDetected;
