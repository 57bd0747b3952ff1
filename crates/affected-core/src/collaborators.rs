//! Capability traits for the parts of the pipeline that touch the outside world

use std::path::{Path, PathBuf};

use crate::error::{ChangeSetError, LocateError, ParseError};
use crate::model::{ChangeSet, RawProject};

/// Finds the project files making up the universe.
pub trait ProjectLocator: Send + Sync {
    /// Canonical, existing project file paths under `root`, or the ones named
    /// by `filter_file` when given.
    fn discover(&self, root: &Path, filter_file: Option<&Path>) -> Result<Vec<PathBuf>, LocateError>;
}

/// Parses one project file into a raw record.
pub trait ProjectFileReader: Send + Sync {
    fn read(&self, project_file: &Path, properties: &[String]) -> Result<RawProject, ParseError>;
}

/// Lists the files changed between two points in history.
pub trait ChangeSetProvider {
    /// `None` for `from` means the working tree against `HEAD`; `None` for `to`
    /// means the working tree.
    fn changed_files(&self, from: Option<&str>, to: Option<&str>) -> Result<ChangeSet, ChangeSetError>;
}

/// A fixed change set, ignoring the requested range.
impl ChangeSetProvider for ChangeSet {
    fn changed_files(&self, _from: Option<&str>, _to: Option<&str>) -> Result<ChangeSet, ChangeSetError> {
        Ok(self.clone())
    }
}
