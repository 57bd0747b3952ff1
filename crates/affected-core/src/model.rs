//! Core data structures for the project graph

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths;

/// Unique, stable handle for a project.
///
/// `path` is the canonical path of the project file. Equality, ordering and
/// hashing only look at the path; `name` is for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectIdentity {
    pub path: PathBuf,
    pub name: String,
}

impl ProjectIdentity {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        ProjectIdentity {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Identity named after the file stem (`src/Api/Api.csproj` -> `Api`).
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        ProjectIdentity { path, name }
    }

    /// Directory owning the project file. Files below it belong to this project.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }
}

impl PartialEq for ProjectIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ProjectIdentity {}

impl Hash for ProjectIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl PartialOrd for ProjectIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProjectIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl fmt::Display for ProjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

/// Caller-requested metadata extracted from a project file.
pub type Properties = BTreeMap<String, String>;

/// A project as handed over by a `ProjectFileReader`, before graph build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProject {
    pub identity: ProjectIdentity,
    /// Referenced project files. Relative entries resolve against the project directory.
    pub references: Vec<PathBuf>,
    pub properties: Properties,
}

impl RawProject {
    pub fn new(identity: ProjectIdentity) -> Self {
        RawProject {
            identity,
            references: Vec::new(),
            properties: Properties::new(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<PathBuf>) -> Self {
        self.references.push(reference.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A single project in the graph. Edges live in the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectNode {
    pub identity: ProjectIdentity,
    pub properties: Properties,
}

impl ProjectNode {
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn path(&self) -> &Path {
        &self.identity.path
    }
}

/// Normalized absolute paths of the files that changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    files: BTreeSet<PathBuf>,
}

impl ChangeSet {
    pub fn new() -> Self {
        ChangeSet::default()
    }

    /// Build a change set from paths that may be relative to `root`.
    pub fn from_paths<I, P>(root: &Path, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut set = ChangeSet::new();
        for path in paths {
            set.files.insert(paths::absolutize(root, path.as_ref()));
        }
        set
    }

    pub fn insert(&mut self, path: impl AsRef<Path>) -> bool {
        self.files.insert(paths::normalize(path.as_ref()))
    }

    pub fn extend(&mut self, other: ChangeSet) {
        self.files.extend(other.files);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(&paths::normalize(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<P: AsRef<Path>> FromIterator<P> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = P>>(iter: T) -> Self {
        let mut set = ChangeSet::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}

/// A recoverable problem found while assembling the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A project reference points outside the discovered projects; the edge was dropped.
    UnresolvedReference { project: PathBuf, reference: PathBuf },
    /// Two project records share a canonical path; the later one was dropped.
    DuplicateProject { path: PathBuf },
    /// A project file could not be read and is absent from the graph.
    SkippedProject { path: PathBuf, reason: String },
    /// An assumed change names no known project.
    UnknownAssumedProject { name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedReference { project, reference } => write!(
                f,
                "{} references {} which is not a discovered project",
                project.display(),
                reference.display()
            ),
            Diagnostic::DuplicateProject { path } => {
                write!(f, "{} was discovered more than once", path.display())
            }
            Diagnostic::SkippedProject { path, reason } => {
                write!(f, "skipped {}: {}", path.display(), reason)
            }
            Diagnostic::UnknownAssumedProject { name } => {
                write!(f, "assumed change {name} does not match any project")
            }
        }
    }
}
