//! Invocation options, resolved once at the boundary and passed by value

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths;

/// How a filter file shapes the project universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Build the graph from the filter file's projects only.
    #[default]
    Narrow,
    /// Build the graph from the whole repository and only report the filter
    /// file's projects.
    Subset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedOptions {
    /// Root of the repository. Projects are discovered below it.
    pub repository_path: PathBuf,
    /// Solution or list file narrowing the projects, always absolute.
    pub filter_file_path: Option<PathBuf>,
    pub from_ref: Option<String>,
    pub to_ref: Option<String>,
    pub exclusion_regex: Option<String>,
    /// Project properties copied into each reported project.
    pub additional_properties: Vec<String>,
    /// Project names or paths treated as changed instead of asking version control.
    pub assume_changes: Vec<String>,
    pub filter_mode: FilterMode,
    /// Fail on the first unreadable project instead of skipping it.
    pub strict: bool,
}

impl AffectedOptions {
    /// Resolve the repository and filter paths against `current_dir`.
    ///
    /// An explicit repository path wins; otherwise the filter file's directory
    /// is used, and failing that the current directory.
    pub fn new(
        current_dir: &Path,
        repository_path: Option<PathBuf>,
        filter_file_path: Option<PathBuf>,
    ) -> Self {
        let repository_path = non_empty(repository_path);
        let filter_file_path = non_empty(filter_file_path);

        let repository_path =
            determine_repository_path(current_dir, repository_path.as_deref(), filter_file_path.as_deref());
        let filter_file_path = filter_file_path.map(|f| paths::absolutize(current_dir, &f));

        AffectedOptions {
            repository_path,
            filter_file_path,
            from_ref: None,
            to_ref: None,
            exclusion_regex: None,
            additional_properties: Vec::new(),
            assume_changes: Vec::new(),
            filter_mode: FilterMode::default(),
            strict: false,
        }
    }

    pub fn with_refs(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.from_ref = from.filter(|r| !r.is_empty());
        self.to_ref = to.filter(|r| !r.is_empty());
        self
    }

    pub fn with_exclusion(mut self, pattern: Option<String>) -> Self {
        self.exclusion_regex = pattern.filter(|p| !p.is_empty());
        self
    }

    pub fn with_properties(mut self, properties: Vec<String>) -> Self {
        self.additional_properties = properties;
        self
    }

    pub fn with_assumed_changes(mut self, projects: Vec<String>) -> Self {
        self.assume_changes = projects;
        self
    }

    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

fn determine_repository_path(current_dir: &Path, repository: Option<&Path>, filter: Option<&Path>) -> PathBuf {
    if let Some(repository) = repository {
        return paths::absolutize(current_dir, repository);
    }

    match filter.and_then(Path::parent) {
        Some(dir) if !dir.as_os_str().is_empty() => paths::absolutize(current_dir, dir),
        _ => paths::normalize(current_dir),
    }
}
