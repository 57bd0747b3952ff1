//! Finds project files under a repository root or from a filter file

use std::path::{Path, PathBuf};

use affected_core::{LocateError, ProjectLocator};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::filter_file::read_filter_file;
use crate::format::{ProjectFormat, ProjectFormats};

/// Build output and dependency caches never hold project definitions.
const PRUNED_DIRS: &[&str] = &["bin", "obj", "target", "node_modules"];

/// Walks the repository honouring `.gitignore`, matching the enabled formats.
#[derive(Debug, Clone)]
pub struct RepositoryLocator {
    formats: ProjectFormats,
    globs: GlobSet,
}

impl RepositoryLocator {
    pub fn new(formats: ProjectFormats) -> Result<Self, LocateError> {
        let mut builder = GlobSetBuilder::new();
        for format in formats.iter() {
            for pattern in format.globs() {
                let glob = GlobBuilder::new(pattern)
                    .case_insensitive(format == ProjectFormat::MsBuild)
                    .build()
                    .map_err(|e| LocateError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: e.to_string(),
                    })?;
                builder.add(glob);
            }
        }
        let globs = builder.build().map_err(|e| LocateError::InvalidPattern {
            pattern: "<project globs>".to_string(),
            reason: e.to_string(),
        })?;
        Ok(RepositoryLocator { formats, globs })
    }

    pub fn formats(&self) -> &ProjectFormats {
        &self.formats
    }

    fn is_project_file(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.globs.is_match(name)) && self.formats.supports(path)
    }

    fn scan(&self, root: &Path) -> Result<Vec<PathBuf>, LocateError> {
        std::fs::metadata(root).map_err(|source| LocateError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .filter_entry(|entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && entry.depth() > 0 && PRUNED_DIRS.iter().any(|d| entry.file_name() == *d))
            })
            .build();

        let mut found = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Cannot read entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if self.is_project_file(entry.path()) {
                debug!("Found project file {}", entry.path().display());
                found.push(canonical(entry.path())?);
            }
        }
        Ok(found)
    }

    fn from_filter(&self, filter_file: &Path) -> Result<Vec<PathBuf>, LocateError> {
        let listed = read_filter_file(filter_file)?;
        debug!("{} lists {} projects", filter_file.display(), listed.len());

        let mut found = Vec::with_capacity(listed.len());
        for path in listed {
            if !path.is_file() {
                warn!(
                    "{} listed in {} does not exist, skipping",
                    path.display(),
                    filter_file.display()
                );
                continue;
            }
            if !self.formats.supports(&path) {
                debug!("{} is not an enabled project format, skipping", path.display());
                continue;
            }
            found.push(canonical(&path)?);
        }
        Ok(found)
    }
}

impl ProjectLocator for RepositoryLocator {
    fn discover(&self, root: &Path, filter_file: Option<&Path>) -> Result<Vec<PathBuf>, LocateError> {
        let mut projects = match filter_file {
            Some(filter) => self.from_filter(filter)?,
            None => self.scan(root)?,
        };
        projects.sort();
        projects.dedup();
        Ok(projects)
    }
}

fn canonical(path: &Path) -> Result<PathBuf, LocateError> {
    std::fs::canonicalize(path).map_err(|source| LocateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
