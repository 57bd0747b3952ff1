//! Test utilities for affected-core

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::builder::{build_graph, BuiltGraph};
use crate::collaborators::{ProjectFileReader, ProjectLocator};
use crate::error::{LocateError, ParseError};
use crate::model::{ProjectIdentity, RawProject};

pub const REPO: &str = "/repo";

/// Project file path for a project living in `/repo/<name>/<name>.csproj`.
pub fn project_path(name: &str) -> PathBuf {
    PathBuf::from(REPO).join(name).join(format!("{name}.csproj"))
}

pub fn identity(name: &str) -> ProjectIdentity {
    ProjectIdentity::new(project_path(name), name)
}

/// Raw project `name` referencing each of `references` by name.
pub fn raw(name: &str, references: &[&str]) -> RawProject {
    references
        .iter()
        .fold(RawProject::new(identity(name)), |project, r| {
            project.with_reference(project_path(r))
        })
}

/// Build a graph from `(project, references)` pairs.
pub fn graph_of(projects: &[(&str, &[&str])]) -> BuiltGraph {
    build_graph(projects.iter().map(|(name, refs)| raw(name, refs)))
}

pub fn identities(names: &[&str]) -> BTreeSet<ProjectIdentity> {
    names.iter().map(|n| identity(n)).collect()
}

pub fn names(set: &BTreeSet<ProjectIdentity>) -> Vec<String> {
    set.iter().map(|p| p.name.clone()).collect()
}

/// In-memory locator and reader over a fixed set of raw projects.
#[derive(Default)]
pub struct FakeWorkspace {
    pub projects: HashMap<PathBuf, RawProject>,
    pub filters: HashMap<PathBuf, Vec<PathBuf>>,
    pub broken: Vec<PathBuf>,
}

impl FakeWorkspace {
    pub fn new(projects: &[(&str, &[&str])]) -> Self {
        let projects = projects
            .iter()
            .map(|(name, refs)| (project_path(name), raw(name, refs)))
            .collect();
        FakeWorkspace {
            projects,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: &str, names: &[&str]) -> Self {
        self.filters
            .insert(PathBuf::from(filter), names.iter().map(|n| project_path(n)).collect());
        self
    }

    pub fn with_broken(mut self, name: &str) -> Self {
        self.broken.push(project_path(name));
        self
    }
}

impl ProjectLocator for FakeWorkspace {
    fn discover(&self, _root: &Path, filter_file: Option<&Path>) -> Result<Vec<PathBuf>, LocateError> {
        let mut paths: Vec<PathBuf> = match filter_file {
            Some(filter) => self.filters.get(filter).cloned().ok_or_else(|| LocateError::InvalidFilterFile {
                path: filter.to_path_buf(),
                reason: "unknown filter".to_string(),
            })?,
            None => self
                .projects
                .keys()
                .chain(self.broken.iter())
                .cloned()
                .collect(),
        };
        paths.sort();
        Ok(paths)
    }
}

impl ProjectFileReader for FakeWorkspace {
    fn read(&self, project_file: &Path, properties: &[String]) -> Result<RawProject, ParseError> {
        if self.broken.iter().any(|b| b == project_file) {
            return Err(ParseError::Malformed {
                path: project_file.to_path_buf(),
                reason: "unexpected end of file".to_string(),
            });
        }
        let mut project = self
            .projects
            .get(project_file)
            .cloned()
            .ok_or_else(|| ParseError::Unsupported {
                path: project_file.to_path_buf(),
            })?;
        for key in properties {
            project
                .properties
                .insert(key.clone(), format!("{}-{}", project.identity.name, key));
        }
        Ok(project)
    }
}
