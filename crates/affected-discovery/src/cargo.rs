//! Cargo manifest reader

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use affected_core::paths;
use affected_core::{ParseError, ProjectFileReader, ProjectIdentity, RawProject};
use toml::{Table, Value};
use tracing::debug;

const DEPENDENCY_TABLES: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

/// Manifest paths of `[workspace.dependencies]` entries that carry a `path`.
pub type WorkspaceDependencies = BTreeMap<String, PathBuf>;

/// Reads package manifests, resolving `{ workspace = true }` dependencies
/// through the nearest enclosing `[workspace]` manifest.
///
/// Clones share the workspace cache.
#[derive(Debug, Clone, Default)]
pub struct CargoManifestReader {
    /// Keyed by candidate manifest path; `None` when it defines no workspace.
    workspaces: Arc<Mutex<HashMap<PathBuf, Option<Arc<WorkspaceDependencies>>>>>,
}

impl CargoManifestReader {
    pub fn new() -> Self {
        CargoManifestReader::default()
    }

    /// Dependencies of the nearest `[workspace]` at or above `project_file`.
    pub fn enclosing_workspace(&self, project_file: &Path) -> Option<Arc<WorkspaceDependencies>> {
        project_file
            .parent()?
            .ancestors()
            .find_map(|dir| self.workspace_at(&dir.join("Cargo.toml")))
    }

    fn workspace_at(&self, manifest: &Path) -> Option<Arc<WorkspaceDependencies>> {
        if let Some(cached) = self.cache().get(manifest) {
            return cached.clone();
        }
        let loaded = load_workspace(manifest).map(Arc::new);
        self.cache().insert(manifest.to_path_buf(), loaded.clone());
        loaded
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Option<Arc<WorkspaceDependencies>>>> {
        self.workspaces.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProjectFileReader for CargoManifestReader {
    fn read(&self, project_file: &Path, properties: &[String]) -> Result<RawProject, ParseError> {
        let content = std::fs::read_to_string(project_file).map_err(|source| ParseError::Io {
            path: project_file.to_path_buf(),
            source,
        })?;
        let workspace = self.enclosing_workspace(project_file);
        parse_manifest(project_file, &content, properties, workspace.as_deref())
    }
}

/// `[workspace.dependencies]` of `manifest`, if it defines a workspace.
fn load_workspace(manifest: &Path) -> Option<WorkspaceDependencies> {
    let content = std::fs::read_to_string(manifest).ok()?;
    let table: Table = match toml::from_str(&content) {
        Ok(table) => table,
        Err(e) => {
            debug!("Cannot parse {} while looking for a workspace: {}", manifest.display(), e);
            return None;
        }
    };
    let workspace = table.get("workspace").and_then(Value::as_table)?;
    let root = manifest.parent()?;
    debug!("Using workspace manifest {}", manifest.display());

    let dependencies = workspace
        .get("dependencies")
        .and_then(Value::as_table)
        .into_iter()
        .flatten()
        .filter_map(|(name, dependency)| {
            let path = dependency.get("path").and_then(Value::as_str)?;
            let dir = paths::absolutize(root, &paths::from_portable(path));
            Some((name.clone(), dir.join("Cargo.toml")))
        })
        .collect();
    Some(dependencies)
}

/// Parse a `Cargo.toml`. Virtual workspace manifests are not projects.
///
/// `workspace` resolves dependencies declared with `workspace = true`.
pub fn parse_manifest(
    project_file: &Path,
    content: &str,
    properties: &[String],
    workspace: Option<&WorkspaceDependencies>,
) -> Result<RawProject, ParseError> {
    let manifest: Table = toml::from_str(content).map_err(|e| ParseError::Malformed {
        path: project_file.to_path_buf(),
        reason: e.to_string(),
    })?;

    let Some(package) = manifest.get("package").and_then(Value::as_table) else {
        return Err(ParseError::NotAProject {
            path: project_file.to_path_buf(),
        });
    };
    let name = package
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ParseError::Malformed {
            path: project_file.to_path_buf(),
            reason: "package.name is missing".to_string(),
        })?;

    let mut project = RawProject::new(ProjectIdentity::new(project_file, name));
    let directory = project.identity.directory().to_path_buf();

    let mut tables: Vec<&Table> = DEPENDENCY_TABLES
        .iter()
        .filter_map(|key| manifest.get(*key).and_then(Value::as_table))
        .collect();
    if let Some(targets) = manifest.get("target").and_then(Value::as_table) {
        for target in targets.values().filter_map(Value::as_table) {
            tables.extend(
                DEPENDENCY_TABLES
                    .iter()
                    .filter_map(|key| target.get(*key).and_then(Value::as_table)),
            );
        }
    }

    for (name, dependency) in tables.into_iter().flat_map(|t| t.iter()) {
        if let Some(path) = dependency.get("path").and_then(Value::as_str) {
            let dependency_dir = paths::absolutize(&directory, &paths::from_portable(path));
            project.references.push(dependency_dir.join("Cargo.toml"));
        } else if dependency.get("workspace").and_then(Value::as_bool) == Some(true) {
            if let Some(manifest) = workspace.and_then(|w| w.get(name)) {
                project.references.push(manifest.clone());
            }
        }
    }

    for key in properties {
        let value = match package.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Integer(i)) => i.to_string(),
            Some(Value::Boolean(b)) => b.to_string(),
            Some(Value::Float(f)) => f.to_string(),
            _ => continue,
        };
        project.properties.insert(key.clone(), value);
    }

    Ok(project)
}
