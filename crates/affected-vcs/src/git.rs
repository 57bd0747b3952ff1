//! Change sets computed with the `git` command line

use std::path::{Path, PathBuf};
use std::process::Command;

use affected_core::{ChangeSet, ChangeSetError, ChangeSetProvider};
use tracing::debug;

/// Lists changed files of the git repository containing `repository_path`.
#[derive(Debug, Clone)]
pub struct GitChangeSetProvider {
    repository_path: PathBuf,
}

impl GitChangeSetProvider {
    pub fn new(repository_path: impl Into<PathBuf>) -> Self {
        GitChangeSetProvider {
            repository_path: repository_path.into(),
        }
    }

    /// Absolute path of the working tree root.
    pub fn toplevel(&self) -> Result<PathBuf, ChangeSetError> {
        let output = self.git(&["rev-parse", "--show-toplevel"]).map_err(|e| match e {
            ChangeSetError::Command { .. } => ChangeSetError::NotARepository {
                path: self.repository_path.clone(),
            },
            other => other,
        })?;
        Ok(PathBuf::from(output.trim_end_matches(['\n', '\r'])))
    }

    fn git(&self, args: &[&str]) -> Result<String, ChangeSetError> {
        let command = format!("git {}", args.join(" "));
        debug!("Running {} in {}", command, self.repository_path.display());

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repository_path)
            .args(args)
            .output()
            .map_err(|source| ChangeSetError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ChangeSetError::Command {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ChangeSetProvider for GitChangeSetProvider {
    fn changed_files(&self, from: Option<&str>, to: Option<&str>) -> Result<ChangeSet, ChangeSetError> {
        let range = DiffRange::new(from, to)?;
        let toplevel = self.toplevel()?;

        let mut diff = vec!["diff", "--name-only", "--no-renames", "-z"];
        diff.extend(range.diff_args());
        let mut files = parse_name_list(&toplevel, &self.git(&diff)?);

        if range.includes_working_tree() {
            // `:/` widens the listing to the whole working tree, not just the cwd.
            let untracked = self.git(&[
                "ls-files",
                "--others",
                "--exclude-standard",
                "--full-name",
                "-z",
                "--",
                ":/",
            ])?;
            files.extend(parse_name_list(&toplevel, &untracked));
        }

        debug!("{} changed files for {:?}", files.len(), range);
        Ok(files)
    }
}

/// What to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffRange<'a> {
    /// Working tree against `HEAD`.
    WorkingTree,
    /// Working tree against a ref.
    Since(&'a str),
    /// Two refs.
    Between(&'a str, &'a str),
}

impl<'a> DiffRange<'a> {
    /// Refs starting with `-` are rejected so they cannot be read as git options.
    pub fn new(from: Option<&'a str>, to: Option<&'a str>) -> Result<Self, ChangeSetError> {
        if let Some(option) = [from, to].into_iter().flatten().find(|r| r.starts_with('-')) {
            return Err(ChangeSetError::InvalidRange {
                reason: format!("{option} is not a valid ref"),
            });
        }
        match (from.filter(|r| !r.is_empty()), to.filter(|r| !r.is_empty())) {
            (None, None) => Ok(DiffRange::WorkingTree),
            (Some(from), None) => Ok(DiffRange::Since(from)),
            (Some(from), Some(to)) => Ok(DiffRange::Between(from, to)),
            (None, Some(_)) => Err(ChangeSetError::InvalidRange {
                reason: "--from is required when using --to".to_string(),
            }),
        }
    }

    pub fn diff_args(&self) -> Vec<&'a str> {
        match *self {
            DiffRange::WorkingTree => vec!["HEAD"],
            DiffRange::Since(from) => vec![from],
            DiffRange::Between(from, to) => vec![from, to],
        }
    }

    pub fn includes_working_tree(&self) -> bool {
        !matches!(self, DiffRange::Between(..))
    }
}

/// Parse NUL-separated paths, rooted at `root`.
pub fn parse_name_list(root: &Path, output: &str) -> ChangeSet {
    ChangeSet::from_paths(root, output.split('\0').filter(|s| !s.is_empty()))
}
