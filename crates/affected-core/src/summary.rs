//! The terminal result of one invocation

use serde::Serialize;

use crate::error::NoChangesDetected;
use crate::model::{ChangeSet, Diagnostic, ProjectNode};

/// Projects owning changed files, projects depending on them, and what was
/// dropped along the way. Read-only once built.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AffectedSummary {
    changed_files: ChangeSet,
    projects_with_changed_files: Vec<ProjectNode>,
    affected_projects: Vec<ProjectNode>,
    diagnostics: Vec<Diagnostic>,
}

impl AffectedSummary {
    /// Both lists are sorted by canonical path.
    pub fn new(mut changed: Vec<ProjectNode>, mut affected: Vec<ProjectNode>) -> Self {
        changed.sort_by(|a, b| a.identity.cmp(&b.identity));
        affected.sort_by(|a, b| a.identity.cmp(&b.identity));
        AffectedSummary {
            changed_files: ChangeSet::new(),
            projects_with_changed_files: changed,
            affected_projects: affected,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_changed_files(mut self, files: ChangeSet) -> Self {
        self.changed_files = files;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn changed_files(&self) -> &ChangeSet {
        &self.changed_files
    }

    pub fn projects_with_changed_files(&self) -> &[ProjectNode] {
        &self.projects_with_changed_files
    }

    pub fn affected_projects(&self) -> &[ProjectNode] {
        &self.affected_projects
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Changed projects first, then affected ones.
    pub fn all_projects(&self) -> impl Iterator<Item = &ProjectNode> {
        self.projects_with_changed_files
            .iter()
            .chain(self.affected_projects.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.projects_with_changed_files.is_empty() && self.affected_projects.is_empty()
    }

    /// Short-circuit signal for callers that only act on changes.
    pub fn ensure_changes(&self) -> Result<&Self, NoChangesDetected> {
        if self.is_empty() {
            Err(NoChangesDetected)
        } else {
            Ok(self)
        }
    }
}
