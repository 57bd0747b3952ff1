//! Inclusion/exclusion filtering of the resolved project sets

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use regex::Regex;
use tracing::debug;

use crate::error::AffectedError;
use crate::model::ProjectIdentity;

/// Narrows the changed and affected sets before reporting.
///
/// Inclusion runs first, exclusion last, so an explicit exclude always wins.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    exclusion: Option<Regex>,
    inclusion: Option<HashSet<PathBuf>>,
}

impl ProjectFilter {
    pub fn new() -> Self {
        ProjectFilter::default()
    }

    pub fn with_exclusion(mut self, pattern: Regex) -> Self {
        self.exclusion = Some(pattern);
        self
    }

    /// Compile and set the exclusion pattern.
    pub fn with_exclusion_pattern(self, pattern: &str) -> Result<Self, AffectedError> {
        let regex = Regex::new(pattern).map_err(|source| AffectedError::InvalidExclusion {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.with_exclusion(regex))
    }

    /// Only projects whose canonical path is in `paths` are reported.
    pub fn with_inclusion(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.inclusion = Some(paths.into_iter().collect());
        self
    }

    pub fn is_included(&self, identity: &ProjectIdentity) -> bool {
        self.inclusion
            .as_ref()
            .is_none_or(|paths| paths.contains(&identity.path))
    }

    /// Matches against the canonical path or the display name.
    pub fn is_excluded(&self, identity: &ProjectIdentity) -> bool {
        self.exclusion.as_ref().is_some_and(|re| {
            re.is_match(&identity.path.to_string_lossy()) || re.is_match(&identity.name)
        })
    }

    pub fn allows(&self, identity: &ProjectIdentity) -> bool {
        self.is_included(identity) && !self.is_excluded(identity)
    }

    pub fn apply(
        &self,
        changed: BTreeSet<ProjectIdentity>,
        affected: BTreeSet<ProjectIdentity>,
    ) -> (BTreeSet<ProjectIdentity>, BTreeSet<ProjectIdentity>) {
        (self.narrow(changed), self.narrow(affected))
    }

    fn narrow(&self, projects: BTreeSet<ProjectIdentity>) -> BTreeSet<ProjectIdentity> {
        let included: BTreeSet<_> = projects
            .into_iter()
            .filter(|p| {
                let keep = self.is_included(p);
                if !keep {
                    debug!("{} is outside the filter subset", p.name);
                }
                keep
            })
            .collect();

        included
            .into_iter()
            .filter(|p| {
                let drop = self.is_excluded(p);
                if drop {
                    debug!("{} excluded by pattern", p.name);
                }
                !drop
            })
            .collect()
    }
}
