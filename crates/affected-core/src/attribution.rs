//! Maps changed files onto the projects that own them

use std::collections::BTreeSet;

use tracing::debug;

use crate::graph::ProjectGraph;
use crate::model::{ChangeSet, ProjectIdentity};

/// Projects owning at least one changed file.
///
/// A file belongs to the most deeply nested project directory containing it.
/// Files outside every project directory are ignored.
pub fn attribute(graph: &ProjectGraph, changes: &ChangeSet) -> BTreeSet<ProjectIdentity> {
    let mut owners = BTreeSet::new();

    for file in changes.iter() {
        let mut matched = false;
        for node in graph.owners_of(file) {
            matched = true;
            owners.insert(node.identity.clone());
        }
        if !matched {
            debug!("{} is not owned by any project", file.display());
        }
    }

    owners
}
