//! Transitive dependent closure over the reverse reference edges

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::debug;

use crate::graph::ProjectGraph;
use crate::model::ProjectIdentity;

/// Every project that transitively references a seed, excluding the seeds.
///
/// Breadth-first over `referenced_by` with a visited set, so cycles and
/// diamonds are walked once. Seeds unknown to the graph are ignored.
pub fn resolve(graph: &ProjectGraph, seeds: &BTreeSet<ProjectIdentity>) -> BTreeSet<ProjectIdentity> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    for seed in seeds {
        match graph.index_of(seed) {
            Some(idx) => {
                if visited.insert(idx) {
                    queue.push_back(idx);
                }
            }
            None => debug!("Seed {} is not in the graph", seed.path.display()),
        }
    }

    let mut affected = BTreeSet::new();
    while let Some(current) = queue.pop_front() {
        for dependent in graph.dependents_of(current) {
            if !visited.insert(dependent) {
                continue;
            }
            queue.push_back(dependent);
            affected.insert(graph.node_at(dependent).identity.clone());
        }
    }

    debug!(
        "Resolved {} affected projects from {} seeds ({} visited)",
        affected.len(),
        seeds.len(),
        visited.len()
    );
    affected
}
