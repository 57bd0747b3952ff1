//! Project graph store using petgraph::StableDiGraph
//!
//! An edge `A -> B` means "A references B". The reverse index (`referenced_by`)
//! is petgraph's incoming adjacency, so both directions always agree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::model::{ProjectIdentity, ProjectNode};

/// The frozen project reference graph.
///
/// Only `GraphBuilder` creates one; there is no mutation API afterwards.
pub struct ProjectGraph {
    inner: StableDiGraph<ProjectNode, ()>,
    by_path: HashMap<PathBuf, NodeIndex>,
    by_directory: HashMap<PathBuf, Vec<NodeIndex>>,
}

impl std::fmt::Debug for ProjectGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectGraph")
            .field("project_count", &self.inner.node_count())
            .field("reference_count", &self.inner.edge_count())
            .finish()
    }
}

impl ProjectGraph {
    /// Freeze a fully built petgraph and derive the lookup indices.
    pub(crate) fn freeze(inner: StableDiGraph<ProjectNode, ()>) -> Self {
        let mut by_path = HashMap::new();
        let mut by_directory: HashMap<PathBuf, Vec<NodeIndex>> = HashMap::new();

        for idx in inner.node_indices() {
            let identity = &inner[idx].identity;
            by_path.insert(identity.path.clone(), idx);
            by_directory
                .entry(identity.directory().to_path_buf())
                .or_default()
                .push(idx);
        }

        ProjectGraph {
            inner,
            by_path,
            by_directory,
        }
    }

    pub fn empty() -> Self {
        Self::freeze(StableDiGraph::new())
    }

    /// Total number of projects.
    pub fn project_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of reference edges.
    pub fn reference_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Iterate over all projects in build order (ascending path).
    pub fn projects(&self) -> impl Iterator<Item = &ProjectNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Look a project up by identity.
    pub fn project(&self, identity: &ProjectIdentity) -> Option<&ProjectNode> {
        self.find_by_path(&identity.path)
    }

    /// Look a project up by canonical project file path.
    pub fn find_by_path(&self, path: &Path) -> Option<&ProjectNode> {
        self.by_path.get(path).map(|&idx| &self.inner[idx])
    }

    /// All projects with the given display name.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ProjectNode> + 'a {
        self.projects().filter(move |p| p.name() == name)
    }

    pub fn contains(&self, identity: &ProjectIdentity) -> bool {
        self.by_path.contains_key(&identity.path)
    }

    /// Projects the given project directly references, sorted by path.
    pub fn references(&self, identity: &ProjectIdentity) -> Vec<&ProjectIdentity> {
        self.neighbors(identity, Direction::Outgoing)
    }

    /// Projects that directly reference the given project, sorted by path.
    pub fn referenced_by(&self, identity: &ProjectIdentity) -> Vec<&ProjectIdentity> {
        self.neighbors(identity, Direction::Incoming)
    }

    fn neighbors(&self, identity: &ProjectIdentity, direction: Direction) -> Vec<&ProjectIdentity> {
        let Some(&idx) = self.by_path.get(&identity.path) else {
            return Vec::new();
        };
        let mut out: Vec<_> = self
            .inner
            .neighbors_directed(idx, direction)
            .map(|n| &self.inner[n].identity)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Projects owning `file`: those whose directory is the deepest ancestor of it.
    ///
    /// Several projects are returned only when they share that directory.
    pub fn owners_of(&self, file: &Path) -> impl Iterator<Item = &ProjectNode> {
        file.ancestors()
            .find_map(|dir| self.by_directory.get(dir))
            .into_iter()
            .flatten()
            .map(move |&idx| &self.inner[idx])
    }

    pub(crate) fn index_of(&self, identity: &ProjectIdentity) -> Option<NodeIndex> {
        self.by_path.get(&identity.path).copied()
    }

    pub(crate) fn node_at(&self, idx: NodeIndex) -> &ProjectNode {
        &self.inner[idx]
    }

    /// Direct dependents of a node, following edges backwards.
    pub(crate) fn dependents_of(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.inner.neighbors_directed(idx, Direction::Incoming)
    }
}

impl Default for ProjectGraph {
    fn default() -> Self {
        Self::empty()
    }
}
