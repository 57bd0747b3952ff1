//! Assembles the frozen `ProjectGraph` from raw project records

use std::collections::HashMap;
use std::path::PathBuf;

use petgraph::stable_graph::StableDiGraph;
use tracing::{debug, warn};

use crate::graph::ProjectGraph;
use crate::model::{Diagnostic, ProjectIdentity, ProjectNode, RawProject};
use crate::paths;

/// The built graph plus everything that was dropped on the way.
#[derive(Debug)]
pub struct BuiltGraph {
    pub graph: ProjectGraph,
    pub diagnostics: Vec<Diagnostic>,
}

/// Single-writer builder. Nodes are added first, edges resolved in `build`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    projects: Vec<RawProject>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder::default()
    }

    pub fn add(&mut self, project: RawProject) -> &mut Self {
        self.projects.push(project);
        self
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn build(self) -> BuiltGraph {
        let mut diagnostics = Vec::new();
        let mut inner = StableDiGraph::new();
        let mut index = HashMap::new();

        let mut projects: Vec<RawProject> = self
            .projects
            .into_iter()
            .map(|mut raw| {
                raw.identity.path = paths::canonicalize_lossy(&raw.identity.path);
                raw
            })
            .collect();
        projects.sort_by(|a, b| a.identity.cmp(&b.identity));

        // Pass 1: one node per canonical path.
        let mut pending: Vec<(ProjectIdentity, Vec<PathBuf>)> = Vec::with_capacity(projects.len());
        for raw in projects {
            if index.contains_key(&raw.identity.path) {
                warn!("Duplicate project {}, keeping the first", raw.identity.path.display());
                diagnostics.push(Diagnostic::DuplicateProject {
                    path: raw.identity.path.clone(),
                });
                continue;
            }
            let node = ProjectNode {
                identity: raw.identity.clone(),
                properties: raw.properties,
            };
            let idx = inner.add_node(node);
            index.insert(raw.identity.path.clone(), idx);
            pending.push((raw.identity, raw.references));
        }

        // Pass 2: forward edges. Incoming adjacency is the reverse index.
        for (identity, references) in pending {
            let source = index[&identity.path];
            for reference in references {
                let target_path =
                    paths::canonicalize_lossy(&paths::absolutize(identity.directory(), &reference));
                match index.get(&target_path) {
                    Some(&target) => {
                        inner.update_edge(source, target, ());
                    }
                    None => {
                        warn!(
                            "{} references unknown project {}, dropping the edge",
                            identity.name,
                            target_path.display()
                        );
                        diagnostics.push(Diagnostic::UnresolvedReference {
                            project: identity.path.clone(),
                            reference: target_path,
                        });
                    }
                }
            }
        }

        let graph = ProjectGraph::freeze(inner);
        debug!(
            "Built project graph: {} projects, {} references",
            graph.project_count(),
            graph.reference_count()
        );

        BuiltGraph { graph, diagnostics }
    }
}

impl Extend<RawProject> for GraphBuilder {
    fn extend<T: IntoIterator<Item = RawProject>>(&mut self, iter: T) {
        self.projects.extend(iter);
    }
}

/// Build a frozen graph from raw project records.
pub fn build_graph(projects: impl IntoIterator<Item = RawProject>) -> BuiltGraph {
    let mut builder = GraphBuilder::new();
    builder.extend(projects);
    builder.build()
}
