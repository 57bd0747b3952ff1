//! Runs the whole pipeline: discover, read, build, seed, resolve, filter

use std::collections::BTreeSet;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::attribution::attribute;
use crate::builder::build_graph;
use crate::collaborators::{ChangeSetProvider, ProjectFileReader, ProjectLocator};
use crate::error::{AffectedError, ParseError};
use crate::filter::ProjectFilter;
use crate::graph::ProjectGraph;
use crate::model::{ChangeSet, Diagnostic, ProjectIdentity, ProjectNode, RawProject};
use crate::options::{AffectedOptions, FilterMode};
use crate::paths;
use crate::resolver::resolve;
use crate::summary::AffectedSummary;

pub struct AffectedExecutor<'a> {
    options: AffectedOptions,
    locator: &'a dyn ProjectLocator,
    reader: &'a dyn ProjectFileReader,
    changes: &'a dyn ChangeSetProvider,
}

impl<'a> AffectedExecutor<'a> {
    pub fn new(
        options: AffectedOptions,
        locator: &'a dyn ProjectLocator,
        reader: &'a dyn ProjectFileReader,
        changes: &'a dyn ChangeSetProvider,
    ) -> Self {
        AffectedExecutor {
            options,
            locator,
            reader,
            changes,
        }
    }

    pub fn options(&self) -> &AffectedOptions {
        &self.options
    }

    pub fn execute(&self) -> Result<AffectedSummary, AffectedError> {
        let (universe, inclusion) = self.discover()?;
        let filter = self.project_filter(inclusion)?;

        let (raw, mut diagnostics) = self.read_projects(universe)?;
        let built = build_graph(raw);
        diagnostics.extend(built.diagnostics);
        let graph = built.graph;
        if graph.is_empty() {
            warn!("None of the discovered project files could be read");
            return Err(self.discovery_error());
        }
        info!(
            "Project graph: {} projects, {} references",
            graph.project_count(),
            graph.reference_count()
        );

        let (changed_files, seeds) = self.seeds(&graph, &mut diagnostics)?;
        let affected = resolve(&graph, &seeds);
        let (changed, affected) = filter.apply(seeds, affected);

        let summary = AffectedSummary::new(nodes(&graph, &changed), nodes(&graph, &affected))
            .with_changed_files(changed_files)
            .with_diagnostics(diagnostics);

        info!(
            "{} projects with changed files, {} affected projects",
            summary.projects_with_changed_files().len(),
            summary.affected_projects().len()
        );
        Ok(summary)
    }

    /// The project universe, plus the inclusion subset in `Subset` mode.
    fn discover(&self) -> Result<(Vec<PathBuf>, Option<Vec<PathBuf>>), AffectedError> {
        let root = &self.options.repository_path;
        let filter_file = self.options.filter_file_path.as_deref();

        let (universe, inclusion) = match (self.options.filter_mode, filter_file) {
            (FilterMode::Subset, Some(filter)) => {
                let universe = self.locator.discover(root, None)?;
                let subset = self.locator.discover(root, Some(filter))?;
                (universe, Some(subset))
            }
            (_, filter) => (self.locator.discover(root, filter)?, None),
        };

        if universe.is_empty() {
            return Err(self.discovery_error());
        }
        info!("Discovered {} project files", universe.len());
        Ok((universe, inclusion))
    }

    fn discovery_error(&self) -> AffectedError {
        AffectedError::Discovery {
            root: self.options.repository_path.clone(),
            filter: self.options.filter_file_path.clone(),
        }
    }

    fn project_filter(&self, inclusion: Option<Vec<PathBuf>>) -> Result<ProjectFilter, AffectedError> {
        let mut filter = ProjectFilter::new();
        if let Some(pattern) = &self.options.exclusion_regex {
            filter = filter.with_exclusion_pattern(pattern)?;
        }
        if let Some(paths) = inclusion {
            filter = filter.with_inclusion(paths);
        }
        Ok(filter)
    }

    /// Reads project files in parallel, then hands back a path-sorted snapshot.
    fn read_projects(&self, universe: Vec<PathBuf>) -> Result<(Vec<RawProject>, Vec<Diagnostic>), AffectedError> {
        let reader = self.reader;
        let properties = self.options.additional_properties.as_slice();

        let mut results: Vec<(PathBuf, Result<RawProject, ParseError>)> = universe
            .into_par_iter()
            .map(|path| {
                let result = reader.read(&path, properties);
                (path, result)
            })
            .collect();
        results.sort_by(|a, b| a.0.cmp(&b.0));

        let mut raw = Vec::with_capacity(results.len());
        let mut diagnostics = Vec::new();
        for (path, result) in results {
            match result {
                Ok(project) => raw.push(project),
                Err(ParseError::NotAProject { .. }) => {
                    debug!("{} does not define a project, skipping", path.display());
                }
                Err(e) if self.options.strict => return Err(e.into()),
                Err(e) => {
                    warn!("Skipping project: {}", e);
                    diagnostics.push(Diagnostic::SkippedProject {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok((raw, diagnostics))
    }

    /// Directly changed projects, from assumed changes or from version control.
    fn seeds(
        &self,
        graph: &ProjectGraph,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(ChangeSet, BTreeSet<ProjectIdentity>), AffectedError> {
        if !self.options.assume_changes.is_empty() {
            return Ok((ChangeSet::new(), self.assumed_seeds(graph, diagnostics)));
        }

        let files = self
            .changes
            .changed_files(self.options.from_ref.as_deref(), self.options.to_ref.as_deref())?;
        info!("Found {} changed files", files.len());
        let seeds = attribute(graph, &files);
        Ok((files, seeds))
    }

    fn assumed_seeds(&self, graph: &ProjectGraph, diagnostics: &mut Vec<Diagnostic>) -> BTreeSet<ProjectIdentity> {
        let mut seeds = BTreeSet::new();
        for assumed in &self.options.assume_changes {
            let as_path = paths::canonicalize_lossy(&paths::absolutize(
                &self.options.repository_path,
                &paths::from_portable(assumed),
            ));
            let mut matched: Vec<&ProjectIdentity> =
                graph.find_by_name(assumed).map(|p| &p.identity).collect();
            matched.extend(graph.find_by_path(&as_path).map(|p| &p.identity));
            if matched.is_empty() {
                warn!("Assumed change {} does not match any project", assumed);
                diagnostics.push(Diagnostic::UnknownAssumedProject {
                    name: assumed.clone(),
                });
            }
            seeds.extend(matched.into_iter().cloned());
        }
        seeds
    }
}

fn nodes(graph: &ProjectGraph, identities: &BTreeSet<ProjectIdentity>) -> Vec<ProjectNode> {
    identities
        .iter()
        .filter_map(|identity| graph.project(identity).cloned())
        .collect()
}
