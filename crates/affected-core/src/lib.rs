//! Affected Core: project graph, change attribution and affected-set resolution

pub mod model;
pub mod paths;
pub mod graph;
pub mod builder;
pub mod attribution;
pub mod resolver;
pub mod filter;
pub mod summary;
pub mod options;
pub mod error;
pub mod collaborators;
pub mod executor;


#[cfg(test)]
pub mod test_utils;

pub use model::{ProjectIdentity, ProjectNode, RawProject, Properties, ChangeSet, Diagnostic};
pub use graph::ProjectGraph;
pub use builder::{GraphBuilder, BuiltGraph, build_graph};
pub use attribution::attribute;
pub use resolver::resolve;
pub use filter::ProjectFilter;
pub use summary::AffectedSummary;
pub use options::{AffectedOptions, FilterMode};
pub use error::{AffectedError, ParseError, LocateError, ChangeSetError, NoChangesDetected};
pub use collaborators::{ProjectLocator, ProjectFileReader, ChangeSetProvider};
pub use executor::AffectedExecutor;
