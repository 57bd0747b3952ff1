//! Version-control change detection for affected

pub mod git;


pub use git::{DiffRange, GitChangeSetProvider};
