//! Project discovery: locating project files and reading their references

pub mod format;
pub mod msbuild;
pub mod cargo;
pub mod filter_file;
pub mod locator;


pub use format::{ProjectFormat, ProjectFormats};
pub use msbuild::MsBuildProjectReader;
pub use cargo::CargoManifestReader;
pub use filter_file::read_filter_file;
pub use locator::RepositoryLocator;
