//! Supported project-definition formats and reader dispatch

use std::path::Path;
use std::str::FromStr;

use affected_core::{ParseError, ProjectFileReader, RawProject};

use crate::cargo::CargoManifestReader;
use crate::msbuild::MsBuildProjectReader;

/// A family of project files the locator and reader understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectFormat {
    /// `*.csproj`, `*.fsproj`, `*.vbproj`, `*.proj`, `*.sqlproj`
    MsBuild,
    /// `Cargo.toml` manifests with a `[package]` table
    Cargo,
}

const MSBUILD_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj", "proj", "sqlproj"];

impl ProjectFormat {
    pub const ALL: [ProjectFormat; 2] = [ProjectFormat::MsBuild, ProjectFormat::Cargo];

    /// File-name globs matching this format.
    pub fn globs(&self) -> &'static [&'static str] {
        match self {
            ProjectFormat::MsBuild => &["*.csproj", "*.fsproj", "*.vbproj", "*.proj", "*.sqlproj"],
            ProjectFormat::Cargo => &["Cargo.toml"],
        }
    }

    /// Detect the format from a file name.
    pub fn detect(path: &Path) -> Option<Self> {
        if path.file_name().is_some_and(|n| n == "Cargo.toml") {
            return Some(ProjectFormat::Cargo);
        }
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        MSBUILD_EXTENSIONS
            .contains(&ext.as_str())
            .then_some(ProjectFormat::MsBuild)
    }
}

impl FromStr for ProjectFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "msbuild" | "dotnet" => Ok(ProjectFormat::MsBuild),
            "cargo" | "rust" => Ok(ProjectFormat::Cargo),
            other => Err(format!("unknown project format: {other}")),
        }
    }
}

/// The formats enabled for one invocation, and their readers.
#[derive(Debug, Clone)]
pub struct ProjectFormats {
    formats: Vec<ProjectFormat>,
    cargo: CargoManifestReader,
}

impl ProjectFormats {
    /// Empty input enables every format.
    pub fn new(formats: impl IntoIterator<Item = ProjectFormat>) -> Self {
        let mut selected: Vec<ProjectFormat> = Vec::new();
        for format in formats {
            if !selected.contains(&format) {
                selected.push(format);
            }
        }
        if selected.is_empty() {
            selected.extend(ProjectFormat::ALL);
        }
        ProjectFormats {
            formats: selected,
            cargo: CargoManifestReader::new(),
        }
    }

    pub fn all() -> Self {
        Self::new(ProjectFormat::ALL)
    }

    pub fn iter(&self) -> impl Iterator<Item = ProjectFormat> + '_ {
        self.formats.iter().copied()
    }

    /// Format of `path` if it is one of the enabled ones.
    pub fn format_of(&self, path: &Path) -> Option<ProjectFormat> {
        ProjectFormat::detect(path).filter(|f| self.formats.contains(f))
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.format_of(path).is_some()
    }
}

impl PartialEq for ProjectFormats {
    fn eq(&self, other: &Self) -> bool {
        self.formats == other.formats
    }
}

impl Eq for ProjectFormats {}

impl Default for ProjectFormats {
    fn default() -> Self {
        Self::all()
    }
}

impl ProjectFileReader for ProjectFormats {
    fn read(&self, project_file: &Path, properties: &[String]) -> Result<RawProject, ParseError> {
        match self.format_of(project_file) {
            Some(ProjectFormat::MsBuild) => MsBuildProjectReader.read(project_file, properties),
            Some(ProjectFormat::Cargo) => self.cargo.read(project_file, properties),
            None => Err(ParseError::Unsupported {
                path: project_file.to_path_buf(),
            }),
        }
    }
}
