//! MSBuild project reader (`.csproj`, `.fsproj`, `.vbproj`, ...)
//!
//! Reads the static shape of the project file only: `ProjectReference`
//! items and literal property elements. Nothing is evaluated, so references
//! built from MSBuild properties come back verbatim and end up unresolved.

use std::path::Path;
use std::sync::LazyLock;

use affected_core::paths;
use affected_core::{ParseError, ProjectFileReader, ProjectIdentity, RawProject};
use regex::Regex;
use tracing::debug;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap_or_else(|_| panic!("Invalid Regex")));
static PROJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Project[\s>/]").unwrap_or_else(|_| panic!("Invalid Regex")));
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<ProjectReference\b[^>]*?\bInclude\s*=\s*["']([^"']+)["']"#)
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

#[derive(Debug, Clone, Copy, Default)]
pub struct MsBuildProjectReader;

impl ProjectFileReader for MsBuildProjectReader {
    fn read(&self, project_file: &Path, properties: &[String]) -> Result<RawProject, ParseError> {
        let content = std::fs::read_to_string(project_file).map_err(|source| ParseError::Io {
            path: project_file.to_path_buf(),
            source,
        })?;
        parse_project(project_file, &content, properties)
    }
}

/// Parse MSBuild project text belonging to `project_file`.
pub fn parse_project(project_file: &Path, content: &str, properties: &[String]) -> Result<RawProject, ParseError> {
    let content = COMMENT_RE.replace_all(content, "");
    if !PROJECT_RE.is_match(&content) {
        return Err(ParseError::Malformed {
            path: project_file.to_path_buf(),
            reason: "missing <Project> element".to_string(),
        });
    }

    let mut project = RawProject::new(ProjectIdentity::from_path(project_file));
    let directory = project.identity.directory().to_path_buf();

    for capture in REFERENCE_RE.captures_iter(&content) {
        let include = capture[1].trim();
        if include.is_empty() {
            continue;
        }
        project
            .references
            .push(paths::absolutize(&directory, &paths::from_portable(include)));
    }

    for name in properties {
        match property_value(&content, name) {
            Some(value) => {
                project.properties.insert(name.clone(), value);
            }
            None => debug!("{} has no property {}", project_file.display(), name),
        }
    }

    Ok(project)
}

/// First literal `<Name>value</Name>` element, trimmed.
fn property_value(content: &str, name: &str) -> Option<String> {
    let pattern = format!(r"<{0}(?:\s[^>]*)?>([^<]*)</{0}\s*>", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(content).map(|c| c[1].trim().to_string())
}
