//! Filter files naming a subset of projects: `.sln`, `.slnf` or a plain list

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use affected_core::LocateError;
use affected_core::paths;
use regex::Regex;
use serde::Deserialize;

/// Solution folders are not projects.
const SOLUTION_FOLDER_TYPE: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

static SOLUTION_PROJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*Project\("\{([0-9A-Fa-f-]+)\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)""#)
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

#[derive(Debug, Deserialize)]
struct SolutionFilter {
    solution: SolutionFilterBody,
}

#[derive(Debug, Deserialize)]
struct SolutionFilterBody {
    path: String,
    #[serde(default)]
    projects: Vec<String>,
}

/// Absolute, normalized project paths listed by a filter file.
///
/// Paths are not checked for existence here.
pub fn read_filter_file(path: &Path) -> Result<Vec<PathBuf>, LocateError> {
    let content = std::fs::read_to_string(path).map_err(|source| LocateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let directory = path.parent().unwrap_or(Path::new("."));

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("sln") => Ok(parse_solution(&content, directory)),
        Some("slnf") => parse_solution_filter(path, &content, directory),
        _ => Ok(parse_list(&content, directory)),
    }
}

/// Projects of a Visual Studio solution, relative to its directory.
pub fn parse_solution(content: &str, directory: &Path) -> Vec<PathBuf> {
    SOLUTION_PROJECT_RE
        .captures_iter(content)
        .filter(|c| !c[1].eq_ignore_ascii_case(SOLUTION_FOLDER_TYPE))
        .map(|c| paths::absolutize(directory, &paths::from_portable(&c[3])))
        .collect()
}

/// Projects of a solution filter, relative to the filtered solution's directory.
pub fn parse_solution_filter(path: &Path, content: &str, directory: &Path) -> Result<Vec<PathBuf>, LocateError> {
    let filter: SolutionFilter = serde_json::from_str(content).map_err(|e| LocateError::InvalidFilterFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let solution = paths::absolutize(directory, &paths::from_portable(&filter.solution.path));
    let base = solution.parent().unwrap_or(directory);
    Ok(filter
        .solution
        .projects
        .iter()
        .map(|p| paths::absolutize(base, &paths::from_portable(p)))
        .collect())
}

/// One path per line; blank lines and `#` comments are skipped.
pub fn parse_list(content: &str, directory: &Path) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| paths::absolutize(directory, &paths::from_portable(line)))
        .collect()
}
