//! Output formatters and the human readable report

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use affected_core::{AffectedSummary, ProjectNode};
use clap::ValueEnum;
use serde::Serialize;

/// One project as written to output files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "FilePath")]
    pub file_path: String,
    /// Requested properties, empty when the project does not define them.
    #[serde(flatten)]
    pub properties: BTreeMap<String, String>,
}

impl ProjectInfo {
    pub fn new(node: &ProjectNode, requested: &[String]) -> Self {
        let properties = requested
            .iter()
            .map(|key| {
                let value = node.properties.get(key).cloned().unwrap_or_default();
                (key.clone(), value)
            })
            .collect();

        ProjectInfo {
            name: node.name().to_string(),
            file_path: node.path().display().to_string(),
            properties,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// MSBuild Traversal SDK project (.proj)
    Traversal,
    /// One project path per line (.txt)
    Text,
    /// Array of project objects (.json)
    Json,
}

impl OutputFormat {
    pub fn formatter(self) -> Box<dyn OutputFormatter> {
        match self {
            OutputFormat::Traversal => Box::new(TraversalFormatter),
            OutputFormat::Text => Box::new(TextFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}

/// Renders the list of changed and affected projects.
pub trait OutputFormatter {
    /// File extension, without the dot.
    fn extension(&self) -> &'static str;

    fn format(&self, projects: &[ProjectInfo]) -> anyhow::Result<String>;
}

pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn format(&self, projects: &[ProjectInfo]) -> anyhow::Result<String> {
        let lines: Vec<&str> = projects.iter().map(|p| p.file_path.as_str()).collect();
        Ok(lines.join("\n"))
    }
}

pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn format(&self, projects: &[ProjectInfo]) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(projects)?)
    }
}

const TRAVERSAL_SDK: &str = "Microsoft.Build.Traversal/3.0.3";

pub struct TraversalFormatter;

impl OutputFormatter for TraversalFormatter {
    fn extension(&self) -> &'static str {
        "proj"
    }

    fn format(&self, projects: &[ProjectInfo]) -> anyhow::Result<String> {
        let mut out = String::new();
        writeln!(out, "<Project Sdk=\"{TRAVERSAL_SDK}\">")?;
        writeln!(out, "  <ItemGroup>")?;
        for project in projects {
            writeln!(
                out,
                "    <ProjectReference Include=\"{}\" />",
                escape_xml(&project.file_path)
            )?;
        }
        writeln!(out, "  </ItemGroup>")?;
        write!(out, "</Project>")?;
        Ok(out)
    }
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Summary shown by `describe` and by `--verbose`.
pub fn info_view(summary: &AffectedSummary) -> Result<String, fmt::Error> {
    let mut out = String::new();

    let changed = summary.projects_with_changed_files();
    if !summary.changed_files().is_empty() {
        writeln!(
            out,
            "{} files have changed inside {} projects",
            summary.changed_files().len(),
            changed.len()
        )?;
    } else {
        writeln!(out, "{} projects are assumed to have changed", changed.len())?;
    }
    push_table(&mut out, changed)?;

    let affected = summary.affected_projects();
    writeln!(out, "{} projects are affected by these changes", affected.len())?;
    push_table(&mut out, affected)?;

    for diagnostic in summary.diagnostics() {
        writeln!(out, "warning: {diagnostic}")?;
    }
    Ok(out)
}

fn push_table(out: &mut String, projects: &[ProjectNode]) -> fmt::Result {
    let width = projects.iter().map(|p| p.name().len()).max().unwrap_or(0);
    for project in projects {
        writeln!(
            out,
            "    {:<width$}  {}",
            project.name(),
            project.path().display()
        )?;
    }
    Ok(())
}
