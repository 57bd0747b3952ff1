//! CLI command implementations

use std::fs;
use std::path::Path;

use affected_core::{AffectedExecutor, AffectedOptions, AffectedSummary, paths};
use affected_discovery::{ProjectFormats, RepositoryLocator};
use affected_vcs::GitChangeSetProvider;
use anyhow::Context;

use crate::output::{self, ProjectInfo};
use crate::{GlobalArgs, OutputArgs};

/// Compute the affected projects and write them in every requested format.
pub fn generate(global: &GlobalArgs, output: &OutputArgs) -> anyhow::Result<()> {
    let (options, summary) = execute(global)?;
    summary.ensure_changes()?;

    if global.verbose() {
        print!("{}", output::info_view(&summary)?);
    }

    let projects: Vec<ProjectInfo> = summary
        .all_projects()
        .map(|node| ProjectInfo::new(node, &options.additional_properties))
        .collect();

    let output_dir = match output.output_dir() {
        Some(dir) => paths::absolutize(&options.repository_path, dir),
        None => options.repository_path.clone(),
    };

    for format in output.formats() {
        let formatter = format.formatter();
        let content = formatter.format(&projects)?;

        if output.dry_run() {
            println!("{content}");
            continue;
        }

        let path = output_dir.join(format!("{}.{}", output.output_name(), formatter.extension()));
        write_output(&path, &content)?;
        tracing::info!("Generated {}", path.display());
    }

    Ok(())
}

/// Print what changed and what is affected, without writing any file.
pub fn describe(global: &GlobalArgs) -> anyhow::Result<()> {
    let (_, summary) = execute(global)?;
    summary.ensure_changes()?;

    print!("{}", output::info_view(&summary)?);
    Ok(())
}

fn execute(global: &GlobalArgs) -> anyhow::Result<(AffectedOptions, AffectedSummary)> {
    let current_dir = std::env::current_dir().context("Cannot determine the current directory")?;
    let options = global.to_options(&current_dir);
    tracing::debug!("Repository path: {}", options.repository_path.display());
    if let Some(filter) = &options.filter_file_path {
        tracing::debug!("Filter file: {} ({:?})", filter.display(), options.filter_mode);
    }

    let formats = ProjectFormats::new(global.project_formats());
    let locator = RepositoryLocator::new(formats.clone())?;
    let changes = GitChangeSetProvider::new(&options.repository_path);

    let summary = AffectedExecutor::new(options.clone(), &locator, &formats, &changes).execute()?;
    Ok((options, summary))
}

fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create output directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Cannot write {}", path.display()))
}
