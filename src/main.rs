//! affected CLI entry point

use std::path::PathBuf;
use std::process::ExitCode;

use affected_core::{AffectedOptions, FilterMode, NoChangesDetected};
use affected_discovery::ProjectFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use output::OutputFormat;

/// Exit code reported when no project has changed or is affected.
const NO_CHANGES_EXIT_CODE: u8 = 166;

#[derive(Parser)]
#[command(name = "affected", version)]
#[command(about = "Determines which projects are affected by a set of changes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the projects with changed files and the affected projects, without writing output
    Describe,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct GlobalArgs {
    /// Path to the root of the repository, where the .git directory is
    /// [defaults to the current directory, or the filter file's directory]
    #[arg(short = 'p', long, global = true)]
    repository_path: Option<PathBuf>,

    /// Filter file (.sln, .slnf or a list of project paths) used to discover projects
    #[arg(long, visible_alias = "solution-path", global = true)]
    filter_file_path: Option<PathBuf>,

    /// Write useful messages or just the desired output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hypothetically assume that given projects have changed instead of using git diff
    #[arg(long, num_args = 1.., global = true)]
    assume_changes: Vec<String>,

    /// A branch or commit to compare against --to
    #[arg(long, global = true)]
    from: Option<String>,

    /// A branch or commit to compare against --from
    #[arg(long, requires = "from", global = true)]
    to: Option<String>,

    /// A regular expression used to exclude discovered and affected projects
    #[arg(short = 'e', long, global = true)]
    exclude: Option<String>,

    /// Space-separated list of project properties to include in output
    #[arg(short = 'r', long, num_args = 1.., global = true)]
    properties: Vec<String>,

    /// Project formats to discover [default: all]
    #[arg(long, value_enum, num_args = 1.., global = true)]
    project_format: Vec<ProjectFormatArg>,

    /// narrow: build the graph from the filter file only;
    /// subset: build it from the whole repository and report filter file projects only
    #[arg(long, value_enum, default_value_t = FilterModeArg::Narrow, global = true)]
    filter_mode: FilterModeArg,

    /// Fail on unreadable project files instead of skipping them
    #[arg(long, global = true)]
    strict: bool,
}

impl GlobalArgs {
    pub(crate) fn verbose(&self) -> bool {
        self.verbose
    }

    pub(crate) fn to_options(&self, current_dir: &std::path::Path) -> AffectedOptions {
        AffectedOptions::new(current_dir, self.repository_path.clone(), self.filter_file_path.clone())
            .with_refs(self.from.clone(), self.to.clone())
            .with_exclusion(self.exclude.clone())
            .with_properties(self.properties.clone())
            .with_assumed_changes(self.assume_changes.clone())
            .with_filter_mode(self.filter_mode.into())
            .strict(self.strict)
    }

    pub(crate) fn project_formats(&self) -> Vec<ProjectFormat> {
        self.project_format.iter().map(|&f| f.into()).collect()
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct OutputArgs {
    /// Space-separated output file formats
    #[arg(short, long, value_enum, num_args = 1.., default_values_t = [OutputFormat::Traversal])]
    format: Vec<OutputFormat>,

    /// Only output to stdout. No output files will be created
    #[arg(long)]
    dry_run: bool,

    /// The directory where the output file(s) will be generated.
    /// Relative paths are based on --repository-path
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// The filename to create. Format file extensions will be appended
    #[arg(long, default_value = "affected")]
    output_name: String,
}

impl OutputArgs {
    pub(crate) fn formats(&self) -> &[OutputFormat] {
        &self.format
    }

    pub(crate) fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub(crate) fn output_dir(&self) -> Option<&std::path::Path> {
        self.output_dir.as_deref()
    }

    pub(crate) fn output_name(&self) -> &str {
        &self.output_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProjectFormatArg {
    Msbuild,
    Cargo,
}

impl From<ProjectFormatArg> for ProjectFormat {
    fn from(arg: ProjectFormatArg) -> Self {
        match arg {
            ProjectFormatArg::Msbuild => ProjectFormat::MsBuild,
            ProjectFormatArg::Cargo => ProjectFormat::Cargo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FilterModeArg {
    Narrow,
    Subset,
}

impl From<FilterModeArg> for FilterMode {
    fn from(arg: FilterModeArg) -> Self {
        match arg {
            FilterModeArg::Narrow => FilterMode::Narrow,
            FilterModeArg::Subset => FilterMode::Subset,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging. Stdout is reserved for the report.
    let log_level = if cli.global.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("affected={log_level}")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("affected v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Some(Commands::Describe) => commands::describe(&cli.global),
        None => commands::generate(&cli.global, &cli.output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is::<NoChangesDetected>() => {
            tracing::info!("{}", e);
            ExitCode::from(NO_CHANGES_EXIT_CODE)
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
