//! Integration tests for affected
//!
//! These tests run the whole pipeline against repositories on disk, both
//! through the library crates and through the `affected` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use affected_core::{AffectedExecutor, AffectedOptions, ChangeSet, FilterMode};
use affected_discovery::{ProjectFormats, RepositoryLocator};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn csproj(references: &[&str]) -> String {
    let items: String = references
        .iter()
        .map(|r| format!("    <ProjectReference Include=\"{r}\" />\n"))
        .collect();
    format!(
        "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <TargetFramework>net8.0</TargetFramework>\n  </PropertyGroup>\n  <ItemGroup>\n{items}  </ItemGroup>\n</Project>\n"
    )
}

/// Lib <- App <- App.Tests, plus an unrelated Tool and a Rust crate.
fn fixture() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    write(&root, "src/Lib/Lib.csproj", &csproj(&[]));
    write(&root, "src/Lib/Class1.cs", "public class Class1 {}");
    write(&root, "src/App/App.csproj", &csproj(&["..\\Lib\\Lib.csproj"]));
    write(
        &root,
        "tests/App.Tests/App.Tests.csproj",
        &csproj(&["../../src/App/App.csproj"]),
    );
    write(&root, "tools/Tool/Tool.csproj", &csproj(&[]));
    write(
        &root,
        "crates/helper/Cargo.toml",
        "[package]\nname = \"helper\"\nversion = \"0.2.0\"\n",
    );
    (dir, root)
}

fn affected(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_affected"))
        .arg("--repository-path")
        .arg(root)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute affected")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn display(path: PathBuf) -> String {
    path.display().to_string()
}

// ── Library pipeline ────────────────────────────────────

#[test]
fn test_pipeline_from_changed_files() {
    let (_dir, root) = fixture();
    let formats = ProjectFormats::all();
    let locator = RepositoryLocator::new(formats.clone()).unwrap();
    let changes = ChangeSet::from_paths(&root, ["src/Lib/Class1.cs", "README.md"]);
    let options = AffectedOptions::new(&root, None, None);

    let summary = AffectedExecutor::new(options, &locator, &formats, &changes)
        .execute()
        .unwrap();

    let changed: Vec<_> = summary.projects_with_changed_files().iter().map(|p| p.name()).collect();
    let affected: Vec<_> = summary.affected_projects().iter().map(|p| p.name()).collect();
    assert_eq!(changed, vec!["Lib"]);
    assert_eq!(affected, vec!["App", "App.Tests"]);
    assert!(summary.diagnostics().is_empty());
}

#[test]
fn test_pipeline_subset_filter_mode() {
    let (_dir, root) = fixture();
    let filter = write(&root, "subset.txt", "tests/App.Tests/App.Tests.csproj\n");
    let formats = ProjectFormats::all();
    let locator = RepositoryLocator::new(formats.clone()).unwrap();
    let changes = ChangeSet::from_paths(&root, ["src/Lib/Class1.cs"]);

    let narrow = AffectedOptions::new(&root, None, Some(filter.clone()));
    let summary = AffectedExecutor::new(narrow, &locator, &formats, &changes)
        .execute()
        .unwrap();
    assert!(summary.is_empty());

    let subset = AffectedOptions::new(&root, None, Some(filter)).with_filter_mode(FilterMode::Subset);
    let summary = AffectedExecutor::new(subset, &locator, &formats, &changes)
        .execute()
        .unwrap();
    let affected: Vec<_> = summary.affected_projects().iter().map(|p| p.name()).collect();
    assert!(summary.projects_with_changed_files().is_empty());
    assert_eq!(affected, vec!["App.Tests"]);
}

// ── CLI ─────────────────────────────────────────────────

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_affected"))
        .arg("--help")
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Determines which projects are affected by a set of changes"));
    assert!(stdout.contains("describe"));
}

#[test]
fn test_cli_dry_run_text() {
    let (_dir, root) = fixture();

    let output = affected(&root, &["--assume-changes", "Lib", "--dry-run", "--format", "text"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout_lines(&output),
        vec![
            display(root.join("src/Lib/Lib.csproj")),
            display(root.join("src/App/App.csproj")),
            display(root.join("tests/App.Tests/App.Tests.csproj")),
        ]
    );
    assert!(!root.join("affected.txt").exists());
}

#[test]
fn test_cli_writes_traversal_project() {
    let (_dir, root) = fixture();

    let output = affected(
        &root,
        &["--assume-changes", "App", "--output-dir", "out", "--output-name", "build"],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let proj = fs::read_to_string(root.join("out/build.proj")).unwrap();
    assert!(proj.starts_with("<Project Sdk=\"Microsoft.Build.Traversal/3.0.3\">"));
    assert!(proj.contains(&format!(
        "<ProjectReference Include=\"{}\" />",
        display(root.join("src/App/App.csproj"))
    )));
    assert!(proj.contains("App.Tests.csproj"));
    assert!(!proj.contains("Lib.csproj"));
}

#[test]
fn test_cli_json_with_properties() {
    let (_dir, root) = fixture();

    let output = affected(
        &root,
        &[
            "--assume-changes",
            "helper",
            "--format",
            "json",
            "--properties",
            "version",
            "--dry-run",
        ],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{
            "Name": "helper",
            "FilePath": display(root.join("crates/helper/Cargo.toml")),
            "version": "0.2.0"
        }])
    );
}

#[test]
fn test_cli_exclusion() {
    let (_dir, root) = fixture();

    let output = affected(
        &root,
        &["--assume-changes", "Lib", "--exclude", "\\.Tests", "--dry-run", "-f", "text"],
    );

    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| !l.contains("Tests")));
}

#[test]
fn test_cli_no_changes_exit_code() {
    let (_dir, root) = fixture();

    let output = affected(&root, &["--assume-changes", "Missing", "--dry-run"]);

    assert_eq!(output.status.code(), Some(166));
    assert!(stdout_lines(&output).is_empty());
}

#[test]
fn test_cli_invalid_exclusion_fails() {
    let (_dir, root) = fixture();

    let output = affected(&root, &["--assume-changes", "Lib", "--exclude", "(unclosed"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_to_requires_from() {
    let (_dir, root) = fixture();

    let output = affected(&root, &["--to", "main"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--from"));
}

#[test]
fn test_cli_describe() {
    let (_dir, root) = fixture();

    let output = affected(&root, &["describe", "--assume-changes", "Lib"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 projects are assumed to have changed"));
    assert!(stdout.contains("2 projects are affected by these changes"));
    assert!(!root.join("affected.proj").exists());
}

#[test]
fn test_cli_git_changes() {
    let git_available = Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success());
    if !git_available {
        return;
    }

    let (_dir, root) = fixture();
    let git = |args: &[&str]| {
        let output = Command::new("git")
            .arg("-C")
            .arg(&root)
            .args(["-c", "user.name=affected", "-c", "user.email=affected@example.com"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {args:?}");
    };
    git(&["init", "-q"]);
    git(&["add", "."]);
    git(&["commit", "-q", "-m", "initial"]);
    write(&root, "tools/Tool/Program.cs", "class Program {}");

    let output = affected(&root, &["--dry-run", "--format", "text"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_lines(&output), vec![display(root.join("tools/Tool/Tool.csproj"))]);
}
