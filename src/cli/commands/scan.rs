//! Scan command implementation

use crate::cli::utils;
use crate::language::LanguageRegistry;
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directories that never hold code under test
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "vendor", "venv", "__pycache__", "build", "dist"];

pub fn command() -> Command {
    Command::new("scan")
        .about("List source files and whether their tests exist")
        .arg(
            clap::Arg::new("dir")
                .help("Directory to scan")
                .value_name("DIR")
                .default_value("."),
        )
        .arg(
            clap::Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Glob of paths to skip, relative to DIR")
                .value_name("GLOB")
                .action(clap::ArgAction::Append),
        )
        .arg(
            clap::Arg::new("missing-only")
                .long("missing-only")
                .help("Only list sources without a test file")
                .action(clap::ArgAction::SetTrue),
        )
}

/// A source file found by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub source: PathBuf,
    pub language: String,
    pub test_path: PathBuf,
    pub has_test: bool,
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

/// Walk `root` and map every source file to its test path
pub fn scan_directory(
    registry: &LanguageRegistry,
    root: &Path,
    excludes: &[Pattern],
) -> Vec<ScanEntry> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if excludes.iter().any(|pattern| pattern.matches_path(relative)) {
            debug!("Excluded {:?}", relative);
            continue;
        }

        let Ok(language) = registry.detect(path) else {
            continue;
        };
        if !language.is_source_file(path) {
            continue;
        }
        match language.test_file_path(path) {
            Ok(test_path) => entries.push(ScanEntry {
                source: path.to_path_buf(),
                language: language.metadata().id,
                has_test: test_path.exists(),
                test_path,
            }),
            Err(e) => debug!("No test path for {:?}: {}", path, e),
        }
    }

    entries
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = utils::load_config(matches)?;
    let app = utils::create_app(config)?;

    let root = utils::path_arg(matches, "dir").unwrap_or_else(|| PathBuf::from("."));
    if !root.is_dir() {
        return Err(anyhow!("Not a directory: {:?}", root));
    }
    let excludes = matches
        .get_many::<String>("exclude")
        .into_iter()
        .flatten()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| anyhow!("Invalid exclude pattern '{}': {}", pattern, e))
        })
        .collect::<Result<Vec<_>>>()?;
    let missing_only = matches.get_flag("missing-only");

    let entries = scan_directory(app.registry(), &root, &excludes);
    let missing = entries.iter().filter(|entry| !entry.has_test).count();

    for entry in entries.iter().filter(|entry| !missing_only || !entry.has_test) {
        println!(
            "{} [{}] -> {}{}",
            entry.source.display(),
            entry.language,
            entry.test_path.display(),
            if entry.has_test { "" } else { " (missing)" }
        );
    }

    println!(
        "\n{} source files, {} with tests, {} missing",
        entries.len(),
        entries.len() - missing,
        missing
    );

    Ok(())
}
