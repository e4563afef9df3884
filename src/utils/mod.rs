//! Utility functions for ugen

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(anyhow!("Path exists but is not a directory: {:?}", path));
    }
    Ok(())
}

/// Expand `~` and environment variables in a path
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    if !raw.contains('~') && !raw.contains('$') {
        return Ok(path.to_path_buf());
    }
    let expanded = shellexpand::full(&raw)
        .map_err(|e| anyhow!("Failed to expand path {:?}: {}", path, e))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Prefix every line with its 1-based line number
pub fn numbered_lines(content: &str) -> String {
    content
        .split('\n')
        .enumerate()
        .map(|(i, line)| format!("{} {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Path relative to `base` when it lies below it, unchanged otherwise
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Read extra context files for the prompt
///
/// Each file is rendered as its path followed by a fenced copy of its content.
/// Unreadable files are skipped with a warning.
pub fn read_included_files(paths: &[PathBuf], project_root: &Path) -> String {
    let mut sections = Vec::new();
    for path in paths {
        let resolved = if path.is_absolute() {
            path.clone()
        } else {
            project_root.join(path)
        };
        match fs::read_to_string(&resolved)
            .with_context(|| format!("Failed to read included file {resolved:?}"))
        {
            Ok(content) => sections.push(format!(
                "file_path: `{}`\ncontent:\n```\n{}\n```",
                display_relative(&resolved, project_root),
                content.trim_end()
            )),
            Err(e) => warn!("{:#}", e),
        }
    }
    sections.join("\n\n")
}

/// Format duration as human readable string
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs > 0 {
        format!("{secs}.{millis:03}s")
    } else {
        format!("{millis}ms")
    }
}

/// Format a coverage fraction as a percentage
pub fn format_coverage(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_numbered_lines() {
        assert_eq!(numbered_lines("a\nb"), "1 a\n2 b");
        assert_eq!(numbered_lines("a\n"), "1 a\n2 ");
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(
            expand_path(Path::new("coverage.xml")).unwrap(),
            PathBuf::from("coverage.xml")
        );
        std::env::set_var("UGEN_UTILS_TEST_DIR", "/opt/reports");
        assert_eq!(
            expand_path(Path::new("$UGEN_UTILS_TEST_DIR/lcov.info")).unwrap(),
            PathBuf::from("/opt/reports/lcov.info")
        );
    }

    #[test]
    fn test_read_included_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("helpers.py"), "def helper():\n    pass\n").unwrap();

        let section = read_included_files(
            &[PathBuf::from("helpers.py"), PathBuf::from("missing.py")],
            temp_dir.path(),
        );
        assert_eq!(
            section,
            "file_path: `helpers.py`\ncontent:\n```\ndef helper():\n    pass\n```"
        );
    }

    #[test]
    fn test_ensure_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());

        let file = temp_dir.path().join("file");
        fs::write(&file, "").unwrap();
        assert!(ensure_directory(&file).is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
        assert_eq!(format_coverage(0.5), "50.00%");
    }
}
