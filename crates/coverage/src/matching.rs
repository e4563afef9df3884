//! Matching report paths against source paths
//!
//! Report tools write paths relative to different roots, so a source file is
//! matched component-wise: equal paths, either path ending with the other, and
//! finally equal file names when nothing else matches.

/// Normalise separators and drop `.` components
pub fn normalize(path: &str) -> String {
    components(path).join("/")
}

fn components(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect()
}

fn ends_with(path: &[&str], suffix: &[&str]) -> bool {
    !suffix.is_empty() && path.len() >= suffix.len() && path[path.len() - suffix.len()..] == *suffix
}

/// Whether two paths name the same file without falling back to file names
pub fn paths_match(report_path: &str, source_path: &str) -> bool {
    let report = components(report_path);
    let source = components(source_path);
    report == source || ends_with(&source, &report) || ends_with(&report, &source)
}

fn same_file_name(report_path: &str, source_path: &str) -> bool {
    match (components(report_path).last(), components(source_path).last()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Pick the report path that best matches a source path
pub fn find_match<'a, I>(report_paths: I, source_path: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fallback = None;
    for candidate in report_paths {
        if paths_match(candidate, source_path) {
            return Some(candidate);
        }
        if fallback.is_none() && same_file_name(candidate, source_path) {
            fallback = Some(candidate);
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("./src\\pkg//calc.py"), "src/pkg/calc.py");
    }

    #[test]
    fn test_paths_match() {
        assert!(paths_match("src/calc.py", "./src/calc.py"));
        assert!(paths_match("calc.py", "/home/me/project/calc.py"));
        assert!(paths_match("/home/me/project/src/calc.py", "src/calc.py"));
        assert!(!paths_match("src/other_calc.py", "calc.py"));
        assert!(!paths_match("a/calc.py", "b/calc.py"));
    }

    #[test]
    fn test_find_match_prefers_component_match() {
        let paths = ["lib/calc.py", "src/calc.py"];
        assert_eq!(find_match(paths, "src/calc.py"), Some("src/calc.py"));
        assert_eq!(find_match(paths, "other/calc.py"), Some("lib/calc.py"));
        assert_eq!(find_match(paths, "other/main.py"), None);
    }
}
