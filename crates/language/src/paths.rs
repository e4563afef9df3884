//! Path helpers shared by language plugins
//!
//! Everything here is lexical: no helper touches the file system, so test path
//! mapping stays a pure function of its input.

use std::path::{Component, Path, PathBuf};

/// Lower-cased extension of a path
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// File name as a string, empty when the path has none
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File stem as a string, empty when the path has none
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether the path has one of the given extensions (case-insensitive)
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match extension_of(path) {
        Some(ext) => extensions.iter().any(|candidate| candidate.eq_ignore_ascii_case(&ext)),
        None => false,
    }
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Whether any directory component of the path equals `name`
pub fn has_dir_component(path: &Path, name: &str) -> bool {
    match path.parent() {
        Some(parent) => normal_components(parent).iter().any(|part| part == name),
        None => false,
    }
}

/// Whether the directory components contain `sequence` contiguously
pub fn has_dir_sequence(path: &Path, sequence: &[&str]) -> bool {
    let parts = match path.parent() {
        Some(parent) => normal_components(parent),
        None => return false,
    };
    if sequence.is_empty() || parts.len() < sequence.len() {
        return false;
    }
    parts
        .windows(sequence.len())
        .any(|window| window.iter().zip(sequence).all(|(a, b)| a == b))
}

/// Lexically normalise a path, dropping `.` and folding `..` where possible
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Split a directory into the part before its first `src` component and the
/// part after it. Without a `src` component a relative directory is rooted at
/// the working directory and an absolute one at itself.
fn split_at_src(dir: &Path) -> (PathBuf, PathBuf) {
    let dir = normalize(dir);
    let components: Vec<Component> = dir.components().collect();
    if let Some(index) = components
        .iter()
        .position(|component| matches!(component, Component::Normal(part) if *part == "src"))
    {
        let root: PathBuf = components[..index].iter().collect();
        let rest: PathBuf = components[index + 1..].iter().collect();
        return (root, rest);
    }
    if dir.is_absolute() {
        (dir, PathBuf::new())
    } else {
        (PathBuf::new(), dir)
    }
}

/// Place `file_name` under `tests_dir`, mirroring the source directory
pub fn mirror_path(source_path: &Path, tests_dir: &Path, file_name: &str) -> PathBuf {
    let parent = source_path.parent().unwrap_or_else(|| Path::new(""));
    let (root, rest) = split_at_src(parent);
    root.join(tests_dir).join(rest).join(file_name)
}

/// Module path components of a source file below its source root
pub fn module_components(source_path: &Path) -> Vec<String> {
    let parent = source_path.parent().unwrap_or_else(|| Path::new(""));
    let (_, rest) = split_at_src(parent);
    let mut parts = if parent.is_absolute() && !has_dir_component(source_path, "src") {
        Vec::new()
    } else {
        normal_components(&rest)
    };
    parts.push(file_stem(source_path));
    parts
}

/// Lexical relative path from directory `from` to path `to`
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = normal_components(&normalize(from));
    let to_norm = normalize(to);
    let to_parts = normal_components(&to_norm);

    let common = from
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..from.len() {
        result.push("..");
    }
    for part in &to_parts[common..] {
        result.push(part);
    }
    result
}

/// ES module style import specifier from `from_dir` to `target`
pub fn import_specifier(from_dir: &Path, target: &Path) -> String {
    let relative = relative_path(from_dir, target);
    let joined = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}
