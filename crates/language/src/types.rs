//! Shared language plugin types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Plugin metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageMetadata {
    /// Registry identifier (e.g. `python`)
    pub id: String,

    /// Human readable name
    pub name: String,

    /// File extensions without the leading dot
    pub extensions: Vec<String>,

    /// Supported test frameworks, default first
    pub frameworks: Vec<String>,
}

/// Where generated test files are placed relative to their source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestLayout {
    /// Next to the source file
    #[default]
    Sibling,

    /// Under a tests directory that mirrors the source tree
    Mirror,
}

impl fmt::Display for TestLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TestLayout::Sibling => "sibling",
            TestLayout::Mirror => "mirror",
        })
    }
}

/// Per-language settings a factory uses to build a plugin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageSettings {
    /// Test framework; the plugin default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    /// Test file placement
    pub layout: TestLayout,

    /// Root of the mirrored tests tree; the plugin default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tests_dir: Option<PathBuf>,

    /// Additional extensions treated as source files
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_extensions: Vec<String>,
}

/// A source file handed to a plugin
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read a source file from disk
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(path, content))
    }
}

/// Kind of a testable symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Class,
    Method,
    Type,
}

/// A top-level declaration found in source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,

    /// Enclosing class or receiver type for methods
    pub parent: Option<String>,

    /// 1-based line of the declaration
    pub line: usize,

    /// Visible outside its module
    pub exported: bool,

    /// Declares type parameters
    pub generic: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            line,
            exported: true,
            generic: false,
        }
    }

    pub fn method(name: impl Into<String>, parent: impl Into<String>, line: usize) -> Self {
        Self {
            parent: Some(parent.into()),
            ..Self::new(name, SymbolKind::Method, line)
        }
    }

    pub fn exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    pub fn generic(mut self, generic: bool) -> Self {
        self.generic = generic;
        self
    }
}

/// Result of classifying a path against a set of plugins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileClass {
    Source(String),
    Test(String),
    Unknown,
}

impl fmt::Display for FileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileClass::Source(language) => write!(f, "source ({language})"),
            FileClass::Test(language) => write!(f, "test ({language})"),
            FileClass::Unknown => f.write_str("unknown"),
        }
    }
}
