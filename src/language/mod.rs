//! Built-in language plugins
//!
//! Each plugin implements [`LanguageSupport`] with a tree-sitter scan of the
//! top-level declarations and renders stubs for one test framework.

pub mod go;
pub mod java;
pub mod javascript;
pub mod python;
pub mod registry;
pub mod rust;
pub mod syntax;


pub use go::{GoFactory, GoLanguage};
pub use java::{JavaFactory, JavaLanguage};
pub use javascript::{Dialect, JavaScriptFactory, JavaScriptLanguage, JsFramework};
pub use python::{PythonFactory, PythonFramework, PythonLanguage};
pub use registry::LanguageRegistry;
pub use rust::{RustFactory, RustLanguage};
pub use ugen_language::{LanguageFactory, LanguageSupport};

use ugen_language::{Symbol, SymbolKind};

/// Base extensions plus configured extras, lowercased and without duplicates
pub(crate) fn extensions_with(base: &[&str], extra: &[String]) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::with_capacity(base.len() + extra.len());
    let candidates = base
        .iter()
        .map(|ext| ext.to_string())
        .chain(extra.iter().cloned());
    for extension in candidates {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        if !extension.is_empty() && !extensions.contains(&extension) {
            extensions.push(extension);
        }
    }
    extensions
}

/// Exported functions and classes, each class with its exported methods
pub(crate) struct Grouped<'a> {
    pub functions: Vec<&'a Symbol>,
    pub classes: Vec<(&'a Symbol, Vec<&'a Symbol>)>,
}

impl<'a> Grouped<'a> {
    pub fn new(symbols: &'a [Symbol]) -> Self {
        let functions = symbols
            .iter()
            .filter(|s| s.exported && s.kind == SymbolKind::Function)
            .collect();
        let classes = symbols
            .iter()
            .filter(|s| s.exported && s.kind == SymbolKind::Class)
            .map(|class| {
                let methods = symbols
                    .iter()
                    .filter(|m| {
                        m.exported
                            && m.kind == SymbolKind::Method
                            && m.parent.as_deref() == Some(class.name.as_str())
                    })
                    .collect();
                (class, methods)
            })
            .collect();
        Self { functions, classes }
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty()
    }
}
