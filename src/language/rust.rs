//! Rust language plugin (cargo test)

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tree_sitter::Node;
use ugen_language::paths::{self, has_extension};
use ugen_language::stub::snake_case;
use ugen_language::traits::{insert_missing_lines, LanguageFactory, LanguageSupport};
use ugen_language::{
    LanguageError, LanguageMetadata, LanguageResult, LanguageSettings, SourceFile, StubWriter,
    Symbol, SymbolKind,
};

use super::extensions_with;
use super::syntax;

const ID: &str = "rust";
const FRAMEWORK: &str = "cargo-test";

/// Rust plugin
///
/// Tests are written as a `tests.rs` child module of the source module, so
/// private items are reachable through `use super::*`.
#[derive(Debug, Clone)]
pub struct RustLanguage {
    extensions: Vec<String>,
}

impl Default for RustLanguage {
    fn default() -> Self {
        Self {
            extensions: vec!["rs".to_string()],
        }
    }
}

impl RustLanguage {
    pub fn from_settings(settings: &LanguageSettings) -> LanguageResult<Self> {
        if let Some(framework) = &settings.framework {
            if framework != FRAMEWORK {
                return Err(LanguageError::UnsupportedFramework {
                    language: ID.to_string(),
                    framework: framework.clone(),
                });
            }
        }
        Ok(Self {
            extensions: extensions_with(&["rs"], &settings.extra_extensions),
        })
    }

    fn is_public(node: Node<'_>) -> bool {
        syntax::has_child_kind(node, "visibility_modifier")
    }

    fn impl_type(node: Node<'_>, source: &str) -> Option<(String, bool)> {
        let ty = node.child_by_field_name("type")?;
        match ty.kind() {
            "type_identifier" => Some((syntax::text(ty, source).to_string(), false)),
            "generic_type" => {
                let base = ty.child_by_field_name("type")?;
                Some((syntax::text(base, source).to_string(), true))
            }
            _ => None,
        }
    }

    fn render(&self, symbols: &[Symbol]) -> String {
        let mut w = StubWriter::new("    ");
        w.line("use super::*;");

        let testable: Vec<&Symbol> = symbols
            .iter()
            .filter(|s| s.exported && matches!(s.kind, SymbolKind::Function | SymbolKind::Method))
            .collect();

        if testable.is_empty() {
            w.blank();
            w.line("#[test]");
            w.line("fn placeholder() {}");
            return w.finish();
        }

        let mut taken = HashSet::new();
        for symbol in testable {
            let (base, path) = match &symbol.parent {
                Some(ty) => (
                    format!("test_{}_{}", snake_case(ty), snake_case(&symbol.name)),
                    format!("{ty}::{}", symbol.name),
                ),
                None => (format!("test_{}", snake_case(&symbol.name)), symbol.name.clone()),
            };
            let mut name = base.clone();
            let mut suffix = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}_{suffix}");
                suffix += 1;
            }

            w.blank();
            w.line("#[test]");
            w.line("#[ignore = \"pending\"]");
            w.block(format!("fn {name}() {{"), "}", |w| {
                if symbol.generic {
                    w.line(format!("todo!(\"call {path} with concrete types\");"));
                } else {
                    w.line(format!("let _ = {path};"));
                }
            });
        }

        w.finish()
    }
}

impl LanguageSupport for RustLanguage {
    fn metadata(&self) -> LanguageMetadata {
        LanguageMetadata {
            id: ID.to_string(),
            name: "Rust".to_string(),
            extensions: self.extensions.clone(),
            frameworks: vec![FRAMEWORK.to_string()],
        }
    }

    fn generate_test(&self, source_content: &str) -> LanguageResult<String> {
        let symbols = self.extract_symbols(source_content)?;
        Ok(self.render(&symbols))
    }

    fn generate_test_for(&self, source: &SourceFile) -> LanguageResult<String> {
        self.ensure_source(&source.path)?;
        self.generate_test(&source.content)
    }

    fn is_source_file(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions) && !self.is_test_file(path)
    }

    fn is_test_file(&self, path: &Path) -> bool {
        if !has_extension(path, &self.extensions) {
            return false;
        }
        let stem = paths::file_stem(path);
        stem == "tests"
            || stem.ends_with("_test")
            || stem.ends_with("_tests")
            || paths::has_dir_component(path, "tests")
            || paths::has_dir_component(path, "benches")
    }

    fn test_file_path(&self, source_path: &Path) -> LanguageResult<PathBuf> {
        self.ensure_source(source_path)?;
        let parent = source_path.parent().unwrap_or_else(|| Path::new(""));
        let stem = paths::file_stem(source_path);
        let module_dir = match stem.as_str() {
            "lib" | "main" | "mod" => parent.to_path_buf(),
            _ => parent.join(&stem),
        };
        Ok(module_dir.join("tests.rs"))
    }

    fn test_framework(&self) -> &str {
        FRAMEWORK
    }

    fn extract_symbols(&self, source_content: &str) -> LanguageResult<Vec<Symbol>> {
        let tree = syntax::parse(&tree_sitter_rust::LANGUAGE.into(), ID, source_content)?;
        let mut symbols = Vec::new();

        for node in syntax::named_children(tree.root_node()) {
            match node.kind() {
                "function_item" => {
                    let Some(name) = syntax::field_text(node, "name", source_content) else {
                        continue;
                    };
                    let generic = node.child_by_field_name("type_parameters").is_some();
                    symbols.push(
                        Symbol::new(name, SymbolKind::Function, syntax::line(node))
                            .exported(name != "main")
                            .generic(generic),
                    );
                }
                "struct_item" | "enum_item" | "trait_item" | "type_item" => {
                    if let Some(name) = syntax::field_text(node, "name", source_content) {
                        symbols.push(
                            Symbol::new(name, SymbolKind::Type, syntax::line(node))
                                .exported(Self::is_public(node))
                                .generic(node.child_by_field_name("type_parameters").is_some()),
                        );
                    }
                }
                "impl_item" => {
                    // Trait methods are exercised through the trait, not the type
                    if node.child_by_field_name("trait").is_some() {
                        continue;
                    }
                    let Some((ty, type_generic)) = Self::impl_type(node, source_content) else {
                        continue;
                    };
                    let impl_generic =
                        type_generic || node.child_by_field_name("type_parameters").is_some();
                    let Some(body) = node.child_by_field_name("body") else {
                        continue;
                    };
                    for member in syntax::named_children(body) {
                        if member.kind() != "function_item" {
                            continue;
                        }
                        if let Some(name) = syntax::field_text(member, "name", source_content) {
                            let generic = impl_generic
                                || member.child_by_field_name("type_parameters").is_some();
                            symbols.push(
                                Symbol::method(name, ty.as_str(), syntax::line(member))
                                    .generic(generic),
                            );
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(symbols)
    }

    fn insert_imports(&self, test_content: &str, imports: &str) -> String {
        insert_missing_lines(test_content, imports, |line| {
            line.starts_with("//") || line.starts_with("#!") || line.starts_with("use super::")
        })
    }

    fn clone_box(&self) -> Box<dyn LanguageSupport> {
        Box::new(self.clone())
    }
}

/// Factory for the Rust plugin
#[derive(Debug, Clone, Default)]
pub struct RustFactory;

impl LanguageFactory for RustFactory {
    fn language_id(&self) -> &str {
        ID
    }

    fn create(&self, settings: &LanguageSettings) -> LanguageResult<Box<dyn LanguageSupport>> {
        Ok(Box::new(RustLanguage::from_settings(settings)?))
    }

    fn clone_box(&self) -> Box<dyn LanguageFactory> {
        Box::new(self.clone())
    }
}
