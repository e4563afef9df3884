//! Go language plugin (testing)

use std::path::{Path, PathBuf};
use tree_sitter::Node;
use ugen_language::paths::{self, has_extension};
use ugen_language::traits::{insert_missing_lines, LanguageFactory, LanguageSupport};
use ugen_language::{
    LanguageError, LanguageMetadata, LanguageResult, LanguageSettings, SourceFile, StubWriter,
    Symbol, SymbolKind,
};

use super::extensions_with;
use super::syntax;

const ID: &str = "go";
const FRAMEWORK: &str = "testing";

/// Go plugin
///
/// Go tests must live in the package directory, so the layout setting is
/// ignored and tests are always written next to the source.
#[derive(Debug, Clone)]
pub struct GoLanguage {
    extensions: Vec<String>,
}

impl Default for GoLanguage {
    fn default() -> Self {
        Self {
            extensions: vec!["go".to_string()],
        }
    }
}

/// Package name and declarations of a Go file
struct GoFile {
    package: Option<String>,
    symbols: Vec<Symbol>,
}

impl GoLanguage {
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
            extensions: extensions_with(&["go"], &settings.extra_extensions),
        })
    }

    fn is_exported(name: &str) -> bool {
        name.chars().next().map(char::is_uppercase).unwrap_or(false)
    }

    fn scan(&self, content: &str) -> LanguageResult<GoFile> {
        let tree = syntax::parse(&tree_sitter_go::LANGUAGE.into(), ID, content)?;
        let mut file = GoFile {
            package: None,
            symbols: Vec::new(),
        };

        for node in syntax::named_children(tree.root_node()) {
            match node.kind() {
                "package_clause" => {
                    file.package = syntax::child_of_kind(node, "package_identifier")
                        .map(|name| syntax::text(name, content).to_string());
                }
                "function_declaration" => {
                    if let Some(name) = syntax::field_text(node, "name", content) {
                        let generic = node.child_by_field_name("type_parameters").is_some();
                        file.symbols.push(
                            Symbol::new(name, SymbolKind::Function, syntax::line(node))
                                .exported(Self::is_exported(name))
                                .generic(generic),
                        );
                    }
                }
                "method_declaration" => {
                    let Some(name) = syntax::field_text(node, "name", content) else {
                        continue;
                    };
                    let Some((receiver, generic)) = Self::receiver(node, content) else {
                        continue;
                    };
                    let exported = Self::is_exported(name) && Self::is_exported(&receiver);
                    file.symbols.push(
                        Symbol::method(name, receiver, syntax::line(node))
                            .exported(exported)
                            .generic(generic),
                    );
                }
                "type_declaration" => {
                    for spec in syntax::named_children(node) {
                        if spec.kind() != "type_spec" {
                            continue;
                        }
                        if let Some(name) = syntax::field_text(spec, "name", content) {
                            let generic = spec.child_by_field_name("type_parameters").is_some();
                            file.symbols.push(
                                Symbol::new(name, SymbolKind::Type, syntax::line(spec))
                                    .exported(Self::is_exported(name))
                                    .generic(generic),
                            );
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(file)
    }

    /// Receiver type name of a method, and whether that type is generic
    fn receiver(method: Node<'_>, source: &str) -> Option<(String, bool)> {
        let receiver = method.child_by_field_name("receiver")?;
        let parameter = syntax::named_children(receiver)
            .into_iter()
            .find(|n| n.kind() == "parameter_declaration")?;
        let mut ty = parameter.child_by_field_name("type")?;
        if ty.kind() == "pointer_type" {
            ty = syntax::named_children(ty).into_iter().next()?;
        }
        match ty.kind() {
            "type_identifier" => Some((syntax::text(ty, source).to_string(), false)),
            "generic_type" => {
                let base = ty.child_by_field_name("type")?;
                Some((syntax::text(base, source).to_string(), true))
            }
            _ => None,
        }
    }

    fn render(&self, file: &GoFile) -> String {
        let mut w = StubWriter::new("\t");
        w.line(format!(
            "package {}",
            file.package.as_deref().unwrap_or("main")
        ));
        w.blank();
        w.line("import \"testing\"");

        let testable: Vec<&Symbol> = file
            .symbols
            .iter()
            .filter(|s| s.exported && matches!(s.kind, SymbolKind::Function | SymbolKind::Method))
            .collect();

        if testable.is_empty() {
            w.blank();
            w.block("func TestPlaceholder(t *testing.T) {", "}", |w| {
                w.line("t.Skip(\"no exported functions to test\")");
            });
            return w.finish();
        }

        for symbol in testable {
            let (test_name, reference) = match &symbol.parent {
                Some(receiver) => (
                    format!("Test{receiver}_{}", symbol.name),
                    format!("(*{receiver}).{}", symbol.name),
                ),
                None => (format!("Test{}", symbol.name), symbol.name.clone()),
            };
            w.blank();
            w.block(format!("func {test_name}(t *testing.T) {{"), "}", |w| {
                if symbol.generic {
                    w.line(format!(
                        "t.Skip(\"{reference} is generic: instantiate it with concrete types\")"
                    ));
                } else {
                    w.line(format!("_ = {reference}"));
                }
            });
        }

        w.finish()
    }

    /// Import specs such as `"fmt"` or `str "strings"` found in import text
    fn import_specs(imports: &str) -> Vec<String> {
        imports
            .lines()
            .map(|line| {
                let line = line.trim();
                let line = line.strip_prefix("import").unwrap_or(line).trim();
                line.trim_start_matches('(').trim_end_matches(')').trim().to_string()
            })
            .filter(|spec| spec.contains('"') || spec.contains('`'))
            .collect()
    }

    fn import_path(spec: &str) -> &str {
        spec.find(['"', '`'])
            .map(|start| &spec[start..])
            .unwrap_or(spec)
    }
}

impl LanguageSupport for GoLanguage {
    fn metadata(&self) -> LanguageMetadata {
        LanguageMetadata {
            id: ID.to_string(),
            name: "Go".to_string(),
            extensions: self.extensions.clone(),
            frameworks: vec![FRAMEWORK.to_string()],
        }
    }

    fn generate_test(&self, source_content: &str) -> LanguageResult<String> {
        Ok(self.render(&self.scan(source_content)?))
    }

    fn generate_test_for(&self, source: &SourceFile) -> LanguageResult<String> {
        self.ensure_source(&source.path)?;
        self.generate_test(&source.content)
    }

    fn is_source_file(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions) && !self.is_test_file(path)
    }

    fn is_test_file(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions) && paths::file_stem(path).ends_with("_test")
    }

    fn test_file_path(&self, source_path: &Path) -> LanguageResult<PathBuf> {
        self.ensure_source(source_path)?;
        let extension = source_path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "go".to_string());
        Ok(source_path.with_file_name(format!(
            "{}_test.{extension}",
            paths::file_stem(source_path)
        )))
    }

    fn test_framework(&self) -> &str {
        FRAMEWORK
    }

    fn extract_symbols(&self, source_content: &str) -> LanguageResult<Vec<Symbol>> {
        Ok(self.scan(source_content)?.symbols)
    }

    fn insert_imports(&self, test_content: &str, imports: &str) -> String {
        let missing: Vec<String> = Self::import_specs(imports)
            .into_iter()
            .filter(|spec| !test_content.contains(Self::import_path(spec)))
            .map(|spec| format!("import {spec}"))
            .collect();
        if missing.is_empty() {
            return test_content.to_string();
        }
        insert_missing_lines(test_content, &missing.join("\n"), |line| {
            line.starts_with("package ") || line.starts_with("//")
        })
    }

    fn clone_box(&self) -> Box<dyn LanguageSupport> {
        Box::new(self.clone())
    }
}

/// Factory for the Go plugin
#[derive(Debug, Clone, Default)]
pub struct GoFactory;

impl LanguageFactory for GoFactory {
    fn language_id(&self) -> &str {
        ID
    }

    fn create(&self, settings: &LanguageSettings) -> LanguageResult<Box<dyn LanguageSupport>> {
        Ok(Box::new(GoLanguage::from_settings(settings)?))
    }

    fn clone_box(&self) -> Box<dyn LanguageFactory> {
        Box::new(self.clone())
    }
}
