//! JavaScript and TypeScript language plugins (jest, vitest)

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node};
use ugen_language::paths::{self, has_extension};
use ugen_language::traits::{LanguageFactory, LanguageSupport};
use ugen_language::{
    LanguageError, LanguageMetadata, LanguageResult, LanguageSettings, SourceFile, StubWriter,
    Symbol, SymbolKind, TestLayout,
};

use super::extensions_with;
use super::syntax;

/// Which ECMAScript dialect a plugin handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JavaScript,
    TypeScript,
}

impl Dialect {
    fn id(&self) -> &'static str {
        match self {
            Dialect::JavaScript => "javascript",
            Dialect::TypeScript => "typescript",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Dialect::JavaScript => "JavaScript",
            Dialect::TypeScript => "TypeScript",
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self {
            Dialect::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Dialect::TypeScript => &["ts", "tsx", "mts", "cts"],
        }
    }
}

/// JavaScript test frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsFramework {
    Jest,
    Vitest,
}

impl JsFramework {
    fn parse(dialect: Dialect, name: &str) -> LanguageResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "jest" => Ok(Self::Jest),
            "vitest" => Ok(Self::Vitest),
            _ => Err(LanguageError::UnsupportedFramework {
                language: dialect.id().to_string(),
                framework: name.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Jest => "jest",
            Self::Vitest => "vitest",
        }
    }
}

/// What a module exposes, as far as a test file can import it
#[derive(Debug, Default)]
struct ModuleScan {
    symbols: Vec<Symbol>,
    /// `(class, method)` pairs declared `static`
    statics: HashSet<(String, String)>,
    /// Name bound by `export default` or `module.exports =`
    default_export: Option<String>,
    /// Uses `import`/`export` syntax
    esm: bool,
}

impl ModuleScan {
    fn testable(&self) -> Vec<&Symbol> {
        self.symbols
            .iter()
            .filter(|s| s.exported && matches!(s.kind, SymbolKind::Function | SymbolKind::Class))
            .collect()
    }

    fn methods_of<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.symbols.iter().filter(move |s| {
            s.kind == SymbolKind::Method && s.parent.as_deref() == Some(class)
        })
    }
}

/// JavaScript or TypeScript plugin
#[derive(Debug, Clone)]
pub struct JavaScriptLanguage {
    dialect: Dialect,
    framework: JsFramework,
    layout: TestLayout,
    tests_dir: PathBuf,
    extensions: Vec<String>,
}

impl JavaScriptLanguage {
    pub fn new(dialect: Dialect, framework: JsFramework) -> Self {
        Self {
            dialect,
            framework,
            layout: TestLayout::Sibling,
            tests_dir: PathBuf::from("__tests__"),
            extensions: extensions_with(dialect.extensions(), &[]),
        }
    }

    pub fn javascript() -> Self {
        Self::new(Dialect::JavaScript, JsFramework::Jest)
    }

    pub fn typescript() -> Self {
        Self::new(Dialect::TypeScript, JsFramework::Jest)
    }

    pub fn from_settings(dialect: Dialect, settings: &LanguageSettings) -> LanguageResult<Self> {
        let framework = match &settings.framework {
            Some(name) => JsFramework::parse(dialect, name)?,
            None => JsFramework::Jest,
        };
        Ok(Self {
            dialect,
            framework,
            layout: settings.layout,
            tests_dir: settings
                .tests_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("__tests__")),
            extensions: extensions_with(dialect.extensions(), &settings.extra_extensions),
        })
    }

    fn is_declaration_file(path: &Path) -> bool {
        let name = paths::file_name(path);
        name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts")
    }

    fn grammars(&self, path: Option<&Path>) -> Vec<Language> {
        match self.dialect {
            Dialect::JavaScript => vec![tree_sitter_javascript::LANGUAGE.into()],
            Dialect::TypeScript => {
                let tsx: Language = tree_sitter_typescript::LANGUAGE_TSX.into();
                let ts: Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
                match path.and_then(paths::extension_of).as_deref() {
                    Some("tsx") => vec![tsx],
                    Some(_) => vec![ts],
                    // Unknown origin: plain TypeScript first, then TSX
                    None => vec![ts, tsx],
                }
            }
        }
    }

    fn scan(&self, content: &str, path: Option<&Path>) -> LanguageResult<ModuleScan> {
        let mut first_error = None;
        for grammar in self.grammars(path) {
            match syntax::parse(&grammar, self.dialect.id(), content) {
                Ok(tree) => return Ok(scan_program(tree.root_node(), content)),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        Err(first_error
            .unwrap_or_else(|| LanguageError::Grammar(format!("{}: no grammar", self.dialect.id()))))
    }

    /// Import specifier for the source, as seen from its test file
    fn specifier(&self, source_path: &Path) -> LanguageResult<String> {
        let test_path = self.test_file_path(source_path)?;
        let test_dir = test_path.parent().unwrap_or_else(|| Path::new(""));
        let stem = paths::file_stem(source_path);
        let target_name = match paths::extension_of(source_path).as_deref() {
            Some("mjs") | Some("mts") => format!("{stem}.mjs"),
            Some("cjs") | Some("cts") => format!("{stem}.cjs"),
            _ => stem,
        };
        let target = source_path.with_file_name(target_name);
        Ok(paths::import_specifier(test_dir, &target))
    }

    fn uses_esm(&self, scan: &ModuleScan) -> bool {
        self.dialect == Dialect::TypeScript || scan.esm
    }

    fn import_line(&self, scan: &ModuleScan, specifier: Option<&str>) -> Option<String> {
        let testable = scan.testable();
        if testable.is_empty() {
            return None;
        }

        let named: Vec<&str> = testable
            .iter()
            .map(|s| s.name.as_str())
            .filter(|name| Some(*name) != scan.default_export.as_deref())
            .collect();
        let default = scan
            .default_export
            .as_deref()
            .filter(|name| testable.iter().any(|s| s.name == *name));

        let (line, commented) = match specifier {
            Some(specifier) => (specifier.to_string(), false),
            None => ("<module under test>".to_string(), true),
        };

        let statement = if self.uses_esm(scan) {
            let mut bindings = Vec::new();
            if let Some(default) = default {
                bindings.push(default.to_string());
            }
            if !named.is_empty() {
                bindings.push(format!("{{ {} }}", named.join(", ")));
            }
            format!("import {} from '{line}';", bindings.join(", "))
        } else if let Some(default) = default {
            format!("const {default} = require('{line}');")
        } else {
            format!("const {{ {} }} = require('{line}');", named.join(", "))
        };

        Some(if commented {
            format!("// {statement}")
        } else {
            statement
        })
    }

    fn render(&self, scan: &ModuleScan, specifier: Option<&str>) -> String {
        let mut w = StubWriter::new("  ");

        if self.framework == JsFramework::Vitest {
            w.line("import { describe, test, expect } from 'vitest';");
        }
        if let Some(import) = self.import_line(scan, specifier) {
            w.line(import);
        }

        // A CommonJS module replaced by `module.exports = X` only exposes X
        let cjs_default = !self.uses_esm(scan) && scan.default_export.is_some();
        let testable: Vec<&Symbol> = scan
            .testable()
            .into_iter()
            .filter(|s| !cjs_default || scan.default_export.as_deref() == Some(s.name.as_str()))
            .collect();

        if testable.is_empty() {
            w.separate();
            w.block("describe('module', () => {", "});", |w| {
                w.block("test('placeholder', () => {", "});", |w| {
                    w.line("expect(true).toBe(true);");
                });
            });
            return w.finish();
        }

        for symbol in testable {
            w.separate();
            let name = symbol.name.clone();
            w.block(format!("describe('{name}', () => {{"), "});", |w| {
                w.block("test('is defined', () => {", "});", |w| {
                    w.line(format!("expect({name}).toBeDefined();"));
                });
                if symbol.kind != SymbolKind::Class {
                    return;
                }
                for method in scan.methods_of(&name).filter(|m| m.exported) {
                    let target = if scan.statics.contains(&(name.clone(), method.name.clone())) {
                        format!("{name}.{}", method.name)
                    } else {
                        format!("{name}.prototype.{}", method.name)
                    };
                    w.blank();
                    w.block(format!("test('{} is defined', () => {{", method.name), "});", |w| {
                        w.line(format!("expect({target}).toBeDefined();"));
                    });
                }
            });
        }

        w.finish()
    }
}

fn scan_program(root: Node<'_>, source: &str) -> ModuleScan {
    let mut scan = ModuleScan::default();
    let mut exported: HashSet<String> = HashSet::new();
    let mut commonjs: HashSet<String> = HashSet::new();
    let mut commonjs_seen = false;
    // `export { local as alias }`, imported under the alias only
    let mut renamed: Vec<(String, String)> = Vec::new();

    for node in syntax::named_children(root) {
        match node.kind() {
            "export_statement" => {
                scan.esm = true;
                let is_default = syntax::has_child_kind(node, "default");
                if let Some(declaration) = node.child_by_field_name("declaration") {
                    let before = scan.symbols.len();
                    scan_declaration(declaration, source, &mut scan);
                    for symbol in &scan.symbols[before..] {
                        if symbol.kind != SymbolKind::Method {
                            exported.insert(symbol.name.clone());
                            if is_default {
                                scan.default_export = Some(symbol.name.clone());
                            }
                        }
                    }
                } else if let Some(value) = node.child_by_field_name("value") {
                    let name = match value.kind() {
                        "identifier" => Some(syntax::text(value, source).to_string()),
                        "function_expression" | "function" | "generator_function" | "class" => {
                            scan_named_expression(value, source, &mut scan)
                        }
                        _ => None,
                    };
                    if let (true, Some(name)) = (is_default, name) {
                        exported.insert(name.clone());
                        scan.default_export = Some(name);
                    }
                } else if let Some(clause) = syntax::child_of_kind(node, "export_clause") {
                    for specifier in syntax::named_children(clause) {
                        let Some(local) = syntax::field_text(specifier, "name", source) else {
                            continue;
                        };
                        match syntax::field_text(specifier, "alias", source) {
                            Some("default") => {
                                exported.insert(local.to_string());
                                scan.default_export = Some(local.to_string());
                            }
                            Some(alias) if alias != local => {
                                exported.insert(alias.to_string());
                                renamed.push((local.to_string(), alias.to_string()));
                            }
                            _ => {
                                exported.insert(local.to_string());
                            }
                        }
                    }
                }
            }
            "import_statement" => scan.esm = true,
            "expression_statement" => {
                if scan_commonjs(node, source, &mut scan, &mut commonjs) {
                    commonjs_seen = true;
                }
            }
            _ => scan_declaration(node, source, &mut scan),
        }
    }

    for (local, alias) in &renamed {
        rename_symbol(&mut scan, local, alias);
    }

    let explicit = scan.esm || commonjs_seen;
    let public: HashSet<String> = exported.union(&commonjs).cloned().collect();
    let class_public: HashSet<String> = scan
        .symbols
        .iter()
        .filter(|s| s.kind == SymbolKind::Class && (!explicit || public.contains(&s.name)))
        .map(|s| s.name.clone())
        .collect();

    for symbol in &mut scan.symbols {
        symbol.exported = match symbol.kind {
            SymbolKind::Method => symbol
                .parent
                .as_ref()
                .map(|parent| class_public.contains(parent))
                .unwrap_or(false),
            _ => !explicit || public.contains(&symbol.name),
        };
    }
    scan
}

fn rename_symbol(scan: &mut ModuleScan, local: &str, alias: &str) {
    for symbol in &mut scan.symbols {
        if symbol.kind == SymbolKind::Method {
            if symbol.parent.as_deref() == Some(local) {
                symbol.parent = Some(alias.to_string());
            }
        } else if symbol.name == local {
            symbol.name = alias.to_string();
        }
    }
    scan.statics = std::mem::take(&mut scan.statics)
        .into_iter()
        .map(|(class, method)| {
            if class == local {
                (alias.to_string(), method)
            } else {
                (class, method)
            }
        })
        .collect();
}

fn scan_declaration(node: Node<'_>, source: &str, scan: &mut ModuleScan) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name) = syntax::field_text(node, "name", source) {
                let generic = node.child_by_field_name("type_parameters").is_some();
                scan.symbols.push(
                    Symbol::new(name, SymbolKind::Function, syntax::line(node)).generic(generic),
                );
            }
        }
        "class_declaration" | "abstract_class_declaration" => {
            let Some(name) = syntax::field_text(node, "name", source) else {
                return;
            };
            scan.symbols
                .push(Symbol::new(name, SymbolKind::Class, syntax::line(node)));
            if let Some(body) = node.child_by_field_name("body") {
                scan_class_body(name, body, source, scan);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            for declarator in syntax::named_children(node) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let (Some(name), Some(value)) = (
                    declarator.child_by_field_name("name"),
                    declarator.child_by_field_name("value"),
                ) else {
                    continue;
                };
                if name.kind() != "identifier" {
                    continue;
                }
                let kind = match value.kind() {
                    "arrow_function" | "function_expression" | "function"
                    | "generator_function" => SymbolKind::Function,
                    "class" => SymbolKind::Class,
                    _ => continue,
                };
                scan.symbols.push(Symbol::new(
                    syntax::text(name, source),
                    kind,
                    syntax::line(declarator),
                ));
            }
        }
        _ => {}
    }
}

/// Named function or class expression, as in `export default function main() {}`
fn scan_named_expression(node: Node<'_>, source: &str, scan: &mut ModuleScan) -> Option<String> {
    let name = syntax::field_text(node, "name", source)?;
    if node.kind() == "class" {
        scan.symbols
            .push(Symbol::new(name, SymbolKind::Class, syntax::line(node)));
        if let Some(body) = node.child_by_field_name("body") {
            scan_class_body(name, body, source, scan);
        }
    } else {
        scan.symbols
            .push(Symbol::new(name, SymbolKind::Function, syntax::line(node)));
    }
    Some(name.to_string())
}

fn scan_class_body(class: &str, body: Node<'_>, source: &str, scan: &mut ModuleScan) {
    let mut seen = HashSet::new();
    for member in syntax::named_children(body) {
        if member.kind() != "method_definition" {
            continue;
        }
        let Some(name_node) = member.child_by_field_name("name") else {
            continue;
        };
        if name_node.kind() == "private_property_identifier" {
            continue;
        }
        let name = syntax::text(name_node, source);
        if name == "constructor"
            || syntax::has_child_kind(member, "get")
            || syntax::has_child_kind(member, "set")
        {
            continue;
        }
        if let Some(modifier) = syntax::child_of_kind(member, "accessibility_modifier") {
            if syntax::text(modifier, source) != "public" {
                continue;
            }
        }
        if !seen.insert(name.to_string()) {
            continue;
        }
        if syntax::has_child_kind(member, "static") {
            scan.statics.insert((class.to_string(), name.to_string()));
        }
        scan.symbols
            .push(Symbol::method(name, class, syntax::line(member)));
    }
}

/// Record `module.exports` and `exports.x` assignments; true when one was found
fn scan_commonjs(
    statement: Node<'_>,
    source: &str,
    scan: &mut ModuleScan,
    exported: &mut HashSet<String>,
) -> bool {
    let Some(assignment) = syntax::named_children(statement)
        .into_iter()
        .find(|n| n.kind() == "assignment_expression")
    else {
        return false;
    };
    let (Some(left), Some(right)) = (
        assignment.child_by_field_name("left"),
        assignment.child_by_field_name("right"),
    ) else {
        return false;
    };

    let target = syntax::text(left, source).replace(char::is_whitespace, "");
    if target == "module.exports" {
        match right.kind() {
            "identifier" => {
                let name = syntax::text(right, source).to_string();
                exported.insert(name.clone());
                scan.default_export = Some(name);
            }
            "object" => {
                for property in syntax::named_children(right) {
                    match property.kind() {
                        "shorthand_property_identifier" => {
                            exported.insert(syntax::text(property, source).to_string());
                        }
                        "pair" => {
                            if let Some(value) = property.child_by_field_name("value") {
                                if value.kind() == "identifier" {
                                    exported.insert(syntax::text(value, source).to_string());
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        return true;
    }

    let name = target
        .strip_prefix("module.exports.")
        .or_else(|| target.strip_prefix("exports."));
    let Some(name) = name else {
        return false;
    };
    if matches!(
        right.kind(),
        "arrow_function" | "function_expression" | "function" | "generator_function"
    ) {
        scan.symbols
            .push(Symbol::new(name, SymbolKind::Function, syntax::line(statement)));
    } else if right.kind() == "identifier" {
        exported.insert(syntax::text(right, source).to_string());
    }
    exported.insert(name.to_string());
    true
}

impl LanguageSupport for JavaScriptLanguage {
    fn metadata(&self) -> LanguageMetadata {
        LanguageMetadata {
            id: self.dialect.id().to_string(),
            name: self.dialect.name().to_string(),
            extensions: self.extensions.clone(),
            frameworks: vec!["jest".to_string(), "vitest".to_string()],
        }
    }

    fn generate_test(&self, source_content: &str) -> LanguageResult<String> {
        let scan = self.scan(source_content, None)?;
        Ok(self.render(&scan, None))
    }

    fn generate_test_for(&self, source: &SourceFile) -> LanguageResult<String> {
        let specifier = self.specifier(&source.path)?;
        let scan = self.scan(&source.content, Some(&source.path))?;
        Ok(self.render(&scan, Some(&specifier)))
    }

    fn is_source_file(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions)
            && !Self::is_declaration_file(path)
            && !self.is_test_file(path)
    }

    fn is_test_file(&self, path: &Path) -> bool {
        if !has_extension(path, &self.extensions) {
            return false;
        }
        let name = paths::file_name(path);
        name.contains(".test.") || name.contains(".spec.") || paths::has_dir_component(path, "__tests__")
    }

    fn test_file_path(&self, source_path: &Path) -> LanguageResult<PathBuf> {
        self.ensure_source(source_path)?;
        let extension = source_path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.dialect.extensions()[0].to_string());
        let file_name = format!("{}.test.{extension}", paths::file_stem(source_path));

        Ok(match self.layout {
            TestLayout::Sibling => source_path.with_file_name(file_name),
            TestLayout::Mirror => paths::mirror_path(source_path, &self.tests_dir, &file_name),
        })
    }

    fn test_framework(&self) -> &str {
        self.framework.name()
    }

    fn extract_symbols(&self, source_content: &str) -> LanguageResult<Vec<Symbol>> {
        Ok(self.scan(source_content, None)?.symbols)
    }

    fn clone_box(&self) -> Box<dyn LanguageSupport> {
        Box::new(self.clone())
    }
}

/// Factory for the JavaScript and TypeScript plugins
#[derive(Debug, Clone)]
pub struct JavaScriptFactory {
    dialect: Dialect,
}

impl JavaScriptFactory {
    pub fn javascript() -> Self {
        Self {
            dialect: Dialect::JavaScript,
        }
    }

    pub fn typescript() -> Self {
        Self {
            dialect: Dialect::TypeScript,
        }
    }
}

impl LanguageFactory for JavaScriptFactory {
    fn language_id(&self) -> &str {
        self.dialect.id()
    }

    fn create(&self, settings: &LanguageSettings) -> LanguageResult<Box<dyn LanguageSupport>> {
        Ok(Box::new(JavaScriptLanguage::from_settings(
            self.dialect,
            settings,
        )?))
    }

    fn clone_box(&self) -> Box<dyn LanguageFactory> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMONJS: &str = r#"
const path = require('path');

function add(a, b) {
  return a + b;
}

const multiply = (a, b) => a * b;

function internal() {}

class Calculator {
  constructor() {
    this.total = 0;
  }

  divide(a, b) {
    return a / b;
  }

  static create() {
    return new Calculator();
  }

  #secret() {}

  get value() {
    return this.total;
  }
}

module.exports = { add, multiply, Calculator };
"#;

    #[test]
    fn test_commonjs_exports() {
        let plugin = JavaScriptLanguage::javascript();
        let scan = plugin.scan(COMMONJS, None).unwrap();
        let names: Vec<&str> = scan.testable().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["add", "multiply", "Calculator"]);
        assert!(!scan.esm);
    }

    #[test]
    fn test_jest_commonjs_stub() {
        let plugin = JavaScriptLanguage::javascript();
        let stub = plugin
            .generate_test_for(&SourceFile::new("src/calc.js", COMMONJS))
            .unwrap();

        assert!(stub.starts_with("const { add, multiply, Calculator } = require('./calc');\n"));
        assert!(stub.contains("describe('add', () => {\n  test('is defined', () => {\n    expect(add).toBeDefined();\n  });\n});\n"));
        assert!(stub.contains("expect(Calculator.prototype.divide).toBeDefined();"));
        assert!(stub.contains("expect(Calculator.create).toBeDefined();"));
        assert!(!stub.contains("internal"));
        assert!(!stub.contains("secret"));
        assert!(!stub.contains("value"));
        assert!(!stub.contains("constructor"));
    }

    #[test]
    fn test_esm_default_and_named() {
        let source = "export default function main() {}\nexport const helper = () => 1;\nfunction hidden() {}\n";
        let plugin = JavaScriptLanguage::new(Dialect::JavaScript, JsFramework::Vitest);
        let stub = plugin
            .generate_test_for(&SourceFile::new("app.mjs", source))
            .unwrap();

        assert!(stub.starts_with(
            "import { describe, test, expect } from 'vitest';\nimport main, { helper } from './app.mjs';\n"
        ));
        assert!(!stub.contains("hidden"));
    }

    #[test]
    fn test_export_clause_uses_alias() {
        let source = "function internal() { return 1; }\nclass Impl { run() {} }\nexport { internal as publicName, Impl as Runner };\n";
        let stub = JavaScriptLanguage::javascript()
            .generate_test_for(&SourceFile::new("lib.js", source))
            .unwrap();

        assert!(stub.contains("import { publicName, Runner } from './lib';"));
        assert!(stub.contains("expect(publicName).toBeDefined();"));
        assert!(stub.contains("expect(Runner.prototype.run).toBeDefined();"));
        assert!(!stub.contains("internal"));
        assert!(!stub.contains("Impl"));
    }

    #[test]
    fn test_export_clause_default_alias() {
        let source = "function main() {}\nfunction helper() {}\nexport { main as default, helper };\n";
        let stub = JavaScriptLanguage::javascript()
            .generate_test_for(&SourceFile::new("app.js", source))
            .unwrap();
        assert!(stub.contains("import main, { helper } from './app';"));
    }

    #[test]
    fn test_module_exports_single_value() {
        let source = "class Store {\n  fetch(key) { return key; }\n}\nmodule.exports = Store;\n";
        let stub = JavaScriptLanguage::javascript()
            .generate_test_for(&SourceFile::new("store.js", source))
            .unwrap();
        assert!(stub.starts_with("const Store = require('./store');\n"));
        assert!(stub.contains("expect(Store.prototype.fetch).toBeDefined();"));
    }

    #[test]
    fn test_typescript_stub_without_path() {
        let source = r#"
export interface Shape { area(): number }

export function area<T extends Shape>(shape: T): number {
  return shape.area();
}

export class Circle implements Shape {
  constructor(private radius: number) {}

  public area(): number {
    return Math.PI * this.radius ** 2;
  }

  private scale(): void {}
}
"#;
        let stub = JavaScriptLanguage::typescript().generate_test(source).unwrap();
        assert!(stub.starts_with("// import { area, Circle } from '<module under test>';\n"));
        assert!(stub.contains("expect(Circle.prototype.area).toBeDefined();"));
        assert!(!stub.contains("scale"));
        assert!(!stub.contains("Shape"));
    }

    #[test]
    fn test_tsx_falls_back_to_tsx_grammar() {
        let source = "export const Button = () => <button>ok</button>;\n";
        let plugin = JavaScriptLanguage::typescript();
        let symbols = plugin.extract_symbols(source).unwrap();
        assert_eq!(symbols[0].name, "Button");
        assert!(plugin
            .generate_test_for(&SourceFile::new("Button.tsx", source))
            .unwrap()
            .contains("import { Button } from './Button';"));
    }

    #[test]
    fn test_placeholder_stub() {
        let stub = JavaScriptLanguage::javascript()
            .generate_test("console.log('hi');\n")
            .unwrap();
        assert_eq!(
            stub,
            "describe('module', () => {\n  test('placeholder', () => {\n    expect(true).toBe(true);\n  });\n});\n"
        );
    }

    #[test]
    fn test_mirror_layout_specifier() {
        let settings = LanguageSettings {
            layout: TestLayout::Mirror,
            ..LanguageSettings::default()
        };
        let plugin = JavaScriptLanguage::from_settings(Dialect::JavaScript, &settings).unwrap();
        let source = SourceFile::new("src/lib/math.js", "export function sum(a, b) { return a + b; }\n");

        assert_eq!(
            plugin.test_file_path(&source.path).unwrap(),
            PathBuf::from("__tests__/lib/math.test.js")
        );
        assert!(plugin
            .generate_test_for(&source)
            .unwrap()
            .contains("import { sum } from '../../src/lib/math';"));
    }

    #[test]
    fn test_declaration_files_are_not_sources() {
        let plugin = JavaScriptLanguage::typescript();
        assert!(!plugin.is_source_file(Path::new("types/index.d.ts")));
        assert!(!plugin.is_test_file(Path::new("types/index.d.ts")));
        assert!(matches!(
            plugin.test_file_path(Path::new("types/index.d.ts")),
            Err(LanguageError::NotASourceFile { .. })
        ));
    }
}
