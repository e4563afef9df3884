//! Python language plugin (pytest, unittest)

use std::path::{Path, PathBuf};
use tree_sitter::Node;
use ugen_language::paths::{self, has_extension};
use ugen_language::stub::{pascal_case, snake_case};
use ugen_language::traits::{insert_missing_lines, LanguageFactory, LanguageSupport};
use ugen_language::{
    LanguageError, LanguageMetadata, LanguageResult, LanguageSettings, SourceFile, StubWriter,
    Symbol, SymbolKind, TestLayout,
};

use super::syntax;
use super::{extensions_with, Grouped};

const ID: &str = "python";
const MAIN_GUARD: &str = "if __name__ == \"__main__\":";

/// Python test frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PythonFramework {
    Pytest,
    Unittest,
}

impl PythonFramework {
    fn parse(name: &str) -> LanguageResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pytest" => Ok(Self::Pytest),
            "unittest" => Ok(Self::Unittest),
            _ => Err(LanguageError::UnsupportedFramework {
                language: ID.to_string(),
                framework: name.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Pytest => "pytest",
            Self::Unittest => "unittest",
        }
    }
}

/// Python plugin
#[derive(Debug, Clone)]
pub struct PythonLanguage {
    framework: PythonFramework,
    layout: TestLayout,
    tests_dir: PathBuf,
    extensions: Vec<String>,
}

impl Default for PythonLanguage {
    fn default() -> Self {
        Self::new(PythonFramework::Pytest)
    }
}

impl PythonLanguage {
    pub fn new(framework: PythonFramework) -> Self {
        Self {
            framework,
            layout: TestLayout::Sibling,
            tests_dir: PathBuf::from("tests"),
            extensions: vec!["py".to_string()],
        }
    }

    pub fn from_settings(settings: &LanguageSettings) -> LanguageResult<Self> {
        let framework = match &settings.framework {
            Some(name) => PythonFramework::parse(name)?,
            None => PythonFramework::Pytest,
        };
        Ok(Self {
            framework,
            layout: settings.layout,
            tests_dir: settings
                .tests_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("tests")),
            extensions: extensions_with(&["py"], &settings.extra_extensions),
        })
    }

    fn module_path(&self, source_path: &Path) -> String {
        match self.layout {
            TestLayout::Sibling => paths::file_stem(source_path),
            TestLayout::Mirror => paths::module_components(source_path).join("."),
        }
    }

    fn render(&self, symbols: &[Symbol], module: Option<&str>) -> String {
        let grouped = Grouped::new(symbols);
        let mut imported: Vec<&str> = grouped.functions.iter().map(|f| f.name.as_str()).collect();
        imported.extend(grouped.classes.iter().map(|(class, _)| class.name.as_str()));

        let mut w = StubWriter::new("    ");
        match self.framework {
            PythonFramework::Pytest => w.line("import pytest"),
            PythonFramework::Unittest => w.line("import unittest"),
        };
        if !imported.is_empty() {
            let names = imported.join(", ");
            match module {
                Some(module) => w.line(format!("from {module} import {names}")),
                None => w.line(format!("# from <module under test> import {names}")),
            };
        }

        match self.framework {
            PythonFramework::Pytest => self.render_pytest(&mut w, &grouped),
            PythonFramework::Unittest => self.render_unittest(&mut w, &grouped),
        }
        w.finish()
    }

    fn render_pytest(&self, w: &mut StubWriter, grouped: &Grouped<'_>) {
        if grouped.is_empty() {
            w.blank().blank();
            w.line("def test_placeholder():");
            w.indent().line("assert True").dedent();
            return;
        }

        for function in &grouped.functions {
            w.blank().blank();
            w.line(format!("def test_{}():", snake_case(&function.name)));
            w.indent();
            w.line(format!("assert callable({})", function.name));
            w.dedent();
        }

        for (class, methods) in &grouped.classes {
            w.blank().blank();
            w.line(format!("class Test{}:", pascal_case(&class.name)));
            w.indent();
            w.line(format!("def test_{}_exists(self):", snake_case(&class.name)));
            w.indent().line(format!("assert callable({})", class.name)).dedent();
            for method in methods {
                w.blank();
                w.line(format!("def test_{}(self):", snake_case(&method.name)));
                w.indent()
                    .line(format!("assert hasattr({}, \"{}\")", class.name, method.name))
                    .dedent();
            }
            w.dedent();
        }
    }

    fn render_unittest(&self, w: &mut StubWriter, grouped: &Grouped<'_>) {
        if grouped.is_empty() {
            w.blank().blank();
            w.line("class TestPlaceholder(unittest.TestCase):");
            w.indent();
            w.line("def test_placeholder(self):");
            w.indent().line("self.assertTrue(True)").dedent();
            w.dedent();
        }

        if !grouped.functions.is_empty() {
            w.blank().blank();
            w.line("class TestFunctions(unittest.TestCase):");
            w.indent();
            for (i, function) in grouped.functions.iter().enumerate() {
                if i > 0 {
                    w.blank();
                }
                w.line(format!("def test_{}(self):", snake_case(&function.name)));
                w.indent()
                    .line(format!("self.assertTrue(callable({}))", function.name))
                    .dedent();
            }
            w.dedent();
        }

        for (class, methods) in &grouped.classes {
            w.blank().blank();
            w.line(format!("class Test{}(unittest.TestCase):", pascal_case(&class.name)));
            w.indent();
            w.line(format!("def test_{}_exists(self):", snake_case(&class.name)));
            w.indent()
                .line(format!("self.assertTrue(callable({}))", class.name))
                .dedent();
            for method in methods {
                w.blank();
                w.line(format!("def test_{}(self):", snake_case(&method.name)));
                w.indent()
                    .line(format!(
                        "self.assertTrue(hasattr({}, \"{}\"))",
                        class.name, method.name
                    ))
                    .dedent();
            }
            w.dedent();
        }

        w.blank().blank();
        w.line(MAIN_GUARD);
        w.indent().line("unittest.main()").dedent();
    }

    fn definition<'t>(node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "function_definition" | "class_definition" => Some(node),
            "decorated_definition" => node.child_by_field_name("definition"),
            _ => None,
        }
    }

    fn is_public(name: &str) -> bool {
        !name.starts_with('_')
    }
}

impl LanguageSupport for PythonLanguage {
    fn metadata(&self) -> LanguageMetadata {
        LanguageMetadata {
            id: ID.to_string(),
            name: "Python".to_string(),
            extensions: self.extensions.clone(),
            frameworks: vec!["pytest".to_string(), "unittest".to_string()],
        }
    }

    fn generate_test(&self, source_content: &str) -> LanguageResult<String> {
        let symbols = self.extract_symbols(source_content)?;
        Ok(self.render(&symbols, None))
    }

    fn generate_test_for(&self, source: &SourceFile) -> LanguageResult<String> {
        self.ensure_source(&source.path)?;
        let symbols = self.extract_symbols(&source.content)?;
        let module = self.module_path(&source.path);
        Ok(self.render(&symbols, Some(&module)))
    }

    fn is_source_file(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions) && !self.is_test_file(path)
    }

    fn is_test_file(&self, path: &Path) -> bool {
        if !has_extension(path, &self.extensions) {
            return false;
        }
        let name = paths::file_name(path);
        let stem = paths::file_stem(path);
        name.starts_with("test_") || stem.ends_with("_test") || stem == "conftest"
    }

    fn test_file_path(&self, source_path: &Path) -> LanguageResult<PathBuf> {
        self.ensure_source(source_path)?;
        let extension = source_path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "py".to_string());
        let file_name = format!("test_{}.{extension}", paths::file_stem(source_path));

        Ok(match self.layout {
            TestLayout::Sibling => source_path.with_file_name(file_name),
            TestLayout::Mirror => paths::mirror_path(source_path, &self.tests_dir, &file_name),
        })
    }

    fn test_framework(&self) -> &str {
        self.framework.name()
    }

    fn extract_symbols(&self, source_content: &str) -> LanguageResult<Vec<Symbol>> {
        let tree = syntax::parse(&tree_sitter_python::LANGUAGE.into(), ID, source_content)?;
        let mut symbols = Vec::new();

        for node in syntax::named_children(tree.root_node()) {
            let Some(definition) = Self::definition(node) else {
                continue;
            };
            let Some(name) = syntax::field_text(definition, "name", source_content) else {
                continue;
            };

            if definition.kind() == "function_definition" {
                symbols.push(
                    Symbol::new(name, SymbolKind::Function, syntax::line(definition))
                        .exported(Self::is_public(name)),
                );
                continue;
            }

            let class_public = Self::is_public(name);
            symbols.push(
                Symbol::new(name, SymbolKind::Class, syntax::line(definition))
                    .exported(class_public),
            );

            let Some(body) = definition.child_by_field_name("body") else {
                continue;
            };
            for member in syntax::named_children(body) {
                let Some(method) = Self::definition(member) else {
                    continue;
                };
                if method.kind() != "function_definition" {
                    continue;
                }
                if let Some(method_name) = syntax::field_text(method, "name", source_content) {
                    symbols.push(
                        Symbol::method(method_name, name, syntax::line(method))
                            .exported(class_public && Self::is_public(method_name)),
                    );
                }
            }
        }

        Ok(symbols)
    }

    fn insert_imports(&self, test_content: &str, imports: &str) -> String {
        insert_missing_lines(test_content, imports, |line| {
            line.starts_with("#!") || line.starts_with("# -*-") || line.starts_with("from __future__")
        })
    }

    fn insert_test(&self, test_content: &str, test_code: &str) -> String {
        match test_content.find(MAIN_GUARD) {
            Some(index) => {
                let (head, tail) = test_content.split_at(index);
                let mut out = head.trim_end().to_string();
                out.push_str("\n\n\n");
                out.push_str(test_code.trim_end());
                out.push_str("\n\n\n");
                out.push_str(tail);
                out
            }
            None => ugen_language::traits::append_block(test_content, test_code),
        }
    }

    fn clone_box(&self) -> Box<dyn LanguageSupport> {
        Box::new(self.clone())
    }
}

/// Factory for the Python plugin
#[derive(Debug, Clone, Default)]
pub struct PythonFactory;

impl LanguageFactory for PythonFactory {
    fn language_id(&self) -> &str {
        ID
    }

    fn create(&self, settings: &LanguageSettings) -> LanguageResult<Box<dyn LanguageSupport>> {
        Ok(Box::new(PythonLanguage::from_settings(settings)?))
    }

    fn clone_box(&self) -> Box<dyn LanguageFactory> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"import math


def add(a, b):
    return a + b


def _helper():
    pass


@staticmethod
def decorated(x):
    return x


class Calculator:
    def __init__(self):
        self.total = 0

    def divide(self, a, b):
        return a / b

    @property
    def value(self):
        return self.total


class _Hidden:
    def run(self):
        pass
"#;

    #[test]
    fn test_extract_symbols() {
        let symbols = PythonLanguage::default().extract_symbols(SOURCE).unwrap();
        let public: Vec<(&str, SymbolKind)> = symbols
            .iter()
            .filter(|s| s.exported)
            .map(|s| (s.name.as_str(), s.kind))
            .collect();
        assert_eq!(
            public,
            vec![
                ("add", SymbolKind::Function),
                ("decorated", SymbolKind::Function),
                ("Calculator", SymbolKind::Class),
                ("divide", SymbolKind::Method),
                ("value", SymbolKind::Method),
            ]
        );
    }

    #[test]
    fn test_pytest_stub() {
        let plugin = PythonLanguage::default();
        let source = SourceFile::new("calc.py", SOURCE);
        let stub = plugin.generate_test_for(&source).unwrap();

        assert!(stub.starts_with("import pytest\nfrom calc import add, decorated, Calculator\n"));
        assert!(stub.contains("def test_add():\n    assert callable(add)\n"));
        assert!(stub.contains("class TestCalculator:\n"));
        assert!(stub.contains("    def test_divide(self):\n        assert hasattr(Calculator, \"divide\")\n"));
        assert!(!stub.contains("_helper"));
        assert!(!stub.contains("__init__"));
        assert!(!stub.contains("Hidden"));
    }

    #[test]
    fn test_unittest_stub() {
        let plugin = PythonLanguage::new(PythonFramework::Unittest);
        let stub = plugin.generate_test(SOURCE).unwrap();

        assert!(stub.contains("# from <module under test> import add, decorated, Calculator"));
        assert!(stub.contains("class TestFunctions(unittest.TestCase):"));
        assert!(stub.contains("class TestCalculator(unittest.TestCase):"));
        assert!(stub.trim_end().ends_with("unittest.main()"));
    }

    #[test]
    fn test_placeholder_for_empty_module() {
        let stub = PythonLanguage::default().generate_test("X = 1\n").unwrap();
        assert_eq!(stub, "import pytest\n\n\ndef test_placeholder():\n    assert True\n");
    }

    #[test]
    fn test_syntax_error() {
        let err = PythonLanguage::default()
            .generate_test("def broken(:\n")
            .unwrap_err();
        assert!(matches!(err, LanguageError::Unparseable { line: 1, .. }));
    }

    #[test]
    fn test_mirror_layout_import() {
        let settings = LanguageSettings {
            layout: TestLayout::Mirror,
            ..LanguageSettings::default()
        };
        let plugin = PythonLanguage::from_settings(&settings).unwrap();
        let source = SourceFile::new("src/app/calc.py", "def add(a, b):\n    return a + b\n");

        assert_eq!(
            plugin.test_file_path(&source.path).unwrap(),
            PathBuf::from("tests/app/test_calc.py")
        );
        assert!(plugin
            .generate_test_for(&source)
            .unwrap()
            .contains("from app.calc import add"));
    }

    #[test]
    fn test_insert_test_before_main_guard() {
        let plugin = PythonLanguage::new(PythonFramework::Unittest);
        let content = "import unittest\n\n\nclass TestA(unittest.TestCase):\n    pass\n\n\nif __name__ == \"__main__\":\n    unittest.main()\n";
        let result = plugin.insert_test(content, "class TestB(unittest.TestCase):\n    pass\n");

        let b = result.find("class TestB").unwrap();
        let guard = result.find(MAIN_GUARD).unwrap();
        assert!(b < guard);
        assert!(result.ends_with("unittest.main()\n"));
    }

    #[test]
    fn test_unknown_framework() {
        let settings = LanguageSettings {
            framework: Some("nose".to_string()),
            ..LanguageSettings::default()
        };
        assert!(matches!(
            PythonFactory.create(&settings),
            Err(LanguageError::UnsupportedFramework { .. })
        ));
    }
}
