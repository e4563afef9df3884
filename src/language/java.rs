//! Java language plugin (JUnit 5)

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tree_sitter::Node;
use ugen_language::paths::{self, has_extension};
use ugen_language::stub::pascal_case;
use ugen_language::traits::{append_block, LanguageFactory, LanguageSupport};
use ugen_language::{
    LanguageError, LanguageMetadata, LanguageResult, LanguageSettings, SourceFile, StubWriter,
    Symbol, SymbolKind,
};

use super::syntax;
use super::{extensions_with, Grouped};

const ID: &str = "java";
const FRAMEWORK: &str = "junit5";

/// Java plugin
#[derive(Debug, Clone)]
pub struct JavaLanguage {
    extensions: Vec<String>,
}

impl Default for JavaLanguage {
    fn default() -> Self {
        Self {
            extensions: vec!["java".to_string()],
        }
    }
}

struct JavaFile {
    package: Option<String>,
    symbols: Vec<Symbol>,
}

/// Hands out test method names that are unique within one test class
#[derive(Default)]
struct MethodNames {
    taken: HashSet<String>,
}

impl MethodNames {
    fn claim(&mut self, preferred: String, fallback: String) -> String {
        if self.taken.insert(preferred.clone()) {
            return preferred;
        }
        if self.taken.insert(fallback.clone()) {
            return fallback;
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{fallback}{suffix}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl JavaLanguage {
    pub fn from_settings(settings: &LanguageSettings) -> LanguageResult<Self> {
        if let Some(framework) = &settings.framework {
            if !matches!(framework.to_ascii_lowercase().as_str(), "junit5" | "junit") {
                return Err(LanguageError::UnsupportedFramework {
                    language: ID.to_string(),
                    framework: framework.clone(),
                });
            }
        }
        Ok(Self {
            extensions: extensions_with(&["java"], &settings.extra_extensions),
        })
    }

    fn has_modifier(node: Node<'_>, modifier: &str) -> bool {
        syntax::child_of_kind(node, "modifiers")
            .map(|modifiers| syntax::has_child_kind(modifiers, modifier))
            .unwrap_or(false)
    }

    fn scan(&self, content: &str) -> LanguageResult<JavaFile> {
        let tree = syntax::parse(&tree_sitter_java::LANGUAGE.into(), ID, content)?;
        let mut file = JavaFile {
            package: None,
            symbols: Vec::new(),
        };

        for node in syntax::named_children(tree.root_node()) {
            match node.kind() {
                "package_declaration" => {
                    file.package = syntax::named_children(node)
                        .into_iter()
                        .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
                        .map(|n| syntax::text(n, content).to_string());
                }
                "class_declaration" | "interface_declaration" | "enum_declaration"
                | "record_declaration" => {
                    let Some(name) = syntax::field_text(node, "name", content) else {
                        continue;
                    };
                    file.symbols
                        .push(Symbol::new(name, SymbolKind::Class, syntax::line(node)));
                    if node.kind() == "enum_declaration" {
                        continue;
                    }
                    let Some(body) = node.child_by_field_name("body") else {
                        continue;
                    };
                    for member in syntax::named_children(body) {
                        if member.kind() != "method_declaration" {
                            continue;
                        }
                        if let Some(method) = syntax::field_text(member, "name", content) {
                            file.symbols.push(
                                Symbol::method(method, name, syntax::line(member))
                                    .exported(!Self::has_modifier(member, "private")),
                            );
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(file)
    }

    fn render(&self, file: &JavaFile, test_class: &str) -> String {
        let grouped = Grouped::new(&file.symbols);
        let has_methods = grouped.classes.iter().any(|(_, methods)| !methods.is_empty());

        let mut w = StubWriter::new("    ");
        if let Some(package) = &file.package {
            w.line(format!("package {package};"));
            w.blank();
        }
        if has_methods {
            w.line("import org.junit.jupiter.api.Disabled;");
        }
        w.line("import org.junit.jupiter.api.Test;");
        if !grouped.is_empty() {
            w.blank();
            w.line("import static org.junit.jupiter.api.Assertions.assertNotNull;");
        }
        w.blank();

        w.line(format!("class {test_class} {{"));
        w.indent();

        if grouped.is_empty() {
            w.blank();
            w.line("@Test");
            w.block("void placeholder() {", "}", |_| {});
        }

        let mut names = MethodNames::default();
        for (class, methods) in &grouped.classes {
            let exists = names.claim(
                format!("{}Exists", lower_first(&class.name)),
                format!("{}TypeExists", lower_first(&class.name)),
            );
            w.blank();
            w.line("@Test");
            w.block(format!("void {exists}() {{"), "}", |w| {
                w.line(format!("assertNotNull({}.class);", class.name));
            });

            for method in methods {
                let test_name = names.claim(
                    format!("test{}", pascal_case(&method.name)),
                    format!("test{}{}", class.name, pascal_case(&method.name)),
                );
                w.blank();
                w.line("@Test");
                w.line("@Disabled(\"pending\")");
                w.block(format!("void {test_name}() {{"), "}", |_| {});
            }
        }

        w.dedent();
        w.line("}");
        w.finish()
    }

    /// Test class name used when only the content is known
    fn default_test_class(file: &JavaFile) -> String {
        let class = file
            .symbols
            .iter()
            .find(|s| s.kind == SymbolKind::Class)
            .map(|s| s.name.as_str())
            .unwrap_or("Generated");
        format!("{class}Test")
    }

    /// `src/main/...` becomes `src/test/...`; other directories are kept
    fn test_directory(source_path: &Path) -> PathBuf {
        let parent = source_path.parent().unwrap_or_else(|| Path::new(""));
        let components: Vec<Component> = parent.components().collect();
        let main_at = components.windows(2).position(|pair| {
            pair[0].as_os_str() == "src" && pair[1].as_os_str() == "main"
        });

        match main_at {
            Some(index) => components
                .iter()
                .enumerate()
                .map(|(i, component)| {
                    if i == index + 1 {
                        Path::new("test")
                    } else {
                        Path::new(component.as_os_str())
                    }
                })
                .collect(),
            None => parent.to_path_buf(),
        }
    }

    /// Indent code written at column zero so it sits inside the test class
    fn indent_member(code: &str) -> String {
        let first = code.lines().find(|line| !line.trim().is_empty());
        let indented = first
            .map(|line| line.starts_with(char::is_whitespace))
            .unwrap_or(true);
        if indented {
            return code.trim_end().to_string();
        }
        code.trim_end()
            .lines()
            .map(|line| {
                if line.trim().is_empty() {
                    String::new()
                } else {
                    format!("    {line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl LanguageSupport for JavaLanguage {
    fn metadata(&self) -> LanguageMetadata {
        LanguageMetadata {
            id: ID.to_string(),
            name: "Java".to_string(),
            extensions: self.extensions.clone(),
            frameworks: vec![FRAMEWORK.to_string()],
        }
    }

    fn generate_test(&self, source_content: &str) -> LanguageResult<String> {
        let file = self.scan(source_content)?;
        Ok(self.render(&file, &Self::default_test_class(&file)))
    }

    fn generate_test_for(&self, source: &SourceFile) -> LanguageResult<String> {
        self.ensure_source(&source.path)?;
        let file = self.scan(&source.content)?;
        let test_class = format!("{}Test", paths::file_stem(&source.path));
        Ok(self.render(&file, &test_class))
    }

    fn is_source_file(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions) && !self.is_test_file(path)
    }

    fn is_test_file(&self, path: &Path) -> bool {
        if !has_extension(path, &self.extensions) {
            return false;
        }
        let stem = paths::file_stem(path);
        stem.ends_with("Test")
            || stem.ends_with("Tests")
            || stem.ends_with("IT")
            || stem.starts_with("Test")
            || paths::has_dir_sequence(path, &["src", "test"])
    }

    fn test_file_path(&self, source_path: &Path) -> LanguageResult<PathBuf> {
        self.ensure_source(source_path)?;
        let extension = source_path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "java".to_string());
        let file_name = format!("{}Test.{extension}", paths::file_stem(source_path));
        Ok(Self::test_directory(source_path).join(file_name))
    }

    fn test_framework(&self) -> &str {
        FRAMEWORK
    }

    fn extract_symbols(&self, source_content: &str) -> LanguageResult<Vec<Symbol>> {
        Ok(self.scan(source_content)?.symbols)
    }

    fn insert_test(&self, test_content: &str, test_code: &str) -> String {
        let Some(close) = test_content.rfind('}') else {
            return append_block(test_content, test_code);
        };
        let (head, tail) = test_content.split_at(close);
        let mut out = head.trim_end().to_string();
        out.push_str("\n\n");
        out.push_str(&Self::indent_member(test_code));
        out.push('\n');
        out.push_str(tail);
        out
    }

    fn clone_box(&self) -> Box<dyn LanguageSupport> {
        Box::new(self.clone())
    }
}

/// Factory for the Java plugin
#[derive(Debug, Clone, Default)]
pub struct JavaFactory;

impl LanguageFactory for JavaFactory {
    fn language_id(&self) -> &str {
        ID
    }

    fn create(&self, settings: &LanguageSettings) -> LanguageResult<Box<dyn LanguageSupport>> {
        Ok(Box::new(JavaLanguage::from_settings(settings)?))
    }

    fn clone_box(&self) -> Box<dyn LanguageFactory> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"package com.example.calc;

import java.util.List;

public class Calculator {
    private int total;

    public Calculator() {}

    public int add(int a, int b) {
        return a + b;
    }

    public double add(double a, double b) {
        return a + b;
    }

    private void reset() {
        total = 0;
    }

    static int sum(List<Integer> values) {
        return 0;
    }
}
"#;

    #[test]
    fn test_stub() {
        let source = SourceFile::new("src/main/java/com/example/calc/Calculator.java", SOURCE);
        let stub = JavaLanguage::default().generate_test_for(&source).unwrap();

        let expected = r#"package com.example.calc;

import org.junit.jupiter.api.Disabled;
import org.junit.jupiter.api.Test;

import static org.junit.jupiter.api.Assertions.assertNotNull;

class CalculatorTest {

    @Test
    void calculatorExists() {
        assertNotNull(Calculator.class);
    }

    @Test
    @Disabled("pending")
    void testAdd() {
    }

    @Test
    @Disabled("pending")
    void testCalculatorAdd() {
    }

    @Test
    @Disabled("pending")
    void testSum() {
    }
}
"#;
        assert_eq!(stub, expected);
    }

    #[test]
    fn test_placeholder_stub() {
        let stub = JavaLanguage::default().generate_test("package a;\n").unwrap();
        assert_eq!(
            stub,
            "package a;\n\nimport org.junit.jupiter.api.Test;\n\nclass GeneratedTest {\n\n    @Test\n    void placeholder() {\n    }\n}\n"
        );
    }

    #[test]
    fn test_maven_layout() {
        let plugin = JavaLanguage::default();
        let source = Path::new("src/main/java/com/example/Calculator.java");
        let test = plugin.test_file_path(source).unwrap();
        assert_eq!(
            test,
            PathBuf::from("src/test/java/com/example/CalculatorTest.java")
        );
        assert!(plugin.is_test_file(&test));
        assert!(!plugin.is_source_file(&test));
        assert_eq!(
            plugin.test_file_path(Path::new("lib/Util.java")).unwrap(),
            PathBuf::from("lib/UtilTest.java")
        );
    }

    #[test]
    fn test_classification() {
        let plugin = JavaLanguage::default();
        assert!(plugin.is_test_file(Path::new("CalculatorTests.java")));
        assert!(plugin.is_test_file(Path::new("CalculatorIT.java")));
        assert!(plugin.is_test_file(Path::new("TestCalculator.java")));
        assert!(plugin.is_test_file(Path::new("src/test/java/Helpers.java")));
        assert!(plugin.is_source_file(Path::new("src/main/java/Contest.java")));
    }

    #[test]
    fn test_insert_test_before_closing_brace() {
        let content = "class CalculatorTest {\n\n    @Test\n    void a() {\n    }\n}\n";
        let code = "@Test\nvoid b() {\n    assertEquals(2, 1 + 1);\n}\n";
        assert_eq!(
            JavaLanguage::default().insert_test(content, code),
            "class CalculatorTest {\n\n    @Test\n    void a() {\n    }\n\n    @Test\n    void b() {\n        assertEquals(2, 1 + 1);\n    }\n}\n"
        );
    }

    #[test]
    fn test_insert_imports_after_package() {
        let content = "package a;\n\nimport org.junit.jupiter.api.Test;\n";
        assert_eq!(
            JavaLanguage::default().insert_imports(content, "import java.util.List;"),
            "package a;\nimport java.util.List;\n\nimport org.junit.jupiter.api.Test;\n"
        );
    }
}
