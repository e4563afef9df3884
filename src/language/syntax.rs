//! Tree-sitter helpers shared by the language plugins

use tree_sitter::{Language, Node, Parser, Tree};
use ugen_language::{LanguageError, LanguageResult};

/// Parse source content, failing on the first syntax error
pub fn parse(language: &Language, language_id: &str, content: &str) -> LanguageResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(language)
        .map_err(|e| LanguageError::Grammar(format!("{language_id}: {e}")))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| LanguageError::Grammar(format!("{language_id}: parser returned no tree")))?;

    let root = tree.root_node();
    if root.has_error() {
        let (line, column) = first_error(root)
            .map(|node| {
                let position = node.start_position();
                (position.row + 1, position.column + 1)
            })
            .unwrap_or((1, 1));
        return Err(LanguageError::Unparseable {
            language: language_id.to_string(),
            line,
            column,
        });
    }

    Ok(tree)
}

/// First `ERROR` or missing node in document order
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

/// Source text of a node
pub fn text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

/// Source text of a named field
pub fn field_text<'a>(node: Node<'_>, field: &str, source: &'a str) -> Option<&'a str> {
    node.child_by_field_name(field).map(|child| text(child, source))
}

/// 1-based line of a node
pub fn line(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Named children of a node
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Whether any direct child has the given kind
pub fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == kind);
    found
}

/// First direct child of the given kind
pub fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> Language {
        tree_sitter_python::LANGUAGE.into()
    }

    #[test]
    fn test_parse_valid() {
        let source = "def add(a, b):\n    return a + b\n";
        let tree = parse(&python(), "python", source).unwrap();
        let root = tree.root_node();
        let function = named_children(root)[0];
        assert_eq!(function.kind(), "function_definition");
        assert_eq!(field_text(function, "name", source), Some("add"));
        assert_eq!(line(function), 1);
    }

    #[test]
    fn test_parse_reports_error_position() {
        let source = "def ok():\n    pass\n\ndef broken(:\n    pass\n";
        match parse(&python(), "python", source) {
            Err(LanguageError::Unparseable { language, line, .. }) => {
                assert_eq!(language, "python");
                assert_eq!(line, 4);
            }
            other => panic!("expected Unparseable, got {other:?}"),
        }
    }
}
