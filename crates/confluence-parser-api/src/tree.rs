//! Tree Builder: turns raw source text into an immutable concrete syntax tree
//!
//! Downstream extractors only ever see [`ParseTree::root_node`] and the
//! read-only helpers in this module. Capture-style lookups are normalized into
//! a single shape, a `Vec<Node>` in document order, so extractor code never
//! depends on how a query API groups its results.

use crate::errors::{ParserError, ParserResult};
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

/// Kind of a recoverable syntax problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Region the grammar could not match
    Error,
    /// Token the parser inserted to recover
    Missing,
}

/// Non-fatal syntax diagnostic (1-based line, 0-based column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxDiagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parsed, read-only syntax tree for one source file
#[derive(Debug, Clone)]
pub struct ParseTree {
    tree: Tree,
    language: Language,
    diagnostics: Vec<SyntaxDiagnostic>,
}

impl ParseTree {
    /// Root node of the tree
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Language the tree was built for
    pub fn language(&self) -> Language {
        self.language
    }

    /// Syntax problems the parser recovered from
    pub fn diagnostics(&self) -> &[SyntaxDiagnostic] {
        &self.diagnostics
    }

    /// Whether the tree contains any recovered syntax error
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Builds [`ParseTree`]s for one language
///
/// A fresh `tree_sitter::Parser` is created per call, so a builder can be
/// shared freely between worker threads.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    language: Language,
    grammar: tree_sitter::Language,
    strict: bool,
}

impl TreeBuilder {
    pub fn new(language: Language, grammar: tree_sitter::Language) -> Self {
        Self {
            language,
            grammar,
            strict: false,
        }
    }

    /// Fail on the first syntax error instead of recovering
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Parse `source` into a tree
    ///
    /// # Errors
    /// - `UnsupportedLanguage` when the grammar cannot be loaded
    /// - `ParseError` when the parser yields no tree
    /// - `SyntaxError` in strict mode, or when nothing in a non-empty file
    ///   could be recovered
    pub fn build(&self, source: &str, file_path: &Path) -> ParserResult<ParseTree> {
        let mut parser = Parser::new();
        parser.set_language(&self.grammar).map_err(|e| {
            ParserError::UnsupportedLanguage(file_path.to_path_buf(), e.to_string())
        })?;

        let tree = parser.parse(source, None).ok_or_else(|| {
            ParserError::ParseError(file_path.to_path_buf(), "parser produced no tree".to_string())
        })?;

        let root = tree.root_node();
        let diagnostics = collect_diagnostics(root);

        if let Some(first) = diagnostics.first() {
            if self.strict {
                return Err(ParserError::SyntaxError(
                    file_path.to_path_buf(),
                    first.line,
                    first.column,
                    first.message.clone(),
                ));
            }
            if !source.trim().is_empty() && !has_recoverable_construct(root) {
                return Err(ParserError::SyntaxError(
                    file_path.to_path_buf(),
                    first.line,
                    first.column,
                    "no recoverable construct in source".to_string(),
                ));
            }
            debug!(
                file = %file_path.display(),
                errors = diagnostics.len(),
                "Recovered from syntax errors"
            );
        }

        Ok(ParseTree {
            tree,
            language: self.language,
            diagnostics,
        })
    }
}

/// Pre-order walk driven by a cursor rather than recursion.
///
/// `visit` returns whether the walk should descend into the node's children.
pub fn walk_preorder<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>) -> bool) {
    let mut cursor = root.walk();
    let mut descend = visit(cursor.node());

    loop {
        if descend && cursor.goto_first_child() {
            descend = visit(cursor.node());
            continue;
        }

        loop {
            if cursor.node() == root {
                return;
            }
            if cursor.goto_next_sibling() {
                descend = visit(cursor.node());
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// All nodes of the given kinds under `root`, in document order.
///
/// Error regions are not searched.
pub fn capture_nodes<'t>(root: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut captured = Vec::new();
    walk_preorder(root, |node| {
        if node.is_error() {
            return false;
        }
        if kinds.contains(&node.kind()) {
            captured.push(node);
        }
        true
    });
    captured
}

/// Source text covered by a node
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// 1-based (start, end) lines of a node
pub fn line_span(node: Node<'_>) -> (usize, usize) {
    (node.start_position().row + 1, node.end_position().row + 1)
}

fn collect_diagnostics(root: Node<'_>) -> Vec<SyntaxDiagnostic> {
    let mut diagnostics = Vec::new();
    walk_preorder(root, |node| {
        let position = node.start_position();
        if node.is_error() {
            diagnostics.push(SyntaxDiagnostic {
                kind: DiagnosticKind::Error,
                line: position.row + 1,
                column: position.column,
                message: "unparsable region".to_string(),
            });
            return false;
        }
        if node.is_missing() {
            diagnostics.push(SyntaxDiagnostic {
                kind: DiagnosticKind::Missing,
                line: position.row + 1,
                column: position.column,
                message: format!("missing `{}`", node.kind()),
            });
            return false;
        }
        node.has_error()
    });
    diagnostics
}

fn has_recoverable_construct(root: Node<'_>) -> bool {
    if root.is_error() {
        return false;
    }
    let mut cursor = root.walk();
    let recoverable = root
        .named_children(&mut cursor)
        .any(|child| !child.is_error() && child.kind() != "comment");
    recoverable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python_builder() -> TreeBuilder {
        TreeBuilder::new(Language::Python, tree_sitter_python::language())
    }

    #[test]
    fn test_build_clean_source() {
        let source = "import os\n\ndef f():\n    return os.getcwd()\n";
        let tree = python_builder().build(source, Path::new("clean.py")).unwrap();
        assert_eq!(tree.root_node().kind(), "module");
        assert_eq!(tree.language(), Language::Python);
        assert!(!tree.has_errors());
    }

    #[test]
    fn test_recovers_from_broken_construct() {
        let source = "def ok():\n    pass\n\ndef broken(:\n    pass\n\nx = 1\n";
        let tree = python_builder().build(source, Path::new("broken.py")).unwrap();
        assert!(tree.has_errors());
        assert!(tree.diagnostics().iter().all(|d| d.line >= 1));
    }

    #[test]
    fn test_strict_mode_rejects_errors() {
        let source = "def broken(:\n    pass\n";
        let result = python_builder()
            .strict(true)
            .build(source, Path::new("broken.py"));
        assert!(matches!(result, Err(ParserError::SyntaxError(..))));
    }

    #[test]
    fn test_empty_source_is_not_an_error() {
        let tree = python_builder().build("", Path::new("empty.py")).unwrap();
        assert!(!tree.has_errors());
    }

    #[test]
    fn test_capture_nodes_in_document_order() {
        let source = "a = 1\ndef f():\n    b = 2\n    def g():\n        c = 3\nd = 4\n";
        let tree = python_builder().build(source, Path::new("order.py")).unwrap();
        let assignments = capture_nodes(tree.root_node(), &["assignment"]);
        let texts: Vec<&str> = assignments.iter().map(|n| node_text(*n, source)).collect();
        assert_eq!(texts, vec!["a = 1", "b = 2", "c = 3", "d = 4"]);
    }

    #[test]
    fn test_walk_preorder_can_prune() {
        let source = "def f():\n    x = 1\ny = 2\n";
        let tree = python_builder().build(source, Path::new("prune.py")).unwrap();
        let mut seen = Vec::new();
        walk_preorder(tree.root_node(), |node| {
            if node.kind() == "assignment" {
                seen.push(node_text(node, source).to_string());
            }
            node.kind() != "function_definition"
        });
        assert_eq!(seen, vec!["y = 2".to_string()]);
    }

    #[test]
    fn test_line_span_is_one_based() {
        let source = "\n\nclass A:\n    pass\n";
        let tree = python_builder().build(source, Path::new("span.py")).unwrap();
        let classes = capture_nodes(tree.root_node(), &["class_definition"]);
        assert_eq!(line_span(classes[0]), (3, 4));
    }
}
