//! Import statement extraction
//!
//! Produces one [`RawImportStatement`] per module in `import a, b` and one
//! per `from` statement. Classification happens later, in the strategy.

use confluence_parser_api::{capture_nodes, node_text, ImportedName, RawImportStatement};
use tree_sitter::Node;

const IMPORT_KINDS: &[&str] = &[
    "import_statement",
    "import_from_statement",
    "future_import_statement",
];

/// All import statements of a module, in source order
pub fn extract_imports(root: Node<'_>, source: &str) -> Vec<RawImportStatement> {
    let mut imports = Vec::new();

    for node in capture_nodes(root, IMPORT_KINDS) {
        let line = node.start_position().row + 1;
        match node.kind() {
            "import_statement" => {
                for name in imported_names(node, source, true) {
                    let module = name.original_name.clone();
                    imports.push(RawImportStatement::new(module, line).with_names(vec![name]));
                }
            }
            "import_from_statement" => {
                let Some(module) = node.child_by_field_name("module_name") else {
                    continue;
                };
                let (module_path, level) = module_source(module, source);
                let names = if has_wildcard(node) {
                    vec![ImportedName::new("*")]
                } else {
                    imported_names(node, source, false)
                };
                imports.push(
                    RawImportStatement::new(module_path, line)
                        .with_names(names)
                        .relative(level),
                );
            }
            "future_import_statement" => {
                let names = imported_names(node, source, false);
                imports.push(RawImportStatement::new("__future__", line).with_names(names));
            }
            _ => {}
        }
    }

    imports
}

/// Module path and relative level of a `from` clause (`..pkg.models` -> `pkg.models`, 2)
fn module_source(module: Node<'_>, source: &str) -> (String, usize) {
    if module.kind() != "relative_import" {
        return (strip_whitespace(node_text(module, source)), 0);
    }

    let mut level = 0;
    let mut path = String::new();
    let mut cursor = module.walk();
    for child in module.children(&mut cursor) {
        match child.kind() {
            "import_prefix" => level = node_text(child, source).matches('.').count(),
            "dotted_name" => path = strip_whitespace(node_text(child, source)),
            _ => {}
        }
    }
    (path, level)
}

fn imported_names(statement: Node<'_>, source: &str, is_module: bool) -> Vec<ImportedName> {
    let mut cursor = statement.walk();
    let nodes: Vec<Node<'_>> = statement.children_by_field_name("name", &mut cursor).collect();

    nodes
        .into_iter()
        .filter_map(|node| {
            let (name, alias) = match node.kind() {
                "aliased_import" => (
                    node.child_by_field_name("name")?,
                    node.child_by_field_name("alias"),
                ),
                _ => (node, None),
            };
            let original = strip_whitespace(node_text(name, source));
            let imported = if is_module {
                ImportedName::module(original)
            } else {
                ImportedName::new(original)
            };
            Some(match alias {
                Some(alias) => imported.with_alias(node_text(alias, source)),
                None => imported,
            })
        })
        .collect()
}

fn has_wildcard(statement: Node<'_>) -> bool {
    let mut cursor = statement.walk();
    let found = statement
        .children(&mut cursor)
        .any(|child| child.kind() == "wildcard_import");
    found
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use confluence_parser_api::{Language, TreeBuilder};
    use std::path::Path;

    fn imports_of(source: &str) -> Vec<RawImportStatement> {
        let tree = TreeBuilder::new(Language::Python, tree_sitter_python::language())
            .build(source, Path::new("t.py"))
            .unwrap();
        extract_imports(tree.root_node(), source)
    }

    #[test]
    fn test_plain_imports_split_per_module() {
        let imports = imports_of("import os, numpy as np\nimport os.path\n");
        assert_eq!(imports.len(), 3);
        assert_eq!(imports[0].source, "os");
        assert_eq!(imports[1].source, "numpy");
        assert_eq!(imports[1].names[0].alias.as_deref(), Some("np"));
        assert!(imports[1].names[0].is_module);
        assert_eq!(imports[2].source, "os.path");
        assert_eq!(imports[2].line, 2);
    }

    #[test]
    fn test_from_import_names_and_aliases() {
        let imports = imports_of("from typing import (\n    List,\n    Dict as D,\n)\n");
        assert_eq!(imports.len(), 1);
        let names: Vec<&str> = imports[0].names.iter().map(|n| n.usage_name()).collect();
        assert_eq!(names, vec!["List", "D"]);
        assert!(!imports[0].names[0].is_module);
    }

    #[test]
    fn test_relative_and_wildcard_imports() {
        let imports = imports_of("from . import sibling\nfrom ..pkg.models import *\n");
        assert_eq!(imports[0].source, "");
        assert_eq!(imports[0].relative_level, 1);
        assert_eq!(imports[0].names[0].original_name, "sibling");

        assert_eq!(imports[1].source, "pkg.models");
        assert_eq!(imports[1].relative_level, 2);
        assert!(imports[1].names[0].is_wildcard());
    }

    #[test]
    fn test_future_import() {
        let imports = imports_of("from __future__ import annotations\n");
        assert_eq!(imports[0].source, "__future__");
        assert_eq!(imports[0].names[0].original_name, "annotations");
    }

    #[test]
    fn test_imports_inside_functions_are_collected() {
        let imports = imports_of("def f():\n    import json\n    return json\n");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].line, 2);
    }
}
