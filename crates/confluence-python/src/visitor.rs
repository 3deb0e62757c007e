//! Node helpers shared by the signature and import extractors
//!
//! All helpers are read-only views over tree-sitter nodes plus the original
//! source text.

use confluence_parser_api::node_text;
use tree_sitter::Node;

/// Cleaned docstring of a `block` or `module`: the first statement, when it
/// is a bare string literal
pub fn extract_docstring(body: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;

    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let literal = first.named_child(0)?;
    if literal.kind() != "string" {
        return None;
    }
    clean_docstring(node_text(literal, source))
}

/// Strip string prefixes and quotes, then trim. Empty docstrings are `None`.
pub fn clean_docstring(raw: &str) -> Option<String> {
    let text = raw
        .trim()
        .trim_start_matches(|c: char| matches!(c.to_ascii_lowercase(), 'r' | 'u' | 'b' | 'f'));

    let inner = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|quote| {
            text.strip_prefix(quote)
                .map(|rest| rest.strip_suffix(quote).unwrap_or(rest))
        })
        .unwrap_or(text);

    let inner = inner.trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

/// Decorators of a `decorated_definition`, verbatim
pub fn extract_decorators(decorated: Node<'_>, source: &str) -> Vec<String> {
    let mut cursor = decorated.walk();
    decorated
        .children(&mut cursor)
        .filter(|child| child.kind() == "decorator")
        .map(|child| node_text(child, source).trim().to_string())
        .collect()
}

/// Declaration header: from the start of `outer` (the decorated node when
/// there is one) through the `:` that opens the body of `definition`
pub fn header_text(outer: Node<'_>, definition: Node<'_>, source: &str) -> String {
    let end = match definition.child_by_field_name("body") {
        Some(body) => {
            let mut cursor = definition.walk();
            let colon = definition
                .children(&mut cursor)
                .filter(|child| child.kind() == ":" && child.end_byte() <= body.start_byte())
                .last();
            colon.map_or(body.start_byte(), |c| c.end_byte())
        }
        None => definition.end_byte(),
    };

    source
        .get(outer.start_byte()..end)
        .unwrap_or_default()
        .trim_end()
        .to_string()
}

/// Parameter names in declaration order (`self`, `x`, `*args`, `**kwargs`)
pub fn parameter_names(parameters: Node<'_>, source: &str) -> Vec<String> {
    let mut cursor = parameters.walk();
    parameters
        .named_children(&mut cursor)
        .filter_map(|param| match param.kind() {
            "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                Some(node_text(param, source).to_string())
            }
            "typed_parameter" => param
                .named_child(0)
                .map(|name| node_text(name, source).to_string()),
            "default_parameter" | "typed_default_parameter" => param
                .child_by_field_name("name")
                .map(|name| node_text(name, source).to_string()),
            _ => None,
        })
        .collect()
}

/// First parameter, when it is a plain name (the receiver of a method)
pub fn receiver_name(parameters: &[String]) -> Option<&str> {
    parameters
        .first()
        .map(String::as_str)
        .filter(|p| !p.starts_with('*'))
}

/// Whether a `function_definition` is `async def`
pub fn is_async(definition: Node<'_>) -> bool {
    definition
        .child(0)
        .is_some_and(|first| first.kind() == "async")
}

/// Positional base classes of a `class_definition` (keyword arguments such as
/// `metaclass=` are not bases)
pub fn base_classes(definition: Node<'_>, source: &str) -> Vec<String> {
    let Some(superclasses) = definition.child_by_field_name("superclasses") else {
        return Vec::new();
    };
    let mut cursor = superclasses.walk();
    superclasses
        .named_children(&mut cursor)
        .filter(|arg| {
            !matches!(
                arg.kind(),
                "keyword_argument" | "comment" | "dictionary_splat" | "list_splat"
            )
        })
        .map(|arg| strip_whitespace(node_text(arg, source)))
        .collect()
}

/// Dotted name of a call's callee, whitespace removed
pub fn callee_name(call: Node<'_>, source: &str) -> Option<String> {
    call.child_by_field_name("function")
        .map(|function| strip_whitespace(node_text(function, source)))
        .filter(|name| !name.is_empty())
}

/// Targets of an assignment, following chains (`a = b = 1`) and unpacking
/// patterns (`self.a, self.b = ...`)
pub fn assignment_targets<'t>(assignment: Node<'t>) -> Vec<Node<'t>> {
    let mut targets = Vec::new();
    let mut current = Some(assignment);

    while let Some(node) = current.filter(|n| n.kind() == "assignment") {
        if let Some(left) = node.child_by_field_name("left") {
            match left.kind() {
                "pattern_list" | "tuple_pattern" | "list_pattern" => {
                    let mut cursor = left.walk();
                    targets.extend(left.named_children(&mut cursor));
                }
                _ => targets.push(left),
            }
        }
        current = node.child_by_field_name("right");
    }

    targets
}

/// Whether an assignment is the right-hand side of another (`b = 1` in `a = b = 1`)
pub fn is_chained_assignment(assignment: Node<'_>) -> bool {
    assignment
        .parent()
        .is_some_and(|parent| parent.kind() == "assignment")
}

/// `Some(object)` when `target` is `object.attr` with a plain-name object
pub fn attribute_receiver<'s>(target: Node<'_>, source: &'s str) -> Option<&'s str> {
    if target.kind() != "attribute" {
        return None;
    }
    let object = target.child_by_field_name("object")?;
    (object.kind() == "identifier").then(|| node_text(object, source))
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
