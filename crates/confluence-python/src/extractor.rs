//! Structural signature extraction for Python
//!
//! One iterative pre-order walk over the tree. Each pending node carries the
//! innermost enclosing declaration (its [`Scope`]), which decides where a
//! definition, assignment or call is recorded:
//!
//! - functions become top-level functions, methods or nested functions
//! - classes become top-level or nested classes; classes inside function
//!   bodies are left out of the outline
//! - assignments become globals, class variables or receiver attribute writes
//! - calls are recorded on the innermost function only

use crate::visitor;
use confluence_parser_api::tree::line_span;
use confluence_parser_api::{
    node_text, ClassId, ClassInfo, FunctionId, FunctionInfo, ParseTree, ParserConfig,
    StructuralSignature, VariableInfo,
};
use std::collections::BTreeSet;
use tracing::trace;
use tree_sitter::Node;

/// Innermost enclosing declaration of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Module,
    Function(FunctionId),
    Class(ClassId),
}

/// Where writes through a receiver name are recorded
#[derive(Debug, Clone)]
struct Receiver {
    name: String,
    owner: FunctionId,
}

/// Extract the structural signature of a parsed Python file
pub fn extract_signature(
    tree: &ParseTree,
    source: &str,
    config: &ParserConfig,
) -> StructuralSignature {
    SignatureExtractor::new(source, config).run(tree.root_node())
}

struct SignatureExtractor<'s> {
    source: &'s str,
    config: &'s ParserConfig,
    signature: StructuralSignature,
    /// Indexed by `FunctionId`
    receivers: Vec<Option<Receiver>>,
    seen_globals: BTreeSet<(usize, String)>,
}

impl<'s> SignatureExtractor<'s> {
    fn new(source: &'s str, config: &'s ParserConfig) -> Self {
        Self {
            source,
            config,
            signature: StructuralSignature::new(),
            receivers: Vec::new(),
            seen_globals: BTreeSet::new(),
        }
    }

    fn run(mut self, root: Node<'_>) -> StructuralSignature {
        if self.config.include_docs {
            self.signature.module_docstring = visitor::extract_docstring(root, self.source);
        }

        let mut stack: Vec<(Node<'_>, Scope)> = Vec::new();
        push_children(&mut stack, root, Scope::Module);

        while let Some((node, scope)) = stack.pop() {
            if node.is_error() {
                trace!(line = node.start_position().row + 1, "Skipping error region");
                continue;
            }

            match node.kind() {
                "decorated_definition" => {
                    let Some(definition) = node.child_by_field_name("definition") else {
                        continue;
                    };
                    let decorators = visitor::extract_decorators(node, self.source);
                    self.visit_definition(definition, node, decorators, scope, &mut stack);

                    // decorators run in the enclosing scope, before the body
                    let mut cursor = node.walk();
                    let decorator_nodes: Vec<Node<'_>> = node
                        .children(&mut cursor)
                        .filter(|c| c.kind() == "decorator")
                        .collect();
                    for decorator in decorator_nodes.into_iter().rev() {
                        stack.push((decorator, scope));
                    }
                }
                "function_definition" | "class_definition" => {
                    self.visit_definition(node, node, Vec::new(), scope, &mut stack);
                }
                "assignment" => {
                    self.visit_assignment(node, scope);
                    push_children(&mut stack, node, scope);
                }
                "call" => {
                    if let Scope::Function(id) = scope {
                        if let Some(name) = visitor::callee_name(node, self.source) {
                            if let Some(function) = self.signature.function_mut(id) {
                                function.function_calls.push(name);
                            }
                        }
                    }
                    push_children(&mut stack, node, scope);
                }
                _ => push_children(&mut stack, node, scope),
            }
        }

        self.collect_class_variables();
        self.signature
    }

    fn visit_definition<'t>(
        &mut self,
        definition: Node<'t>,
        outer: Node<'t>,
        decorators: Vec<String>,
        scope: Scope,
        stack: &mut Vec<(Node<'t>, Scope)>,
    ) {
        match definition.kind() {
            "function_definition" => {
                self.visit_function(definition, outer, decorators, scope, stack)
            }
            "class_definition" => {
                self.visit_class(definition, outer, decorators, scope, stack)
            }
            _ => push_children(stack, definition, scope),
        }
    }

    fn visit_function<'t>(
        &mut self,
        definition: Node<'t>,
        outer: Node<'t>,
        decorators: Vec<String>,
        scope: Scope,
        stack: &mut Vec<(Node<'t>, Scope)>,
    ) {
        let name = definition
            .child_by_field_name("name")
            .map(|n| node_text(n, self.source))
            .unwrap_or_default();
        let (start_line, _) = line_span(outer);
        let (_, end_line) = line_span(definition);
        let parameters_node = definition.child_by_field_name("parameters");
        let parameters = parameters_node
            .map(|p| visitor::parameter_names(p, self.source))
            .unwrap_or_default();
        let body = definition.child_by_field_name("body");

        let mut function = FunctionInfo::new(name, start_line, end_line)
            .with_signature(visitor::header_text(outer, definition, self.source))
            .with_decorators(decorators)
            .with_parameters(parameters);
        if visitor::is_async(definition) {
            function = function.async_fn();
        }
        if self.config.include_docs {
            function.docstring = body.and_then(|b| visitor::extract_docstring(b, self.source));
        }

        let receiver = self.receiver_for(&function, scope);
        let id = self.signature.alloc_function(function);
        let owner = self.owner_of(scope, id);
        self.receivers.push(receiver.map(|name| Receiver { name, owner }));

        match scope {
            Scope::Module => self.signature.functions.push(id),
            Scope::Class(class) => {
                if let Some(class) = self.signature.class_mut(class) {
                    class.methods.push(id);
                }
            }
            Scope::Function(parent) => {
                if let Some(parent) = self.signature.function_mut(parent) {
                    parent.nested_functions.push(id);
                }
            }
        }

        // parameters (defaults) and the return annotation are evaluated in the
        // enclosing scope, before the body
        if let Some(body) = body {
            stack.push((body, Scope::Function(id)));
        }
        if let Some(return_type) = definition.child_by_field_name("return_type") {
            stack.push((return_type, scope));
        }
        if let Some(parameters) = parameters_node {
            stack.push((parameters, scope));
        }
    }

    fn visit_class<'t>(
        &mut self,
        definition: Node<'t>,
        outer: Node<'t>,
        decorators: Vec<String>,
        scope: Scope,
        stack: &mut Vec<(Node<'t>, Scope)>,
    ) {
        if let Scope::Function(_) = scope {
            return;
        }

        let name = definition
            .child_by_field_name("name")
            .map(|n| node_text(n, self.source))
            .unwrap_or_default();
        let (start_line, _) = line_span(outer);
        let (_, end_line) = line_span(definition);
        let body = definition.child_by_field_name("body");

        let mut class = ClassInfo::new(name, start_line, end_line)
            .with_signature(visitor::header_text(outer, definition, self.source))
            .with_decorators(decorators)
            .with_bases(visitor::base_classes(definition, self.source));
        if self.config.include_docs {
            class.docstring = body.and_then(|b| visitor::extract_docstring(b, self.source));
        }

        let id = self.signature.alloc_class(class);
        match scope {
            Scope::Class(parent) => {
                if let Some(parent) = self.signature.class_mut(parent) {
                    parent.nested_classes.push(id);
                }
            }
            _ => self.signature.classes.push(id),
        }

        if let Some(body) = body {
            stack.push((body, Scope::Class(id)));
        }
    }

    /// Receiver name of a new function: the first parameter of a
    /// non-static method, or the enclosing method's receiver for nested
    /// functions when nested writes are captured
    fn receiver_for(&self, function: &FunctionInfo, scope: Scope) -> Option<String> {
        match scope {
            Scope::Class(_) if !function.has_decorator("staticmethod") => {
                visitor::receiver_name(&function.parameters).map(str::to_string)
            }
            Scope::Function(parent) if self.config.capture_nested_receiver_writes => {
                let inherited = self.receivers.get(parent.0)?.as_ref()?;
                // a parameter of the same name rebinds the receiver
                (!function.parameters.contains(&inherited.name)).then(|| inherited.name.clone())
            }
            _ => None,
        }
    }

    fn owner_of(&self, scope: Scope, id: FunctionId) -> FunctionId {
        match scope {
            Scope::Function(parent) => self
                .receivers
                .get(parent.0)
                .and_then(|r| r.as_ref())
                .map_or(id, |r| r.owner),
            _ => id,
        }
    }

    fn visit_assignment(&mut self, node: Node<'_>, scope: Scope) {
        if visitor::is_chained_assignment(node) {
            return;
        }

        let (start_line, end_line) = line_span(node);
        let text = node_text(node, self.source).trim();
        let target_text = |n: Node<'_>| node_text(n, self.source).to_string();

        match scope {
            Scope::Module => {
                if !self.seen_globals.insert((start_line, text.to_string())) {
                    return;
                }
                let name = node.child_by_field_name("left").map(target_text).unwrap_or_default();
                self.signature
                    .global_variables
                    .push(VariableInfo::new(name, start_line, end_line, text));
            }
            Scope::Class(id) => {
                let name = node.child_by_field_name("left").map(target_text).unwrap_or_default();
                if let Some(class) = self.signature.class_mut(id) {
                    class
                        .variables
                        .push(VariableInfo::new(name, start_line, end_line, text));
                }
            }
            Scope::Function(id) => {
                let Some(Some(receiver)) = self.receivers.get(id.0).cloned() else {
                    return;
                };
                let writes: Vec<VariableInfo> = visitor::assignment_targets(node)
                    .into_iter()
                    .filter(|target| {
                        visitor::attribute_receiver(*target, self.source)
                            == Some(receiver.name.as_str())
                    })
                    .map(|target| VariableInfo::new(target_text(target), start_line, end_line, text))
                    .collect();
                if let Some(owner) = self.signature.function_mut(receiver.owner) {
                    owner.instance_variables.extend(writes);
                }
            }
        }
    }

    /// Class variables: class-level assignments plus the receiver writes of
    /// every method, de-duplicated by (name, text) and ordered by line
    fn collect_class_variables(&mut self) {
        for index in 0..self.signature.class_count() {
            let id = ClassId(index);
            let Some(class) = self.signature.class(id) else {
                continue;
            };

            let mut variables = class.variables.clone();
            for method in self.signature.methods_of(class) {
                variables.extend(method.instance_variables.iter().cloned());
            }
            variables.sort_by_key(|v| v.start_line);

            let mut seen = BTreeSet::new();
            variables.retain(|v| seen.insert((v.name.clone(), v.text.clone())));

            if let Some(class) = self.signature.class_mut(id) {
                class.variables = variables;
            }
        }
    }
}

/// Push children so they pop in document order
fn push_children<'t>(stack: &mut Vec<(Node<'t>, Scope)>, node: Node<'t>, scope: Scope) {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    for child in children.into_iter().rev() {
        stack.push((child, scope));
    }
}
