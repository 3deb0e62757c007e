// Integration tests for structural signature extraction

use confluence_parser_api::{LanguageStrategy, ParserConfig, StructuralSignature};
use confluence_python::PythonStrategy;
use std::path::Path;

fn extract_with(source: &str, config: &ParserConfig) -> StructuralSignature {
    let strategy = PythonStrategy::new();
    let tree = strategy
        .parse(source, Path::new("sample.py"), config)
        .unwrap();
    strategy.extract_signature(&tree, source, config)
}

fn extract(source: &str) -> StructuralSignature {
    extract_with(source, &ParserConfig::default())
}

#[test]
fn test_instance_variables_exclude_locals() {
    let source = r#"
class Counter:
    def reset(self):
        self.x = 1
        local = 2
        return local
"#;
    let sig = extract(source);
    let counter = sig.find_class("Counter").unwrap();
    let reset = sig.methods_of(counter)[0];

    let names: Vec<&str> = reset
        .instance_variables
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(names, vec!["self.x"]);
    assert_eq!(reset.instance_variables[0].attribute_name(), "x");

    assert!(sig.global_variables.is_empty());
    assert!(counter.variables.iter().all(|v| !v.name.contains("local")));
}

#[test]
fn test_conditional_receiver_writes_are_captured() {
    let source = r#"
class Config:
    def load(self, flag):
        if flag:
            self.mode = "fast"
        else:
            for item in range(3):
                self.count = item
        try:
            self.path = open("x")
        except OSError:
            self.path = None
"#;
    let sig = extract(source);
    let config = sig.find_class("Config").unwrap();
    let load = sig.methods_of(config)[0];

    let names: Vec<&str> = load
        .instance_variables
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(names, vec!["self.mode", "self.count", "self.path", "self.path"]);

    // class-level view is de-duplicated by (name, text)
    let class_names: Vec<&str> = config.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(class_names, vec!["self.mode", "self.count", "self.path", "self.path"]);
}

#[test]
fn test_nested_function_writes_are_excluded_by_default() {
    let source = r#"
class Widget:
    def build(self):
        self.ready = True

        def configure(inner_self):
            inner_self.fake_attr = 1
            self.late = 2

        configure(self)
"#;
    let sig = extract(source);
    let widget = sig.find_class("Widget").unwrap();
    let build = sig.methods_of(widget)[0];

    let names: Vec<&str> = build
        .instance_variables
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(names, vec!["self.ready"]);

    let configure = sig.nested_of(build)[0];
    assert!(configure.instance_variables.is_empty());
    assert!(widget.variables.iter().all(|v| v.name != "inner_self.fake_attr"));
}

#[test]
fn test_nested_function_writes_with_capture_enabled() {
    let source = r#"
class Widget:
    def build(self):
        def configure():
            self.late = 2

        def rebinding(self):
            self.shadowed = 3

        configure()
"#;
    let config = ParserConfig::default().with_nested_receiver_capture(true);
    let sig = extract_with(source, &config);
    let widget = sig.find_class("Widget").unwrap();
    let build = sig.methods_of(widget)[0];

    let names: Vec<&str> = build
        .instance_variables
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(names, vec!["self.late"]);
    assert!(widget.variables.iter().any(|v| v.name == "self.late"));
    assert!(widget.variables.iter().all(|v| v.name != "self.shadowed"));
}

#[test]
fn test_comprehensive_config_captures_nested_writes() {
    let source = r#"
class Widget:
    def build(self):
        def configure():
            self.late = 2
        configure()
"#;
    let default = extract(source);
    let widget = default.find_class("Widget").unwrap();
    assert!(default.methods_of(widget)[0].instance_variables.is_empty());

    let comprehensive = extract_with(source, &ParserConfig::comprehensive());
    let widget = comprehensive.find_class("Widget").unwrap();
    let names: Vec<&str> = comprehensive.methods_of(widget)[0]
        .instance_variables
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(names, vec!["self.late"]);
}

#[test]
fn test_calls_recorded_in_source_order_with_duplicates() {
    let source = r#"
def pipeline(items):
    first(second(items))
    result = [transform(i) for i in items]
    first(result)
    handler = lambda x: inner(x)
    return obj.method().chain()
"#;
    let sig = extract(source);
    let pipeline = sig.find_function("pipeline").unwrap();
    assert_eq!(
        pipeline.function_calls,
        vec![
            "first",
            "second",
            "transform",
            "first",
            "inner",
            "obj.method().chain",
            "obj.method",
        ]
    );
}

#[test]
fn test_signature_text_spans_decorators_to_colon() {
    let source = r#"
@dataclass(frozen=True)
class Point(Base, metaclass=Meta):
    """A point."""
    x: int = 0

class Service:
    @property
    async def fetch(self, url: str, *, timeout: float = 1.0) -> bytes:
        """Fetch a URL.

        Returns raw bytes.
        """
        return await get(url)
"#;
    let sig = extract(source);

    let point = sig.find_class("Point").unwrap();
    assert_eq!(
        point.signature,
        "@dataclass(frozen=True)\nclass Point(Base, metaclass=Meta):"
    );
    assert_eq!(point.bases, vec!["Base"]);
    assert_eq!(point.docstring.as_deref(), Some("A point."));
    assert_eq!(point.start_line, 2);
    assert_eq!(point.variables[0].name, "x");

    let service = sig.find_class("Service").unwrap();
    let fetch = sig.methods_of(service)[0];
    assert!(fetch.is_async);
    assert_eq!(fetch.decorators, vec!["@property"]);
    assert_eq!(
        fetch.signature,
        "@property\n    async def fetch(self, url: str, *, timeout: float = 1.0) -> bytes:"
    );
    assert_eq!(
        fetch.docstring.as_deref(),
        Some("Fetch a URL.\n\n        Returns raw bytes.")
    );
    assert_eq!(fetch.parameters, vec!["self", "url", "timeout"]);
}

#[test]
fn test_missing_docstring_is_none() {
    let source = "class Empty:\n    pass\n\ndef f():\n    return ''\n";
    let sig = extract(source);
    assert!(sig.module_docstring.is_none());
    assert!(sig.find_class("Empty").unwrap().docstring.is_none());
    assert!(sig.find_function("f").unwrap().docstring.is_none());
}

#[test]
fn test_nested_classes_and_containment() {
    let source = r#"
class Outer:
    class Inner:
        def method(self):
            def helper():
                pass
            return helper

    def outer_method(self):
        pass

def top():
    def nested():
        def deeper():
            pass
"#;
    let sig = extract(source);
    let line_count = source.lines().count();
    sig.validate_containment(line_count).unwrap();

    let outer = sig.find_class("Outer").unwrap();
    assert_eq!(outer.nested_classes.len(), 1);
    assert_eq!(sig.class_count(), 2);
    assert_eq!(sig.function_count(), 6);

    for class in &sig.class_arena {
        assert!(class.start_line <= class.end_line);
    }
    for function in &sig.function_arena {
        assert!(function.start_line <= function.end_line);
        for child in sig.nested_of(function) {
            assert!(function.start_line <= child.start_line);
            assert!(child.end_line <= function.end_line);
        }
    }
}

#[test]
fn test_globals_exclude_function_and_class_scope() {
    let source = r#"
VERSION = "1.0"
a = b = 3
x, y = 1, 2

class Settings:
    debug = False

def main():
    counter = 0
    counter += 1
"#;
    let sig = extract(source);
    let globals: Vec<&str> = sig
        .global_variables
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(globals, vec!["VERSION", "a", "x, y"]);
    assert_eq!(sig.global_variables[1].text, "a = b = 3");

    let settings = sig.find_class("Settings").unwrap();
    assert_eq!(settings.variables[0].name, "debug");
}

#[test]
fn test_malformed_construct_does_not_abort_file() {
    let source = r#"
def good_before():
    pass

def broken(:
    return 1

class StillHere:
    def method(self):
        self.value = 1
"#;
    let strategy = PythonStrategy::new();
    let config = ParserConfig::default();
    let tree = strategy
        .parse(source, Path::new("broken.py"), &config)
        .unwrap();
    assert!(tree.has_errors());
    assert!(!tree.diagnostics().is_empty());

    let sig = strategy.extract_signature(&tree, source, &config);
    assert!(sig.find_function("good_before").is_some());
    let still_here = sig.find_class("StillHere").unwrap();
    assert_eq!(sig.methods_of(still_here).len(), 1);
}

#[test]
fn test_extraction_is_deterministic() {
    let source = r#"
import os

class A:
    def f(self):
        self.x = os.getcwd()
"#;
    assert_eq!(extract(source), extract(source));
}
