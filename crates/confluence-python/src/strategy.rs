//! Implementation of the LanguageStrategy trait for Python
//!
//! Wires the tree-sitter grammar, the signature and import extractors and the
//! versioned standard-library tables into the language-neutral pipeline.

use crate::extractor;
use crate::imports;
use crate::stdlib::{is_stdlib_module, PythonVersion};
use confluence_parser_api::relationships::resolve_relative_source;
use confluence_parser_api::{
    classify_source, DataModelMarker, ImportContext, ImportRecord, ImportType, Language,
    LanguageStrategy, ParseTree, ParserConfig, RawImportStatement, StructuralSignature,
};

/// Import families whose presence marks a module as defining data models
const DATA_MODEL_MARKERS: &[DataModelMarker] = &[
    DataModelMarker::module("dataclasses"),
    DataModelMarker::module("pydantic"),
    DataModelMarker::module("sqlmodel"),
    DataModelMarker::module("attr"),
    DataModelMarker::module("attrs"),
    DataModelMarker::module("marshmallow"),
    DataModelMarker::names("msgspec", &["Struct"]),
    DataModelMarker::names(
        "sqlalchemy",
        &[
            "declarative_base",
            "DeclarativeBase",
            "Mapped",
            "mapped_column",
            "Column",
            "Table",
            "registry",
        ],
    ),
    DataModelMarker::names("typing", &["NamedTuple", "TypedDict"]),
    DataModelMarker::names("typing_extensions", &["NamedTuple", "TypedDict"]),
    DataModelMarker::names("django.db", &["models"]),
];

/// Python language strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonStrategy;

impl PythonStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageStrategy for PythonStrategy {
    fn language(&self) -> Language {
        Language::Python
    }

    fn file_extensions(&self) -> &[&str] {
        &[".py", ".pyw"]
    }

    fn ignored_file_names(&self) -> &[&str] {
        &["__init__.py"]
    }

    fn grammar(&self) -> tree_sitter::Language {
        tree_sitter_python::language()
    }

    fn extract_signature(
        &self,
        tree: &ParseTree,
        source: &str,
        config: &ParserConfig,
    ) -> StructuralSignature {
        extractor::extract_signature(tree, source, config)
    }

    fn extract_imports(&self, tree: &ParseTree, source: &str) -> Vec<RawImportStatement> {
        imports::extract_imports(tree.root_node(), source)
    }

    fn classify_import(&self, raw: &RawImportStatement, ctx: &ImportContext<'_>) -> ImportRecord {
        let names = raw.names.clone();

        if raw.source == "__future__" {
            return ImportRecord::new(raw.source.clone(), ImportType::System).with_names(names);
        }

        if raw.is_relative() {
            let module = ctx.module.map(|m| m.as_str());
            let source = resolve_relative_source(&raw.source, raw.relative_level, module);
            return ImportRecord::new(source, ImportType::Internal).with_names(names);
        }

        let version = PythonVersion::parse_or_newest(&ctx.scan.stdlib_version);
        let import_type = classify_source(
            &raw.source,
            raw.relative_level,
            &ctx.scan.known_external_dependencies,
            &|module| is_stdlib_module(module, version),
            &ctx.scan.local_modules,
        );
        ImportRecord::new(raw.source.clone(), import_type).with_names(names)
    }

    fn data_model_markers(&self) -> &[DataModelMarker] {
        DATA_MODEL_MARKERS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confluence_parser_api::{ImportedName, QualifiedName, ScanContext};
    use std::path::Path;

    fn classify(raw: &RawImportStatement, scan: &ScanContext) -> ImportRecord {
        let module = QualifiedName::new("app.api.views");
        let ctx = ImportContext {
            scan,
            file_path: Path::new("/work/app/api/views.py"),
            module: Some(&module),
        };
        PythonStrategy::new().classify_import(raw, &ctx)
    }

    #[test]
    fn test_python_strategy_language() {
        assert_eq!(PythonStrategy::new().language(), Language::Python);
    }

    #[test]
    fn test_python_strategy_file_extensions() {
        let strategy = PythonStrategy::new();
        let exts = strategy.file_extensions();
        assert_eq!(exts.len(), 2);
        assert!(exts.contains(&".py"));
        assert!(exts.contains(&".pyw"));
    }

    #[test]
    fn test_python_strategy_can_parse() {
        let strategy = PythonStrategy::new();
        assert!(strategy.can_parse(Path::new("test.py")));
        assert!(strategy.can_parse(Path::new("test.pyw")));
        assert!(!strategy.can_parse(Path::new("test.rs")));
        assert!(!strategy.can_parse(Path::new("test.txt")));
        assert!(strategy.is_ignored(Path::new("pkg/__init__.py")));
    }

    #[test]
    fn test_classify_absolute_imports() {
        let scan = ScanContext::new("/work").with_dependencies(["Requests"]);
        let os = RawImportStatement::new("os.path", 1);
        let requests = RawImportStatement::new("requests.adapters", 2);
        let local = RawImportStatement::new("app.models", 3);

        assert_eq!(classify(&os, &scan).import_type, ImportType::System);
        assert_eq!(classify(&requests, &scan).import_type, ImportType::External);
        assert_eq!(classify(&local, &scan).import_type, ImportType::Internal);
    }

    #[test]
    fn test_classify_relative_import_resolves_source() {
        let scan = ScanContext::new("/work");
        let raw = RawImportStatement::new("models", 1)
            .relative(1)
            .with_names(vec![ImportedName::new("User")]);
        let record = classify(&raw, &scan);
        assert_eq!(record.source, "app.api.models");
        assert_eq!(record.import_type, ImportType::Internal);
        assert_eq!(record.names[0].original_name, "User");
    }

    #[test]
    fn test_classify_respects_stdlib_version() {
        let raw = RawImportStatement::new("distutils.core", 1);
        let old = ScanContext::new("/work").with_stdlib_version("3.11");
        let new = ScanContext::new("/work").with_stdlib_version("3.12");
        assert_eq!(classify(&raw, &old).import_type, ImportType::System);
        assert_eq!(classify(&raw, &new).import_type, ImportType::Internal);
    }

    #[test]
    fn test_classify_path_modules_and_early_removals() {
        let v310 = ScanContext::new("/work").with_stdlib_version("3.10");
        let v311 = ScanContext::new("/work").with_stdlib_version("3.11");
        let posixpath = RawImportStatement::new("posixpath", 1);
        let binhex = RawImportStatement::new("binhex", 2);

        assert_eq!(classify(&posixpath, &v311).import_type, ImportType::System);
        assert_eq!(classify(&binhex, &v310).import_type, ImportType::System);
        assert_eq!(classify(&binhex, &v311).import_type, ImportType::Internal);
    }

    #[test]
    fn test_future_import_is_system() {
        let scan = ScanContext::new("/work").with_local_modules(["__future__"]);
        let raw = RawImportStatement::new("__future__", 1);
        assert_eq!(classify(&raw, &scan).import_type, ImportType::System);
    }
}
