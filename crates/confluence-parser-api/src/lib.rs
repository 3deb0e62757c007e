//! Confluence Parser API
//!
//! Language-neutral core of the structural extraction pipeline.
//!
//! This crate turns source files into structured per-file records and folds
//! them into package trees. It defines:
//!
//! - **LanguageStrategy trait**: the capability interface every language implements
//! - **Tree Builder**: read-only syntax trees plus canonical node captures
//! - **Entity types**: structural signatures backed by per-file arenas
//! - **Relationship types**: classified imports, inheritance and call qualification
//! - **Qualified names**: stable dotted identifiers for every declaration
//! - **Package merger**: one package tree per disjoint root package
//! - **Pipeline**: bounded parallel scan with progress and cancellation
//! - **Configuration, metrics and errors**
//!
//! # Example
//!
//! ```rust,ignore
//! use confluence_parser_api::{CodebaseScanner, ParserConfig, ScanContext, StrategyRegistry};
//!
//! let registry = StrategyRegistry::new().with(Box::new(MyStrategy::new()));
//! let ctx = ScanContext::new("/work/repo")
//!     .with_root_packages(vec!["/work/repo/src/app".into()])
//!     .with_dependencies(["requests", "pydantic"])
//!     .with_stdlib_version("3.12");
//!
//! let report = CodebaseScanner::new(&registry, ParserConfig::default()).scan(&ctx)?;
//! for failure in &report.failures {
//!     eprintln!("{failure}");
//! }
//! ```

pub mod config;
pub mod entities;
pub mod errors;
pub mod file;
pub mod language;
pub mod metrics;
pub mod package;
pub mod pipeline;
pub mod qualified_name;
pub mod registry;
pub mod relationships;
pub mod report;
pub mod traits;
pub mod tree;

// Re-export commonly used types
pub use config::ParserConfig;
pub use entities::{
    ClassId, ClassInfo, FunctionId, FunctionInfo, StructuralSignature, VariableInfo,
};
pub use errors::{ParserError, ParserResult};
pub use file::{checksum, FileRecord, ImportContext, ScanContext, SourceFile};
pub use language::Language;
pub use metrics::ParserMetrics;
pub use package::{merge, MergeOutcome, UnoplatPackage};
pub use pipeline::{process_file, CancellationToken, CodebaseScanner, ScanProgress};
pub use qualified_name::{DeclarationId, DeclarationKind, QualifiedName};
pub use registry::StrategyRegistry;
pub use relationships::{
    classify_source, data_model_positions, has_data_model, resolve_inheritance, DataModelMarker,
    ImportRecord, ImportType, ImportedName, RawImportStatement,
};
pub use report::{FailureStage, FileFailure, ScanReport};
pub use traits::LanguageStrategy;
pub use tree::{
    capture_nodes, node_text, DiagnosticKind, ParseTree, SyntaxDiagnostic, TreeBuilder,
};
