//! # confluence-python
//!
//! Python language strategy for the Confluence structural extraction
//! pipeline.
//!
//! ## Features
//!
//! - Declaration outline of every module: functions, methods, nested
//!   functions, classes and nested classes with their headers, docstrings and
//!   decorators
//! - Receiver attribute writes (`self.x = ...`) per method and class
//! - Call names in source order, qualified through the file's imports
//! - Import classification against versioned standard-library tables and the
//!   declared third-party dependencies
//! - Safe: no panics on malformed input; syntax errors are recovered from
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use confluence_parser_api::{CodebaseScanner, ParserConfig, ScanContext};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = confluence_python::default_registry();
//! let ctx = ScanContext::new("/work/repo")
//!     .with_root_packages(vec!["/work/repo/app".into()])
//!     .with_dependencies(["requests"])
//!     .with_stdlib_version("3.12");
//!
//! let report = CodebaseScanner::new(&registry, ParserConfig::default()).scan(&ctx)?;
//! println!("Extracted {} files", report.files.len());
//! # Ok(())
//! # }
//! ```

mod extractor;
mod imports;
pub mod stdlib;
mod strategy;
mod visitor;

pub use extractor::extract_signature;
pub use imports::extract_imports;
pub use strategy::PythonStrategy;

use confluence_parser_api::StrategyRegistry;

/// Registry with the Python strategy installed
pub fn default_registry() -> StrategyRegistry {
    StrategyRegistry::new().with(Box::new(PythonStrategy::new()))
}
