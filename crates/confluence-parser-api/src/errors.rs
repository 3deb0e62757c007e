use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scanning, extracting, resolving or merging
#[derive(Error, Debug)]
pub enum ParserError {
    /// Failed to read file
    #[error("IO error reading {0}: {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    /// File content is not valid UTF-8
    #[error("File {0} is not valid UTF-8")]
    InvalidEncoding(PathBuf),

    /// File too large
    #[error("File {0} exceeds maximum size ({1} bytes)")]
    FileTooLarge(PathBuf, usize),

    /// No grammar is available for the requested language
    #[error("Unsupported language for {0}: {1}")]
    UnsupportedLanguage(PathBuf, String),

    /// Syntax the grammar cannot recover from
    #[error("Syntax error in {0}:{1}:{2}: {3}")]
    SyntaxError(PathBuf, usize, usize, String),

    /// Generic parsing error
    #[error("Parse error in {0}: {1}")]
    ParseError(PathBuf, String),

    /// Workspace root does not occur in the file path
    #[error("Workspace root {workspace_root} not found in {file_path}")]
    PrefixNotFound {
        workspace_root: String,
        file_path: String,
    },

    /// Two configured root packages share a directory subtree
    #[error("Root packages overlap: {} and {}", first.display(), second.display())]
    OverlappingRootPackages { first: PathBuf, second: PathBuf },

    /// Two declarations resolved to the same qualified name
    #[error("Qualified name {qualified_name} claimed by both {first} and {second}")]
    QualifiedNameCollision {
        qualified_name: String,
        first: String,
        second: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Worker pool could not be created
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(String),
}

impl ParserError {
    /// Whether this error aborts a whole codebase rather than a single file
    pub fn is_codebase_fatal(&self) -> bool {
        matches!(
            self,
            ParserError::OverlappingRootPackages { .. }
                | ParserError::QualifiedNameCollision { .. }
                | ParserError::InvalidConfig(_)
                | ParserError::ThreadPool(_)
        )
    }
}

/// Result type for parser operations
pub type ParserResult<T> = Result<T, ParserError>;
