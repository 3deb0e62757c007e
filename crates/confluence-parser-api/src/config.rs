use serde::{Deserialize, Serialize};

/// Configuration for extraction and codebase scans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum file size to parse (in bytes)
    /// Files larger than this are skipped and reported
    pub max_file_size: usize,

    /// Enable parallel extraction across files
    pub parallel: bool,

    /// Concurrency limit for parallel extraction (None = rayon default)
    pub parallel_workers: Option<usize>,

    /// Extract docstrings for modules, classes and functions
    pub include_docs: bool,

    /// Treat any syntax error as fatal for the file instead of recovering
    pub strict_syntax: bool,

    /// Attribute receiver writes made inside a nested function to the
    /// enclosing method (`def outer(self): def inner(): self.x = 1`)
    pub capture_nested_receiver_writes: bool,

    /// Qualify nested classes through their enclosing classes
    /// (`pkg.mod.Outer.Inner` rather than `pkg.mod.Inner`)
    pub qualify_nested_classes: bool,

    /// Directories skipped during discovery (`*` acts as a substring wildcard)
    pub exclude_dirs: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10 MB
            parallel: true,
            parallel_workers: None,
            include_docs: true,
            strict_syntax: false,
            capture_nested_receiver_writes: false,
            qualify_nested_classes: true,
            exclude_dirs: vec![
                "__pycache__".to_string(),
                ".git".to_string(),
                ".venv".to_string(),
                "venv".to_string(),
                "env".to_string(),
                ".tox".to_string(),
                ".mypy_cache".to_string(),
                "node_modules".to_string(),
                "*.egg-info".to_string(),
            ],
        }
    }
}

impl ParserConfig {
    /// Create config for fast scans (skips docstrings)
    pub fn fast() -> Self {
        Self {
            include_docs: false,
            ..Default::default()
        }
    }

    /// Create config for comprehensive scans (also records receiver writes
    /// made inside nested functions)
    pub fn comprehensive() -> Self {
        Self {
            include_docs: true,
            capture_nested_receiver_writes: true,
            qualify_nested_classes: true,
            ..Default::default()
        }
    }

    /// Enable parallel extraction
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the concurrency limit
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.parallel_workers = Some(workers);
        self
    }

    /// Set maximum file size
    pub fn with_max_file_size(mut self, size: usize) -> Self {
        self.max_file_size = size;
        self
    }

    /// Make syntax errors fatal
    pub fn with_strict_syntax(mut self, strict: bool) -> Self {
        self.strict_syntax = strict;
        self
    }

    /// Set the nested-function receiver capture policy
    pub fn with_nested_receiver_capture(mut self, capture: bool) -> Self {
        self.capture_nested_receiver_writes = capture;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(workers) = self.parallel_workers {
            if workers == 0 {
                return Err("parallel_workers must be greater than 0".to_string());
            }
        }

        if self.max_file_size == 0 {
            return Err("max_file_size must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Check if a directory should be excluded from discovery
    pub fn should_exclude_dir(&self, dir_name: &str) -> bool {
        self.exclude_dirs.iter().any(|excluded| {
            if excluded.contains('*') {
                let pattern = excluded.replace('*', "");
                dir_name.contains(&pattern)
            } else {
                dir_name == excluded
            }
        })
    }
}
