use super::variable::VariableInfo;
use serde::{Deserialize, Serialize};

/// Index of a function in its file's [`StructuralSignature`](super::StructuralSignature) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(pub usize);

/// A function, method or nested function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Function name
    pub name: String,

    /// Starting line number (1-indexed, first decorator when decorated)
    pub start_line: usize,

    /// Ending line number (1-indexed)
    pub end_line: usize,

    /// Verbatim declaration from the first decorator through the `:` before the body
    pub signature: String,

    /// Docstring, if the body starts with a bare string literal
    pub docstring: Option<String>,

    /// Decorators as written (e.g., `@property`, `@app.route("/")`)
    pub decorators: Vec<String>,

    /// Parameter names in declaration order
    pub parameters: Vec<String>,

    /// Is this a coroutine (`async def`)?
    pub is_async: bool,

    /// Callee names in order of appearance, duplicates kept
    pub function_calls: Vec<String>,

    /// Immediately nested functions
    pub nested_functions: Vec<FunctionId>,

    /// Receiver attribute assignments (`self.x = ...`), methods only
    pub instance_variables: Vec<VariableInfo>,
}

impl FunctionInfo {
    pub fn new(name: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        let name = name.into();
        Self {
            signature: name.clone(),
            name,
            start_line,
            end_line,
            docstring: None,
            decorators: Vec::new(),
            parameters: Vec::new(),
            is_async: false,
            function_calls: Vec::new(),
            nested_functions: Vec::new(),
            instance_variables: Vec::new(),
        }
    }

    // Builder methods
    pub fn with_signature(mut self, sig: impl Into<String>) -> Self {
        self.signature = sig.into();
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.docstring = Some(doc.into());
        self
    }

    pub fn with_decorators(mut self, decorators: Vec<String>) -> Self {
        self.decorators = decorators;
        self
    }

    pub fn with_parameters(mut self, params: Vec<String>) -> Self {
        self.parameters = params;
        self
    }

    pub fn async_fn(mut self) -> Self {
        self.is_async = true;
        self
    }

    /// Whether a decorator with this name (without `@` or arguments) is applied
    pub fn has_decorator(&self, name: &str) -> bool {
        self.decorators.iter().any(|d| {
            let bare = d.trim_start_matches('@');
            let bare = bare.split('(').next().unwrap_or(bare).trim();
            bare == name
        })
    }
}
