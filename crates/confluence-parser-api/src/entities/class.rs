use super::function::FunctionId;
use super::variable::VariableInfo;
use serde::{Deserialize, Serialize};

/// Index of a class in its file's [`StructuralSignature`](super::StructuralSignature) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub usize);

/// A class declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Class name
    pub name: String,

    /// Starting line number (1-indexed, first decorator when decorated)
    pub start_line: usize,

    /// Ending line number (1-indexed)
    pub end_line: usize,

    /// Verbatim declaration from the first decorator through the `:` before the body
    pub signature: String,

    /// Docstring, if the body starts with a bare string literal
    pub docstring: Option<String>,

    /// Decorators as written
    pub decorators: Vec<String>,

    /// Base classes in declaration order, fully qualified once resolved
    pub bases: Vec<String>,

    /// Class-level variables followed by instance variables of its methods, by line
    pub variables: Vec<VariableInfo>,

    /// Methods declared directly in the class body
    pub methods: Vec<FunctionId>,

    /// Classes declared directly in the class body
    pub nested_classes: Vec<ClassId>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        let name = name.into();
        Self {
            signature: name.clone(),
            name,
            start_line,
            end_line,
            docstring: None,
            decorators: Vec::new(),
            bases: Vec::new(),
            variables: Vec::new(),
            methods: Vec::new(),
            nested_classes: Vec::new(),
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

    pub fn with_bases(mut self, bases: Vec<String>) -> Self {
        self.bases = bases;
        self
    }
}
