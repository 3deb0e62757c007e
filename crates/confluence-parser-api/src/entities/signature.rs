use super::class::{ClassId, ClassInfo};
use super::function::{FunctionId, FunctionInfo};
use super::variable::VariableInfo;
use serde::{Deserialize, Serialize};

/// Semantic outline of one source file
///
/// Functions and classes live in flat per-file arenas; nesting is expressed
/// through [`FunctionId`]/[`ClassId`] indices, so the outline serializes as
/// plain lists and deep nesting never needs recursive ownership.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralSignature {
    /// Module docstring
    pub module_docstring: Option<String>,

    /// Module-level assignments in source order
    pub global_variables: Vec<VariableInfo>,

    /// Module-level functions in source order
    pub functions: Vec<FunctionId>,

    /// Module-level classes in source order
    pub classes: Vec<ClassId>,

    /// Every function of the file, at any depth
    pub function_arena: Vec<FunctionInfo>,

    /// Every class of the file, at any depth
    pub class_arena: Vec<ClassInfo>,
}

impl StructuralSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a function in the arena and return its id
    pub fn alloc_function(&mut self, function: FunctionInfo) -> FunctionId {
        self.function_arena.push(function);
        FunctionId(self.function_arena.len() - 1)
    }

    /// Store a class in the arena and return its id
    pub fn alloc_class(&mut self, class: ClassInfo) -> ClassId {
        self.class_arena.push(class);
        ClassId(self.class_arena.len() - 1)
    }

    pub fn function(&self, id: FunctionId) -> Option<&FunctionInfo> {
        self.function_arena.get(id.0)
    }

    pub fn function_mut(&mut self, id: FunctionId) -> Option<&mut FunctionInfo> {
        self.function_arena.get_mut(id.0)
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassInfo> {
        self.class_arena.get(id.0)
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassInfo> {
        self.class_arena.get_mut(id.0)
    }

    /// Module-level functions
    pub fn top_level_functions(&self) -> impl Iterator<Item = &FunctionInfo> + '_ {
        self.functions.iter().filter_map(|id| self.function(*id))
    }

    /// Module-level classes
    pub fn top_level_classes(&self) -> impl Iterator<Item = &ClassInfo> + '_ {
        self.classes.iter().filter_map(|id| self.class(*id))
    }

    /// Methods of a class, in source order
    pub fn methods_of(&self, class: &ClassInfo) -> Vec<&FunctionInfo> {
        class
            .methods
            .iter()
            .filter_map(|id| self.function(*id))
            .collect()
    }

    /// Nested functions of a function, in source order
    pub fn nested_of(&self, function: &FunctionInfo) -> Vec<&FunctionInfo> {
        function
            .nested_functions
            .iter()
            .filter_map(|id| self.function(*id))
            .collect()
    }

    /// Find a module-level class by name
    pub fn find_class(&self, name: &str) -> Option<&ClassInfo> {
        self.top_level_classes().find(|c| c.name == name)
    }

    /// Find a module-level function by name
    pub fn find_function(&self, name: &str) -> Option<&FunctionInfo> {
        self.top_level_functions().find(|f| f.name == name)
    }

    /// Total number of functions at any depth
    pub fn function_count(&self) -> usize {
        self.function_arena.len()
    }

    /// Total number of classes at any depth
    pub fn class_count(&self) -> usize {
        self.class_arena.len()
    }

    /// Enclosing-class chain for every class, outermost first, ending with the
    /// class itself (`["Outer", "Inner"]`)
    pub fn class_paths(&self) -> Vec<(ClassId, Vec<String>)> {
        let mut paths = Vec::with_capacity(self.class_arena.len());
        let mut stack: Vec<(ClassId, Vec<String>)> = self
            .classes
            .iter()
            .rev()
            .filter_map(|id| self.class(*id).map(|c| (*id, vec![c.name.clone()])))
            .collect();

        while let Some((id, path)) = stack.pop() {
            if let Some(class) = self.class(id) {
                for nested in class.nested_classes.iter().rev() {
                    if let Some(child) = self.class(*nested) {
                        let mut child_path = path.clone();
                        child_path.push(child.name.clone());
                        stack.push((*nested, child_path));
                    }
                }
            }
            paths.push((id, path));
        }
        paths
    }

    /// Check line-range invariants: every range is ordered, fits within
    /// `line_count`, and nested ranges lie inside their parent.
    pub fn validate_containment(&self, line_count: usize) -> Result<(), String> {
        for function in &self.function_arena {
            check_range(&function.name, function.start_line, function.end_line, line_count)?;
            for nested in self.nested_of(function) {
                check_contained(
                    &function.name,
                    (function.start_line, function.end_line),
                    &nested.name,
                    (nested.start_line, nested.end_line),
                )?;
            }
        }

        for class in &self.class_arena {
            check_range(&class.name, class.start_line, class.end_line, line_count)?;
            for method in self.methods_of(class) {
                check_contained(
                    &class.name,
                    (class.start_line, class.end_line),
                    &method.name,
                    (method.start_line, method.end_line),
                )?;
            }
            for nested in class.nested_classes.iter().filter_map(|id| self.class(*id)) {
                check_contained(
                    &class.name,
                    (class.start_line, class.end_line),
                    &nested.name,
                    (nested.start_line, nested.end_line),
                )?;
            }
        }

        Ok(())
    }
}

fn check_range(name: &str, start: usize, end: usize, line_count: usize) -> Result<(), String> {
    if start == 0 || start > end || end > line_count {
        return Err(format!(
            "{name}: invalid range {start}..={end} for {line_count} lines"
        ));
    }
    Ok(())
}

fn check_contained(
    parent: &str,
    outer: (usize, usize),
    child: &str,
    inner: (usize, usize),
) -> Result<(), String> {
    if inner.0 < outer.0 || inner.1 > outer.1 {
        return Err(format!(
            "{child} ({}..={}) escapes {parent} ({}..={})",
            inner.0, inner.1, outer.0, outer.1
        ));
    }
    Ok(())
}
