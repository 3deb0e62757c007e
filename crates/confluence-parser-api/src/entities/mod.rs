pub mod class;
pub mod function;
pub mod signature;
pub mod variable;

pub use class::{ClassId, ClassInfo};
pub use function::{FunctionId, FunctionInfo};
pub use signature::StructuralSignature;
pub use variable::VariableInfo;
