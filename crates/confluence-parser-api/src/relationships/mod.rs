pub mod calls;
pub mod imports;
pub mod inheritance;

pub use calls::{qualify_calls, CallResolver};
pub use imports::{
    classify_source, data_model_positions, group_by_source, has_data_model,
    normalize_dependency_name, resolve_relative_source, DataModelMarker, ImportRecord, ImportType,
    ImportedName, RawImportStatement,
};
pub use inheritance::{resolve_inheritance, resolve_signature_inheritance};
