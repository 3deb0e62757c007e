use super::calls::CallResolver;
use crate::entities::StructuralSignature;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Classification of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportType {
    /// Same codebase
    Internal,
    /// Declared third-party dependency
    External,
    /// Language standard library
    System,
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ImportType::Internal => "INTERNAL",
            ImportType::External => "EXTERNAL",
            ImportType::System => "SYSTEM",
        };
        f.write_str(tag)
    }
}

/// One imported name with its optional alias
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportedName {
    /// Name as exported by the source (`Foo`, `os.path`, `*`)
    pub original_name: String,

    /// Local alias (`as` clause)
    pub alias: Option<String>,

    /// Plain `import a.b` form: the name is the module itself
    #[serde(default)]
    pub is_module: bool,
}

impl ImportedName {
    pub fn new(original_name: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            alias: None,
            is_module: false,
        }
    }

    /// A whole-module import (`import a.b`)
    pub fn module(original_name: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            alias: None,
            is_module: true,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Name the importing file uses: the alias when present
    pub fn usage_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.original_name)
    }

    /// Fully-qualified target of this name when imported from `source`
    pub fn target(&self, source: &str) -> String {
        if self.is_module {
            self.original_name.clone()
        } else {
            format!("{}.{}", source, self.original_name)
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.original_name == "*"
    }
}

/// Import statement as written, before classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImportStatement {
    /// Module path without leading dots (`pkg.models`, empty for `from . import x`)
    pub source: String,

    /// Imported names
    pub names: Vec<ImportedName>,

    /// Number of leading dots for relative imports (0 = absolute)
    pub relative_level: usize,

    /// Line of the statement (1-indexed)
    pub line: usize,
}

impl RawImportStatement {
    pub fn new(source: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            names: Vec::new(),
            relative_level: 0,
            line,
        }
    }

    pub fn with_names(mut self, names: Vec<ImportedName>) -> Self {
        self.names = names;
        self
    }

    pub fn relative(mut self, level: usize) -> Self {
        self.relative_level = level;
        self
    }

    pub fn is_relative(&self) -> bool {
        self.relative_level > 0
    }

    /// First dotted segment of the source
    pub fn root_module(&self) -> &str {
        self.source.split('.').next().unwrap_or("")
    }
}

/// Classified import, one per distinct source within a file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Absolute module path
    pub source: String,

    /// Imported names with their aliasing preserved
    pub names: Vec<ImportedName>,

    /// Classification tag
    pub import_type: ImportType,
}

impl ImportRecord {
    pub fn new(source: impl Into<String>, import_type: ImportType) -> Self {
        Self {
            source: source.into(),
            names: Vec::new(),
            import_type,
        }
    }

    pub fn with_names(mut self, names: Vec<ImportedName>) -> Self {
        self.names = names;
        self
    }

    /// Names the importing file uses to refer to the imported symbols
    pub fn usage_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(|n| n.usage_name())
    }

    pub fn is_internal(&self) -> bool {
        self.import_type == ImportType::Internal
    }
}

/// Normalize a declared dependency name for comparison with module names
/// (`Typing-Extensions` -> `typing_extensions`)
pub fn normalize_dependency_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace(['-', '.'], "_")
}

/// Classify an import by its source module
///
/// Precedence: relative imports are always INTERNAL; a root module listed in
/// `known_external` is EXTERNAL; a standard-library root is SYSTEM unless a
/// module of the same name exists under the workspace root (`local_modules`),
/// in which case it is INTERNAL; everything else is INTERNAL.
pub fn classify_source(
    source: &str,
    relative_level: usize,
    known_external: &BTreeSet<String>,
    is_stdlib: &dyn Fn(&str) -> bool,
    local_modules: &BTreeSet<String>,
) -> ImportType {
    if relative_level > 0 {
        return ImportType::Internal;
    }

    let root = source.split('.').next().unwrap_or("");
    if known_external.contains(&normalize_dependency_name(root)) {
        return ImportType::External;
    }

    if is_stdlib(root) {
        if local_modules.contains(root) {
            return ImportType::Internal;
        }
        return ImportType::System;
    }

    ImportType::Internal
}

/// Absolute source of a relative import, resolved against the importing
/// file's dotted module path (`pkg.sub.mod` + `..models` -> `pkg.models`).
///
/// Falls back to the dotted form as written when the module is unknown or the
/// import climbs above the top-level package.
pub fn resolve_relative_source(source: &str, level: usize, module: Option<&str>) -> String {
    let fallback = || format!("{}{}", ".".repeat(level), source);
    let Some(module) = module else {
        return fallback();
    };

    let segments: Vec<&str> = module.split('.').collect();
    if level == 0 || level > segments.len() - 1 {
        return if level == 0 { source.to_string() } else { fallback() };
    }

    let package = &segments[..segments.len() - level];
    if source.is_empty() {
        package.join(".")
    } else {
        format!("{}.{}", package.join("."), source)
    }
}

/// Aggregate records per distinct source, keeping first-occurrence order and
/// dropping repeated (name, alias) pairs
pub fn group_by_source(records: Vec<ImportRecord>) -> Vec<ImportRecord> {
    let mut grouped: Vec<ImportRecord> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();

    for record in records {
        match index.get(&record.source) {
            Some(&i) => {
                let existing = &mut grouped[i];
                for name in record.names {
                    if !existing.names.contains(&name) {
                        existing.names.push(name);
                    }
                }
            }
            None => {
                index.insert(record.source.clone(), grouped.len());
                let mut names: Vec<ImportedName> = Vec::with_capacity(record.names.len());
                for name in record.names {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                grouped.push(ImportRecord { names, ..record });
            }
        }
    }

    grouped
}

/// Import family that marks a file as declaring data models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataModelMarker {
    /// Module (or module prefix) the marker lives in
    pub module: &'static str,

    /// Names that must be imported from it; `None` = any import of the module
    pub names: Option<&'static [&'static str]>,
}

impl DataModelMarker {
    pub const fn module(module: &'static str) -> Self {
        Self {
            module,
            names: None,
        }
    }

    pub const fn names(module: &'static str, names: &'static [&'static str]) -> Self {
        Self {
            module,
            names: Some(names),
        }
    }

    fn matches(&self, record: &ImportRecord) -> bool {
        let in_module = record.source == self.module
            || record
                .source
                .strip_prefix(self.module)
                .is_some_and(|rest| rest.starts_with('.'));
        if !in_module {
            return false;
        }
        match self.names {
            None => true,
            Some(names) => record
                .names
                .iter()
                .any(|n| !n.is_module && names.contains(&n.original_name.as_str())),
        }
    }
}

/// Whether any import belongs to a data-model family
pub fn has_data_model(imports: &[ImportRecord], markers: &[DataModelMarker]) -> bool {
    imports
        .iter()
        .any(|record| markers.iter().any(|marker| marker.matches(record)))
}

impl DataModelMarker {
    /// Whether a fully qualified name (`pydantic.BaseModel`,
    /// `django.db.models.Model`) falls inside this family
    pub fn covers(&self, dotted: &str) -> bool {
        let rest = match dotted.strip_prefix(self.module) {
            Some("") => return self.names.is_none(),
            Some(rest) => match rest.strip_prefix('.') {
                Some(rest) => rest,
                None => return false,
            },
            None => return false,
        };
        match self.names {
            None => true,
            Some(names) => rest.split('.').any(|segment| names.contains(&segment)),
        }
    }
}

const DATACLASS_DECORATORS: &[&str] = &["dataclass", "dataclasses.dataclass"];

/// Line span of every class that defines a data model, keyed by its dotted
/// path within the file (`User`, `Outer.Inner`).
///
/// A class qualifies when it carries a dataclass decorator, when a decorator or
/// base resolves through `resolver` into a marker family, or when a base names
/// a class of the same file that already qualified. Bases must still be
/// unresolved, so run this before inheritance resolution.
pub fn data_model_positions(
    signature: &StructuralSignature,
    resolver: &CallResolver,
    markers: &[DataModelMarker],
) -> BTreeMap<String, (usize, usize)> {
    let in_family = |name: &str| {
        let qualified = resolver.qualify(name);
        markers.iter().any(|marker| marker.covers(&qualified))
    };

    let mut positions = BTreeMap::new();
    let mut local = BTreeSet::new();
    for (id, path) in signature.class_paths() {
        let Some(class) = signature.class(id) else {
            continue;
        };
        let decorated = class.decorators.iter().any(|decorator| {
            let bare = decorator.trim_start_matches('@');
            let bare = bare.split('(').next().unwrap_or(bare).trim();
            DATACLASS_DECORATORS.contains(&bare) || in_family(bare)
        });
        let derived = class
            .bases
            .iter()
            .any(|base| local.contains(base.as_str()) || in_family(base));
        if decorated || derived {
            local.insert(class.name.clone());
            positions.insert(path.join("."), (class.start_line, class.end_line));
        }
    }
    positions
}
