//! Qualified-Name Resolver
//!
//! A qualified name is the dotted path of a file relative to the workspace
//! root, extension stripped, with the class name appended for class
//! declarations. Resolution works on path strings so results are identical on
//! every platform: `/` and `\` are both separators.

use crate::entities::{ClassId, FunctionId};
use crate::errors::{ParserError, ParserResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Kind of declaration a qualified name is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeclarationKind {
    Class,
    Function,
    Module,
}

/// Dotted identifier of a declaration within one codebase
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a dotted segment
    pub fn child(&self, segment: &str) -> QualifiedName {
        QualifiedName(format!("{}.{}", self.0, segment))
    }

    /// Dotted segments
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.split('.')
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QualifiedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stable identifier of a declaration within its file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclarationId {
    Module,
    Class(ClassId),
    Function(FunctionId),
}

impl fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationId::Module => f.write_str("module"),
            DeclarationId::Class(id) => write!(f, "class:{}", id.0),
            DeclarationId::Function(id) => write!(f, "function:{}", id.0),
        }
    }
}

impl FromStr for DeclarationId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "module" {
            return Ok(DeclarationId::Module);
        }
        let (kind, index) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid declaration id: {s}"))?;
        let index: usize = index
            .parse()
            .map_err(|_| format!("invalid declaration index: {s}"))?;
        match kind {
            "class" => Ok(DeclarationId::Class(ClassId(index))),
            "function" => Ok(DeclarationId::Function(FunctionId(index))),
            _ => Err(format!("invalid declaration kind: {s}")),
        }
    }
}

// Serialized as a string so it can key JSON maps
impl Serialize for DeclarationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeclarationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Resolve the qualified name of a declaration.
///
/// The workspace root is located as a run of path components inside
/// `file_path` (first occurrence); the components after it, extension
/// stripped from the last, are joined with `.`. CLASS declarations append
/// `.declaration_name`; every other kind is named by the file's dotted path.
///
/// # Errors
/// `PrefixNotFound` when the root does not occur in the path or nothing
/// follows it.
pub fn resolve(
    declaration_name: &str,
    kind: DeclarationKind,
    file_path: &Path,
    workspace_root: &Path,
) -> ParserResult<QualifiedName> {
    let module = module_path(file_path, workspace_root)?;
    Ok(match kind {
        DeclarationKind::Class => module.child(declaration_name),
        DeclarationKind::Function | DeclarationKind::Module => module,
    })
}

/// Dotted module path of a file relative to the workspace root
pub fn module_path(file_path: &Path, workspace_root: &Path) -> ParserResult<QualifiedName> {
    let file = file_path.to_string_lossy();
    let root = workspace_root.to_string_lossy();
    let file_parts = components(&file);
    let root_parts = components(&root);

    let not_found = || ParserError::PrefixNotFound {
        workspace_root: root.to_string(),
        file_path: file.to_string(),
    };

    let start = find_anchor(&file_parts, &root_parts).ok_or_else(not_found)?;
    let remainder = &file_parts[start + root_parts.len()..];
    let (last, dirs) = remainder.split_last().ok_or_else(not_found)?;

    let stem = match last.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => *last,
    };

    let mut dotted: Vec<&str> = dirs.to_vec();
    dotted.push(stem);
    Ok(QualifiedName(dotted.join(".")))
}

/// Path components, splitting on both separator styles and dropping `.`
pub(crate) fn components(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect()
}

fn find_anchor(haystack: &[&str], needle: &[&str]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}
