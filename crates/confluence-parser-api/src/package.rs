//! Package Tree Merger
//!
//! Folds per-file records into one package tree per root package. Package
//! names are full dotted paths (`app`, `app.api`, `app.api.v1`), so a node's
//! name is unique across the whole codebase.

use crate::errors::{ParserError, ParserResult};
use crate::file::FileRecord;
use crate::qualified_name::{components, DeclarationId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// One package node: its files and sub-packages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnoplatPackage {
    /// Dotted package name
    pub name: String,

    /// File records keyed by path
    pub files: BTreeMap<PathBuf, FileRecord>,

    /// Sub-packages keyed by their dotted name
    pub sub_packages: BTreeMap<String, UnoplatPackage>,
}

impl UnoplatPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeMap::new(),
            sub_packages: BTreeMap::new(),
        }
    }

    /// Insert a record under the package reached by `path` (segments relative
    /// to this node), creating intermediate packages on the way down
    pub fn insert(&mut self, path: &[&str], record: FileRecord) {
        let mut node = self;
        for segment in path {
            let name = format!("{}.{}", node.name, segment);
            node = node
                .sub_packages
                .entry(name.clone())
                .or_insert_with(|| UnoplatPackage::new(name));
        }
        node.files.insert(record.file_path.clone(), record);
    }

    /// Package with the given dotted name in this subtree
    pub fn find(&self, name: &str) -> Option<&UnoplatPackage> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.name == name {
                return Some(node);
            }
            stack.extend(node.sub_packages.values());
        }
        None
    }

    /// Number of files in this subtree
    pub fn file_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += node.files.len();
            stack.extend(node.sub_packages.values());
        }
        count
    }

    /// Number of packages in this subtree, this one included
    pub fn package_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.sub_packages.values());
        }
        count
    }
}

/// Result of a merge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// One tree per root package, in root order
    pub packages: Vec<UnoplatPackage>,

    /// Files that lie under no root package
    pub unassigned: Vec<PathBuf>,
}

/// Fail when any two roots share a directory subtree (identical roots included)
pub fn check_disjoint(roots: &[PathBuf]) -> ParserResult<()> {
    let parts: Vec<Vec<String>> = roots.iter().map(|r| owned_components(r)).collect();

    for i in 0..parts.len() {
        for j in i + 1..parts.len() {
            if parts[j].starts_with(&parts[i]) || parts[i].starts_with(&parts[j]) {
                return Err(ParserError::OverlappingRootPackages {
                    first: roots[i].clone(),
                    second: roots[j].clone(),
                });
            }
        }
    }
    Ok(())
}

/// Fail when two declarations claim the same qualified name.
///
/// Module and class names are claimed per file. A claim from a second file, or
/// a second class of the same file, is a collision. Function names are the
/// module name by construction and are not claims of their own.
pub fn check_collisions(records: &[FileRecord]) -> ParserResult<()> {
    let mut claims: BTreeMap<&str, (&Path, DeclarationId)> = BTreeMap::new();

    for record in records {
        let declarations = record
            .qualified_names
            .iter()
            .filter(|(id, _)| !matches!(id, DeclarationId::Function(_)));

        for (id, name) in declarations {
            let claimant = (record.file_path.as_path(), *id);
            match claims.get(name.as_str()) {
                Some(previous) if *previous != claimant => {
                    return Err(ParserError::QualifiedNameCollision {
                        qualified_name: name.to_string(),
                        first: format!("{} ({})", previous.0.display(), previous.1),
                        second: format!("{} ({})", record.file_path.display(), id),
                    });
                }
                Some(_) => {}
                None => {
                    claims.insert(name.as_str(), claimant);
                }
            }
        }
    }
    Ok(())
}

/// Merge file records into one package tree per root.
///
/// Roots are checked for overlap and records for qualified-name collisions
/// before any tree is built. Each root's tree is then built independently.
#[instrument(skip_all, fields(files = records.len(), roots = roots.len()))]
pub fn merge(
    records: &[FileRecord],
    roots: &[PathBuf],
    workspace_root: &Path,
) -> ParserResult<MergeOutcome> {
    check_disjoint(roots)?;
    check_collisions(records)?;

    let root_parts: Vec<Vec<String>> = roots.iter().map(|r| owned_components(r)).collect();
    let mut assigned: Vec<Vec<&FileRecord>> = vec![Vec::new(); roots.len()];
    let mut unassigned = Vec::new();

    for record in records {
        let file_parts = owned_components(&record.file_path);
        let owner = root_parts
            .iter()
            .position(|root| file_parts.len() > root.len() && file_parts.starts_with(root));
        match owner {
            Some(index) => assigned[index].push(record),
            None => unassigned.push(record.file_path.clone()),
        }
    }

    let packages = roots
        .par_iter()
        .zip(root_parts.par_iter())
        .zip(assigned.into_par_iter())
        .map(|((root, parts), files)| build_tree(root, parts, workspace_root, files))
        .collect();

    Ok(MergeOutcome {
        packages,
        unassigned,
    })
}

fn build_tree(
    root: &Path,
    root_parts: &[String],
    workspace_root: &Path,
    files: Vec<&FileRecord>,
) -> UnoplatPackage {
    let mut package = UnoplatPackage::new(root_package_name(root, workspace_root));

    for record in files {
        let file_parts = owned_components(&record.file_path);
        let dirs: Vec<&str> = file_parts[root_parts.len()..file_parts.len() - 1]
            .iter()
            .map(String::as_str)
            .collect();
        package.insert(&dirs, record.clone());
    }

    debug!(
        package = %package.name,
        files = package.file_count(),
        packages = package.package_count(),
        "Merged root package"
    );
    package
}

/// Dotted name of a root package: its path relative to the workspace root, or
/// its directory name when it lies outside the workspace (or is the workspace)
pub fn root_package_name(root: &Path, workspace_root: &Path) -> String {
    let root_parts = owned_components(root);
    let workspace_parts = owned_components(workspace_root);

    if root_parts.len() > workspace_parts.len() && root_parts.starts_with(&workspace_parts) {
        return root_parts[workspace_parts.len()..].join(".");
    }
    root_parts.last().cloned().unwrap_or_default()
}

fn owned_components(path: &Path) -> Vec<String> {
    components(&path.to_string_lossy())
        .into_iter()
        .map(str::to_string)
        .collect()
}
