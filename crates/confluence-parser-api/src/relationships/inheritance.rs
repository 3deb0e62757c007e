//! Inheritance resolution against a file's internal imports

use super::imports::ImportRecord;
use crate::entities::{ClassInfo, StructuralSignature};
use std::collections::{BTreeMap, BTreeSet};

/// (record index, name index) of an imported name
type NameKey = (usize, usize);

/// Qualify a class's base names using `internal_imports`.
///
/// Each base is matched against the usage names of the imports (alias when
/// present, else the original name) and rewritten in place to
/// `source.original_name`. A dotted base (`models.Base`) matches on its first
/// segment. Imported names consumed this way are removed from the returned
/// collection, and a record left without names is dropped. Unmatched bases
/// stay as written.
pub fn resolve_inheritance(
    class: &mut ClassInfo,
    internal_imports: Vec<ImportRecord>,
) -> Vec<ImportRecord> {
    let usage = usage_index(&internal_imports);
    let consumed = qualify_bases(class, &internal_imports, &usage);
    remove_consumed(internal_imports, &consumed)
}

/// Resolve every class of a file, at any depth.
///
/// Each class sees the full import set; the returned collection excludes the
/// names consumed by any of them.
pub fn resolve_signature_inheritance(
    signature: &mut StructuralSignature,
    internal_imports: Vec<ImportRecord>,
) -> Vec<ImportRecord> {
    let usage = usage_index(&internal_imports);
    let mut consumed = BTreeSet::new();
    for class in signature.class_arena.iter_mut() {
        consumed.extend(qualify_bases(class, &internal_imports, &usage));
    }
    remove_consumed(internal_imports, &consumed)
}

fn usage_index(imports: &[ImportRecord]) -> BTreeMap<&str, NameKey> {
    let mut usage = BTreeMap::new();
    for (r, record) in imports.iter().enumerate() {
        for (n, name) in record.names.iter().enumerate() {
            if name.is_wildcard() {
                continue;
            }
            // later bindings shadow earlier ones
            usage.insert(name.usage_name(), (r, n));
        }
    }
    usage
}

fn qualify_bases(
    class: &mut ClassInfo,
    imports: &[ImportRecord],
    usage: &BTreeMap<&str, NameKey>,
) -> BTreeSet<NameKey> {
    let mut consumed = BTreeSet::new();

    for base in class.bases.iter_mut() {
        let (key, rest) = match usage.get(base.as_str()) {
            Some(key) => (*key, None),
            None => match base.split_once('.') {
                Some((head, tail)) => match usage.get(head) {
                    Some(key) => (*key, Some(tail.to_string())),
                    None => continue,
                },
                None => continue,
            },
        };

        let record = &imports[key.0];
        let target = record.names[key.1].target(&record.source);
        *base = match rest {
            Some(tail) => format!("{target}.{tail}"),
            None => target,
        };
        consumed.insert(key);
    }

    consumed
}

fn remove_consumed(imports: Vec<ImportRecord>, consumed: &BTreeSet<NameKey>) -> Vec<ImportRecord> {
    if consumed.is_empty() {
        return imports;
    }

    imports
        .into_iter()
        .enumerate()
        .filter_map(|(r, mut record)| {
            let mut n = 0;
            record.names.retain(|_| {
                let keep = !consumed.contains(&(r, n));
                n += 1;
                keep
            });
            (!record.names.is_empty()).then_some(record)
        })
        .collect()
}
