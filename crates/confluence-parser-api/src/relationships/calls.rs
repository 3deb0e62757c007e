//! Call-name qualification
//!
//! Call names are recorded as written (`helper`, `np.array`, `self.save`).
//! After imports are known, a call whose leading dotted segments match an
//! imported usage name or a module-level definition is rewritten to the full
//! dotted target.

use super::imports::ImportRecord;
use crate::entities::StructuralSignature;
use crate::qualified_name::QualifiedName;
use std::collections::BTreeMap;

/// Lookup from usage names to dotted targets
#[derive(Debug, Clone, Default)]
pub struct CallResolver {
    targets: BTreeMap<String, String>,
}

impl CallResolver {
    /// Build from a file's grouped imports and, when the file resolves to a
    /// module, its module-level definitions.
    ///
    /// Local definitions shadow imports of the same name.
    pub fn new(
        imports: &[ImportRecord],
        signature: &StructuralSignature,
        module: Option<&QualifiedName>,
    ) -> Self {
        let mut targets = BTreeMap::new();

        for record in imports {
            for name in record.names.iter().filter(|n| !n.is_wildcard()) {
                targets.insert(name.usage_name().to_string(), name.target(&record.source));
            }
        }

        if let Some(module) = module {
            let local = signature
                .top_level_functions()
                .map(|f| f.name.as_str())
                .chain(signature.top_level_classes().map(|c| c.name.as_str()));
            for name in local {
                targets.insert(name.to_string(), module.child(name).to_string());
            }
        }

        Self { targets }
    }

    /// Qualify one call name, or return it unchanged
    pub fn qualify(&self, call: &str) -> String {
        if call.contains(['(', '[']) {
            return call.to_string();
        }

        // longest matching dotted prefix wins
        let mut end = call.len();
        loop {
            let prefix = &call[..end];
            if let Some(target) = self.targets.get(prefix) {
                return format!("{}{}", target, &call[end..]);
            }
            match prefix.rfind('.') {
                Some(dot) => end = dot,
                None => return call.to_string(),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Rewrite every function's call list in place
pub fn qualify_calls(signature: &mut StructuralSignature, resolver: &CallResolver) {
    if resolver.is_empty() {
        return;
    }
    for function in signature.function_arena.iter_mut() {
        for call in function.function_calls.iter_mut() {
            *call = resolver.qualify(call);
        }
    }
}
