use crate::language::Language;
use crate::traits::LanguageStrategy;
use std::collections::BTreeMap;
use std::path::Path;

/// Registry of language strategies, keyed by language
///
/// Constructed explicitly and handed to the scanner; there is no global
/// instance.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<Language, Box<dyn LanguageStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy, replacing any previous one for its language
    pub fn register(&mut self, strategy: Box<dyn LanguageStrategy>) {
        self.strategies.insert(strategy.language(), strategy);
    }

    /// Builder-style [`StrategyRegistry::register`]
    pub fn with(mut self, strategy: Box<dyn LanguageStrategy>) -> Self {
        self.register(strategy);
        self
    }

    /// Strategy for a language
    pub fn get(&self, language: Language) -> Option<&dyn LanguageStrategy> {
        self.strategies.get(&language).map(|s| s.as_ref())
    }

    /// Strategy that claims a file, skipping ignored file names
    pub fn for_path(&self, path: &Path) -> Option<&dyn LanguageStrategy> {
        self.strategies
            .values()
            .map(|s| s.as_ref())
            .find(|s| s.can_parse(path) && !s.is_ignored(path))
    }

    /// Registered languages
    pub fn languages(&self) -> Vec<Language> {
        self.strategies.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::entities::StructuralSignature;
    use crate::file::ImportContext;
    use crate::relationships::{ImportRecord, ImportType, RawImportStatement};
    use crate::tree::ParseTree;

    struct Stub;

    impl LanguageStrategy for Stub {
        fn language(&self) -> Language {
            Language::Python
        }

        fn file_extensions(&self) -> &[&str] {
            &[".py", ".pyi"]
        }

        fn ignored_file_names(&self) -> &[&str] {
            &["__init__.py"]
        }

        fn grammar(&self) -> tree_sitter::Language {
            tree_sitter_python::language()
        }

        fn extract_signature(
            &self,
            _tree: &ParseTree,
            _source: &str,
            _config: &ParserConfig,
        ) -> StructuralSignature {
            StructuralSignature::new()
        }

        fn extract_imports(&self, _tree: &ParseTree, _source: &str) -> Vec<RawImportStatement> {
            Vec::new()
        }

        fn classify_import(
            &self,
            raw: &RawImportStatement,
            _ctx: &ImportContext<'_>,
        ) -> ImportRecord {
            ImportRecord::new(raw.source.clone(), ImportType::Internal)
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = StrategyRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(Language::Python).is_none());
        assert!(registry.for_path(Path::new("a.py")).is_none());
    }

    #[test]
    fn test_lookup_by_language_and_path() {
        let registry = StrategyRegistry::new().with(Box::new(Stub));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.languages(), vec![Language::Python]);
        assert!(registry.get(Language::Python).is_some());
        assert!(registry.for_path(Path::new("pkg/models.py")).is_some());
        assert!(registry.for_path(Path::new("pkg/stubs.pyi")).is_some());
        assert!(registry.for_path(Path::new("pkg/__init__.py")).is_none());
        assert!(registry.for_path(Path::new("pkg/readme.md")).is_none());
    }

    #[test]
    fn test_register_replaces_same_language() {
        let mut registry = StrategyRegistry::new();
        registry.register(Box::new(Stub));
        registry.register(Box::new(Stub));
        assert_eq!(registry.len(), 1);
    }
}
