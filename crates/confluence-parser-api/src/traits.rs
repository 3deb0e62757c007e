use crate::config::ParserConfig;
use crate::entities::StructuralSignature;
use crate::errors::{ParserError, ParserResult};
use crate::file::{FileRecord, ImportContext, ScanContext, SourceFile};
use crate::language::Language;
use crate::qualified_name::{self, DeclarationId, DeclarationKind, QualifiedName};
use crate::relationships::{
    data_model_positions, group_by_source, has_data_model, qualify_calls,
    resolve_signature_inheritance, CallResolver, DataModelMarker, ImportRecord, RawImportStatement,
};
use crate::tree::{ParseTree, TreeBuilder};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Per-language extraction strategy
///
/// A strategy knows its grammar and how to read declarations and imports out
/// of a [`ParseTree`]. Everything that is the same for every language
/// (qualified names, call qualification, inheritance, record assembly) lives in
/// the provided [`LanguageStrategy::process_file`].
///
/// Strategies must be `Send + Sync` so one instance can serve every worker of
/// a parallel scan.
pub trait LanguageStrategy: Send + Sync {
    /// Language this strategy handles
    fn language(&self) -> Language;

    /// File extensions this strategy handles (e.g. `[".py"]`)
    fn file_extensions(&self) -> &[&str];

    /// File names skipped during discovery even when the extension matches
    fn ignored_file_names(&self) -> &[&str] {
        &[]
    }

    /// Grammar used by the tree builder
    fn grammar(&self) -> tree_sitter::Language;

    /// Build the syntax tree for a source string
    fn parse(&self, source: &str, path: &Path, config: &ParserConfig) -> ParserResult<ParseTree> {
        TreeBuilder::new(self.language(), self.grammar())
            .strict(config.strict_syntax)
            .build(source, path)
    }

    /// Declaration outline of one file
    fn extract_signature(
        &self,
        tree: &ParseTree,
        source: &str,
        config: &ParserConfig,
    ) -> StructuralSignature;

    /// Import statements as written, in document order
    fn extract_imports(&self, tree: &ParseTree, source: &str) -> Vec<RawImportStatement>;

    /// Classify one import statement
    fn classify_import(&self, raw: &RawImportStatement, ctx: &ImportContext<'_>) -> ImportRecord;

    /// Qualified name of a declaration
    fn resolve_qualified_name(
        &self,
        declaration_name: &str,
        kind: DeclarationKind,
        file_path: &Path,
        workspace_root: &Path,
    ) -> ParserResult<QualifiedName> {
        qualified_name::resolve(declaration_name, kind, file_path, workspace_root)
    }

    /// Import families that mark a file as defining data models
    fn data_model_markers(&self) -> &[DataModelMarker] {
        &[]
    }

    /// Check if this strategy handles the given file
    fn can_parse(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.file_extensions()
            .iter()
            .any(|ext| file_name.ends_with(ext) && file_name.len() > ext.len())
    }

    /// Check if discovery should skip this file
    fn is_ignored(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.ignored_file_names().contains(&name))
    }

    /// Run the full per-file pipeline: parse, extract, classify, qualify.
    ///
    /// A file whose path does not contain the workspace root still produces a
    /// record; its qualified names are empty and `qualified_name_error` says
    /// why.
    ///
    /// # Errors
    /// Parse failures and a language mismatch between file and strategy.
    fn process_file(
        &self,
        file: &SourceFile,
        ctx: &ScanContext,
        config: &ParserConfig,
    ) -> ParserResult<FileRecord> {
        if file.language != self.language() {
            return Err(ParserError::UnsupportedLanguage(
                file.path.clone(),
                format!("{} strategy cannot process {} source", self.language(), file.language),
            ));
        }

        let tree = self.parse(&file.content, &file.path, config)?;
        let mut signature = self.extract_signature(&tree, &file.content, config);

        let module_name = self.resolve_qualified_name(
            "",
            DeclarationKind::Module,
            &file.path,
            &ctx.workspace_root,
        );
        let (module, qualified_name_error) = match module_name {
            Ok(module) => (Some(module), None),
            Err(e) => {
                warn!(file = %file.path.display(), error = %e, "Qualified names unavailable");
                (None, Some(e.to_string()))
            }
        };

        let import_ctx = ImportContext {
            scan: ctx,
            file_path: &file.path,
            module: module.as_ref(),
        };
        let raw_imports = self.extract_imports(&tree, &file.content);
        let imports = group_by_source(
            raw_imports
                .iter()
                .map(|raw| self.classify_import(raw, &import_ctx))
                .collect(),
        );

        // both computed before inheritance consumes names and rewrites bases
        let data_model = has_data_model(&imports, self.data_model_markers());

        let resolver = CallResolver::new(&imports, &signature, module.as_ref());
        let positions = data_model_positions(&signature, &resolver, self.data_model_markers());
        qualify_calls(&mut signature, &resolver);

        let imports = resolve_inheritance_in_order(&mut signature, imports);

        let qualified_names = match &module {
            Some(module) => qualify_declarations(&signature, module, config),
            None => BTreeMap::new(),
        };

        debug!(
            file = %file.path.display(),
            functions = signature.function_count(),
            classes = signature.class_count(),
            imports = imports.len(),
            "Processed file"
        );

        Ok(FileRecord {
            file_path: file.path.clone(),
            checksum: file.checksum.clone(),
            language: file.language,
            structural_signature: signature,
            imports,
            qualified_names,
            module_qualified_name: module,
            qualified_name_error,
            has_data_model: data_model,
            data_model_positions: positions,
            diagnostics: tree.diagnostics().to_vec(),
        })
    }
}

/// Run inheritance resolution over the internal records only, then put the
/// survivors back in their original positions among the other records.
fn resolve_inheritance_in_order(
    signature: &mut StructuralSignature,
    imports: Vec<ImportRecord>,
) -> Vec<ImportRecord> {
    let internal: Vec<ImportRecord> = imports
        .iter()
        .filter(|r| r.is_internal())
        .cloned()
        .collect();
    if internal.is_empty() {
        return imports;
    }

    let mut remaining: BTreeMap<String, ImportRecord> =
        resolve_signature_inheritance(signature, internal)
            .into_iter()
            .map(|record| (record.source.clone(), record))
            .collect();

    imports
        .into_iter()
        .filter_map(|record| {
            if record.is_internal() {
                remaining.remove(&record.source)
            } else {
                Some(record)
            }
        })
        .collect()
}

fn qualify_declarations(
    signature: &StructuralSignature,
    module: &QualifiedName,
    config: &ParserConfig,
) -> BTreeMap<DeclarationId, QualifiedName> {
    let mut names = BTreeMap::new();
    names.insert(DeclarationId::Module, module.clone());

    for (id, path) in signature.class_paths() {
        let name = if config.qualify_nested_classes {
            path.join(".")
        } else {
            path.last().cloned().unwrap_or_default()
        };
        names.insert(DeclarationId::Class(id), module.child(&name));
    }

    for id in &signature.functions {
        names.insert(DeclarationId::Function(*id), module.clone());
    }

    names
}
