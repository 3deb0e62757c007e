use crate::entities::StructuralSignature;
use crate::errors::{ParserError, ParserResult};
use crate::language::Language;
use crate::qualified_name::{self, DeclarationId, QualifiedName};
use crate::relationships::{normalize_dependency_name, ImportRecord};
use crate::tree::SyntaxDiagnostic;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Raw file read into memory for one scan pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
    /// MD5 hex digest of `content`
    pub checksum: String,
    pub language: Language,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>, language: Language) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            checksum: checksum(&content),
            content,
            language,
        }
    }

    /// Read a file, enforcing the size limit and UTF-8 content
    pub fn read(path: &Path, max_file_size: usize) -> ParserResult<SourceFile> {
        let language = Language::from_path(path).ok_or_else(|| {
            ParserError::UnsupportedLanguage(
                path.to_path_buf(),
                "no language for file extension".to_string(),
            )
        })?;

        let metadata = fs::metadata(path).map_err(|e| ParserError::IoError(path.to_path_buf(), e))?;
        let size = metadata.len() as usize;
        if size > max_file_size {
            return Err(ParserError::FileTooLarge(path.to_path_buf(), size));
        }

        let bytes = fs::read(path).map_err(|e| ParserError::IoError(path.to_path_buf(), e))?;
        let content =
            String::from_utf8(bytes).map_err(|_| ParserError::InvalidEncoding(path.to_path_buf()))?;

        Ok(SourceFile::new(path, content, language))
    }

    /// Number of lines in the content
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// MD5 hex digest of file content
pub fn checksum(content: &str) -> String {
    format!("{:x}", md5::compute(content.as_bytes()))
}

/// Codebase-wide inputs shared by every file of a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanContext {
    /// Anchor for qualified names
    pub workspace_root: PathBuf,

    /// Disjoint package roots; empty means the workspace root itself
    pub root_packages: Vec<PathBuf>,

    /// Declared third-party dependency names, normalized
    pub known_external_dependencies: BTreeSet<String>,

    /// Language version selecting the standard-library module set (e.g. "3.12")
    pub stdlib_version: String,

    /// Top-level module names present under the workspace root
    pub local_modules: BTreeSet<String>,
}

impl ScanContext {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            root_packages: Vec::new(),
            known_external_dependencies: BTreeSet::new(),
            stdlib_version: String::new(),
            local_modules: BTreeSet::new(),
        }
    }

    pub fn with_root_packages(mut self, roots: Vec<PathBuf>) -> Self {
        self.root_packages = roots;
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known_external_dependencies = deps
            .into_iter()
            .map(|d| normalize_dependency_name(d.as_ref()))
            .collect();
        self
    }

    pub fn with_stdlib_version(mut self, version: impl Into<String>) -> Self {
        self.stdlib_version = version.into();
        self
    }

    pub fn with_local_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.local_modules = modules.into_iter().map(Into::into).collect();
        self
    }

    /// Roots to scan and merge under
    pub fn effective_roots(&self) -> Vec<PathBuf> {
        if self.root_packages.is_empty() {
            vec![self.workspace_root.clone()]
        } else {
            self.root_packages.clone()
        }
    }

    /// Record the top-level module of every path found under the workspace root
    pub fn index_local_modules(&mut self, paths: &[PathBuf]) {
        for path in paths {
            if let Ok(module) = qualified_name::module_path(path, &self.workspace_root) {
                if let Some(top) = module.segments().next() {
                    self.local_modules.insert(top.to_string());
                }
            }
        }
    }
}

/// Inputs available while classifying the imports of one file
#[derive(Debug, Clone, Copy)]
pub struct ImportContext<'a> {
    pub scan: &'a ScanContext,
    pub file_path: &'a Path,
    /// Dotted module path of the file, when it resolves
    pub module: Option<&'a QualifiedName>,
}

/// Structured output for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_path: PathBuf,
    pub checksum: String,
    pub language: Language,
    pub structural_signature: StructuralSignature,

    /// Classified imports, minus names consumed by inheritance resolution
    pub imports: Vec<ImportRecord>,

    /// Qualified name of every module, class and top-level function
    pub qualified_names: BTreeMap<DeclarationId, QualifiedName>,

    /// Dotted module path of the file (None when the workspace root is not in the path)
    pub module_qualified_name: Option<QualifiedName>,

    /// Why qualified names are missing, when they are
    pub qualified_name_error: Option<String>,

    /// File imports a data-model family (dataclasses, ORM models, ...)
    pub has_data_model: bool,

    /// Start and end line of each data-model class, keyed by its dotted path in the file
    #[serde(default)]
    pub data_model_positions: BTreeMap<String, (usize, usize)>,

    /// Recovered syntax problems
    pub diagnostics: Vec<SyntaxDiagnostic>,
}

impl FileRecord {
    /// Qualified name of a declaration
    pub fn qualified_name(&self, id: DeclarationId) -> Option<&QualifiedName> {
        self.qualified_names.get(&id)
    }

    /// Qualified name of a module-level class by name
    pub fn class_qualified_name(&self, name: &str) -> Option<&QualifiedName> {
        let signature = &self.structural_signature;
        signature
            .classes
            .iter()
            .find(|id| signature.class(**id).is_some_and(|c| c.name == name))
            .and_then(|id| self.qualified_names.get(&DeclarationId::Class(*id)))
    }

    /// Whether qualified names could not be computed for this file
    pub fn is_unqualified(&self) -> bool {
        self.qualified_name_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_checksum_is_md5_hex() {
        let file = SourceFile::new("/ws/a.py", "", Language::Python);
        assert_eq!(file.checksum, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(file.checksum.len(), 32);
    }

    #[test]
    fn test_read_rejects_large_and_non_utf8() {
        let dir = TempDir::new().unwrap();

        let big = dir.path().join("big.py");
        fs::write(&big, "x = 1\n".repeat(100)).unwrap();
        assert!(matches!(
            SourceFile::read(&big, 10),
            Err(ParserError::FileTooLarge(_, 600))
        ));

        let binary = dir.path().join("bin.py");
        let mut handle = fs::File::create(&binary).unwrap();
        handle.write_all(&[0x66, 0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            SourceFile::read(&binary, 1024),
            Err(ParserError::InvalidEncoding(_))
        ));

        let missing = dir.path().join("missing.py");
        assert!(matches!(
            SourceFile::read(&missing, 1024),
            Err(ParserError::IoError(..))
        ));
    }

    #[test]
    fn test_read_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ok.py");
        fs::write(&path, "import os\nprint(os.sep)\n").unwrap();

        let file = SourceFile::read(&path, 1024).unwrap();
        assert_eq!(file.language, Language::Python);
        assert_eq!(file.line_count(), 2);
    }

    #[test]
    fn test_index_local_modules() {
        let mut ctx = ScanContext::new("/ws").with_dependencies(["Requests", "python-dateutil"]);
        ctx.index_local_modules(&[
            PathBuf::from("/ws/json/encoder.py"),
            PathBuf::from("/ws/app.py"),
            PathBuf::from("/elsewhere/lib.py"),
        ]);

        let local: Vec<&str> = ctx.local_modules.iter().map(String::as_str).collect();
        assert_eq!(local, vec!["app", "json"]);
        assert!(ctx.known_external_dependencies.contains("requests"));
        assert!(ctx.known_external_dependencies.contains("python_dateutil"));
    }

    #[test]
    fn test_effective_roots_default_to_workspace() {
        let ctx = ScanContext::new("/ws");
        assert_eq!(ctx.effective_roots(), vec![PathBuf::from("/ws")]);
    }
}
