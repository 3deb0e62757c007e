//! Concurrent codebase scan
//!
//! Files are discovered and read up front, so the parallel stage never blocks
//! on I/O. Extraction then runs on a bounded rayon pool; the only state shared
//! between workers is the atomic progress counter and the cancellation flag.

use crate::config::ParserConfig;
use crate::errors::{ParserError, ParserResult};
use crate::file::{FileRecord, ScanContext, SourceFile};
use crate::language::Language;
use crate::metrics::ParserMetrics;
use crate::package;
use crate::registry::StrategyRegistry;
use crate::report::{FailureStage, FileFailure, ScanReport};
use crate::traits::LanguageStrategy;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Progress of a running scan, readable from any thread
#[derive(Debug, Default)]
pub struct ScanProgress {
    processed: AtomicUsize,
    total: AtomicUsize,
}

impl ScanProgress {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Files finished (successfully or not)
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    /// Files scheduled for extraction
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Completed fraction in 0.0..=1.0
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.processed() as f64 / total as f64
    }

    fn start(&self, total: usize) {
        self.processed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    fn tick(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Cooperative cancellation, honored between files
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every file not yet started
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Extraction {
    Done(FileRecord, Duration),
    Failed(PathBuf, ParserError),
    Cancelled(PathBuf),
}

/// Scans a codebase with the strategies of a registry
pub struct CodebaseScanner<'r> {
    registry: &'r StrategyRegistry,
    config: ParserConfig,
    progress: Arc<ScanProgress>,
    cancellation: CancellationToken,
}

impl<'r> CodebaseScanner<'r> {
    pub fn new(registry: &'r StrategyRegistry, config: ParserConfig) -> Self {
        Self {
            registry,
            config,
            progress: ScanProgress::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Report progress through a shared counter
    pub fn with_progress(mut self, progress: Arc<ScanProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Observe an external cancellation flag
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn progress(&self) -> Arc<ScanProgress> {
        Arc::clone(&self.progress)
    }

    /// Files under the root packages that some strategy claims, in walk order.
    ///
    /// Walk errors are returned as read failures.
    pub fn discover_files(&self, ctx: &ScanContext) -> (Vec<PathBuf>, Vec<FileFailure>) {
        let mut files = Vec::new();
        let mut failures = Vec::new();

        for root in ctx.effective_roots() {
            let walker = WalkDir::new(&root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| {
                    if e.depth() > 0 && e.file_type().is_dir() {
                        if let Some(name) = e.file_name().to_str() {
                            return !self.config.should_exclude_dir(name);
                        }
                    }
                    true
                });

            for entry in walker {
                match entry {
                    Ok(entry) => {
                        let claimed = self.registry.for_path(entry.path()).is_some();
                        if entry.file_type().is_file() && claimed {
                            files.push(entry.path().to_path_buf());
                        }
                    }
                    Err(e) => {
                        let path = e
                            .path()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| root.clone());
                        failures.push(FileFailure::new(path, FailureStage::Read, e.to_string()));
                    }
                }
            }
        }

        (files, failures)
    }

    /// Every source file under the workspace root, package `__init__` files
    /// included, whether or not a strategy would scan it.
    ///
    /// Feeds the local module index, so a workspace package named like a
    /// standard-library module shadows it even outside the root packages.
    pub fn discover_workspace_modules(&self, ctx: &ScanContext) -> Vec<PathBuf> {
        WalkDir::new(&ctx.workspace_root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() > 0 && e.file_type().is_dir() {
                    if let Some(name) = e.file_name().to_str() {
                        return !self.config.should_exclude_dir(name);
                    }
                }
                true
            })
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && Language::from_path(e.path()).is_some())
            .map(|e| e.into_path())
            .collect()
    }

    /// Scan one codebase end to end.
    ///
    /// # Errors
    /// Only configuration problems are returned as `Err`: an invalid config,
    /// overlapping root packages, or a pool that cannot be built. Everything
    /// else lands in the report.
    #[instrument(skip_all, fields(workspace = %ctx.workspace_root.display()))]
    pub fn scan(&self, ctx: &ScanContext) -> ParserResult<ScanReport> {
        self.config.validate().map_err(ParserError::InvalidConfig)?;

        let roots = ctx.effective_roots();
        package::check_disjoint(&roots)?;

        info!(roots = roots.len(), "Starting codebase scan");

        let (paths, mut failures) = self.discover_files(ctx);

        let mut sources = Vec::with_capacity(paths.len());
        for path in &paths {
            match SourceFile::read(path, self.config.max_file_size) {
                Ok(source) => sources.push(source),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                    failures.push(FileFailure::from_error(path, FailureStage::Read, &e));
                }
            }
        }

        let mut ctx = ctx.clone();
        let workspace_modules = self.discover_workspace_modules(&ctx);
        ctx.index_local_modules(&workspace_modules);
        ctx.index_local_modules(&paths);
        debug!(local_modules = ctx.local_modules.len(), "Indexed workspace modules");

        let pool = if self.config.parallel {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if let Some(workers) = self.config.parallel_workers {
                builder = builder.num_threads(workers);
            }
            Some(builder.build().map_err(|e| ParserError::ThreadPool(e.to_string()))?)
        } else {
            None
        };

        self.progress.start(sources.len());
        let extractions: Vec<Extraction> = match &pool {
            Some(pool) => pool.install(|| {
                sources
                    .par_iter()
                    .map(|file| self.extract(file, &ctx))
                    .collect()
            }),
            None => sources.iter().map(|file| self.extract(file, &ctx)).collect(),
        };

        let mut report = ScanReport::default();
        let mut metrics = ParserMetrics {
            files_attempted: paths.len(),
            files_failed: failures.len(),
            ..Default::default()
        };

        for extraction in extractions {
            match extraction {
                Extraction::Done(record, elapsed) => {
                    metrics.files_succeeded += 1;
                    metrics.total_parse_time += elapsed;
                    metrics.total_functions += record.structural_signature.function_count();
                    metrics.total_classes += record.structural_signature.class_count();
                    metrics.total_imports += record.imports.len();
                    if let Some(reason) = &record.qualified_name_error {
                        failures.push(FileFailure::new(
                            &record.file_path,
                            FailureStage::QualifiedName,
                            reason.clone(),
                        ));
                    }
                    report.files.push(record);
                }
                Extraction::Failed(path, e) => {
                    metrics.files_failed += 1;
                    failures.push(FileFailure::from_error(path, FailureStage::Parse, &e));
                }
                Extraction::Cancelled(path) => {
                    metrics.files_cancelled += 1;
                    report.cancelled.push(path);
                }
            }
        }

        let merge = || package::merge(&report.files, &roots, &ctx.workspace_root);
        let merged = match &pool {
            Some(pool) => pool.install(merge),
            None => merge(),
        };
        match merged {
            Ok(outcome) => {
                for path in outcome.unassigned {
                    failures.push(FileFailure::new(
                        path,
                        FailureStage::Merge,
                        "file lies under no root package",
                    ));
                }
                report.packages = outcome.packages;
            }
            Err(e) => {
                warn!(error = %e, "Codebase merge aborted");
                report.codebase_error = Some(e);
            }
        }

        report.failures = failures;
        report.metrics = metrics;

        info!(
            files_parsed = report.metrics.files_succeeded,
            files_failed = report.metrics.files_failed,
            files_cancelled = report.metrics.files_cancelled,
            total_functions = report.metrics.total_functions,
            total_classes = report.metrics.total_classes,
            packages = report.packages.len(),
            total_time_ms = report.metrics.total_parse_time.as_millis(),
            "Codebase scan completed"
        );

        Ok(report)
    }

    fn extract(&self, file: &SourceFile, ctx: &ScanContext) -> Extraction {
        if self.cancellation.is_cancelled() {
            return Extraction::Cancelled(file.path.clone());
        }

        let start = Instant::now();
        let result = match self.registry.get(file.language) {
            Some(strategy) => strategy.process_file(file, ctx, &self.config),
            None => Err(ParserError::UnsupportedLanguage(
                file.path.clone(),
                format!("no strategy registered for {}", file.language),
            )),
        };
        self.progress.tick();

        match result {
            Ok(record) => Extraction::Done(record, start.elapsed()),
            Err(e) => {
                debug!(file = %file.path.display(), error = %e, "Extraction failed");
                Extraction::Failed(file.path.clone(), e)
            }
        }
    }
}

/// Run the per-file pipeline for a single in-memory file
#[instrument(skip_all, fields(file = %file.path.display()))]
pub fn process_file(
    strategy: &dyn LanguageStrategy,
    file: &SourceFile,
    ctx: &ScanContext,
    config: &ParserConfig,
) -> ParserResult<FileRecord> {
    strategy.process_file(file, ctx, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ClassInfo, StructuralSignature};
    use crate::file::ImportContext;
    use crate::language::Language;
    use crate::relationships::{ImportRecord, ImportType, RawImportStatement};
    use crate::tree::{capture_nodes, node_text, ParseTree};
    use std::fs;
    use tempfile::TempDir;

    /// Records top-level classes only
    struct ClassesOnly;

    impl LanguageStrategy for ClassesOnly {
        fn language(&self) -> Language {
            Language::Python
        }

        fn file_extensions(&self) -> &[&str] {
            &[".py"]
        }

        fn grammar(&self) -> tree_sitter::Language {
            tree_sitter_python::language()
        }

        fn extract_signature(
            &self,
            tree: &ParseTree,
            source: &str,
            _config: &ParserConfig,
        ) -> StructuralSignature {
            let mut signature = StructuralSignature::new();
            for node in capture_nodes(tree.root_node(), &["class_definition"]) {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source))
                    .unwrap_or_default();
                let (start, end) = crate::tree::line_span(node);
                let id = signature.alloc_class(ClassInfo::new(name, start, end));
                signature.classes.push(id);
            }
            signature
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

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_progress_fraction() {
        let progress = ScanProgress::new();
        assert_eq!(progress.fraction(), 0.0);
        progress.start(4);
        progress.tick();
        assert_eq!(progress.processed(), 1);
        assert_eq!(progress.fraction(), 0.25);
    }

    #[test]
    fn test_scan_counts_every_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app/a.py", "class A:\n    pass\n");
        write(dir.path(), "app/sub/b.py", "class B:\n    pass\n");
        write(dir.path(), "app/__pycache__/c.py", "class C:\n    pass\n");
        write(dir.path(), "app/notes.txt", "not python");

        let registry = StrategyRegistry::new().with(Box::new(ClassesOnly));
        let progress = ScanProgress::new();
        let scanner = CodebaseScanner::new(&registry, ParserConfig::default().with_workers(2))
            .with_progress(Arc::clone(&progress));

        let ctx = ScanContext::new(dir.path()).with_root_packages(vec![dir.path().join("app")]);
        let report = scanner.scan(&ctx).unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(progress.processed(), 2);
        assert_eq!(progress.total(), 2);
        assert!(report.is_clean(), "failures: {:?}", report.failures);
        assert_eq!(report.packages.len(), 1);
        assert_eq!(report.packages[0].name, "app");
        assert_eq!(report.packages[0].file_count(), 2);
    }

    #[test]
    fn test_cancelled_scan_drops_all_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.py", "x = 1\n");
        write(dir.path(), "b.py", "y = 2\n");

        let registry = StrategyRegistry::new().with(Box::new(ClassesOnly));
        let token = CancellationToken::new();
        token.cancel();
        let scanner = CodebaseScanner::new(&registry, ParserConfig::default().with_parallel(false))
            .with_cancellation(token);

        let report = scanner.scan(&ScanContext::new(dir.path())).unwrap();
        assert!(report.files.is_empty());
        assert_eq!(report.cancelled.len(), 2);
        assert_eq!(report.metrics.files_cancelled, 2);
    }

    #[test]
    fn test_workspace_modules_include_unclaimed_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "json/__init__.py", "");
        write(dir.path(), "app/main.py", "import json\n");
        write(dir.path(), "node_modules/x/y.py", "");
        write(dir.path(), "README.md", "");

        let registry = StrategyRegistry::new().with(Box::new(ClassesOnly));
        let scanner = CodebaseScanner::new(&registry, ParserConfig::default());
        let ctx = ScanContext::new(dir.path()).with_root_packages(vec![dir.path().join("app")]);

        let modules = scanner.discover_workspace_modules(&ctx);
        let relative: Vec<PathBuf> = modules
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![PathBuf::from("app/main.py"), PathBuf::from("json/__init__.py")]
        );

        let mut indexed = ctx.clone();
        indexed.index_local_modules(&modules);
        assert!(indexed.local_modules.contains("json"));
        assert!(indexed.local_modules.contains("app"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let registry = StrategyRegistry::new();
        let scanner = CodebaseScanner::new(&registry, ParserConfig::default().with_workers(0));
        let result = scanner.scan(&ScanContext::new("/nonexistent"));
        assert!(matches!(result, Err(ParserError::InvalidConfig(_))));
    }
}
