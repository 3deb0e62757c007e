use crate::errors::ParserError;
use crate::file::FileRecord;
use crate::metrics::ParserMetrics;
use crate::package::UnoplatPackage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Pipeline stage at which a file was given up on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Read,
    Parse,
    QualifiedName,
    Merge,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            FailureStage::Read => "read",
            FailureStage::Parse => "parse",
            FailureStage::QualifiedName => "qualified_name",
            FailureStage::Merge => "merge",
        };
        f.write_str(stage)
    }
}

/// A per-file problem, reported without stopping the scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub stage: FailureStage,
    pub message: String,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            stage,
            message: message.into(),
        }
    }

    pub fn from_error(path: impl Into<PathBuf>, stage: FailureStage, error: &ParserError) -> Self {
        Self::new(path, stage, error.to_string())
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path.display(), self.stage, self.message)
    }
}

/// Everything one codebase scan produced
///
/// Successful records are always returned, even when a codebase-level error
/// prevented the package trees from being built.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Successful per-file records, in discovery order
    pub files: Vec<FileRecord>,

    /// One package tree per root package (empty when `codebase_error` is set)
    pub packages: Vec<UnoplatPackage>,

    /// Files skipped or flagged, with the stage and reason
    pub failures: Vec<FileFailure>,

    /// Files dropped by cancellation before extraction started on them
    pub cancelled: Vec<PathBuf>,

    /// Error that aborted the merge for the whole codebase
    pub codebase_error: Option<ParserError>,

    pub metrics: ParserMetrics,
}

impl ScanReport {
    /// Whether every discovered file made it into a package tree
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.cancelled.is_empty() && self.codebase_error.is_none()
    }

    /// Failures at one stage
    pub fn failures_at(&self, stage: FailureStage) -> impl Iterator<Item = &FileFailure> + '_ {
        self.failures.iter().filter(move |f| f.stage == stage)
    }

    /// Record for a path, if extraction succeeded
    pub fn file(&self, path: &std::path::Path) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.file_path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let failure = FileFailure::new("/ws/a.py", FailureStage::Read, "not valid UTF-8");
        assert_eq!(failure.to_string(), "/ws/a.py [read]: not valid UTF-8");
    }

    #[test]
    fn test_report_cleanliness() {
        let mut report = ScanReport::default();
        assert!(report.is_clean());

        report
            .failures
            .push(FileFailure::new("/ws/b.py", FailureStage::Parse, "syntax"));
        assert!(!report.is_clean());
        assert_eq!(report.failures_at(FailureStage::Parse).count(), 1);
        assert_eq!(report.failures_at(FailureStage::Read).count(), 0);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&FailureStage::QualifiedName).unwrap();
        assert_eq!(json, "\"qualified_name\"");
    }
}
