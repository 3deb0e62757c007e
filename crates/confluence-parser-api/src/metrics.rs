use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Metrics collected during a codebase scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserMetrics {
    /// Files handed to extraction or rejected while reading
    pub files_attempted: usize,

    /// Files that produced a record
    pub files_succeeded: usize,

    /// Files skipped and reported
    pub files_failed: usize,

    /// Files dropped by cancellation before being scheduled
    pub files_cancelled: usize,

    /// Total time spent in extraction
    #[serde(with = "duration_serde")]
    pub total_parse_time: Duration,

    /// Functions extracted (all nesting levels)
    pub total_functions: usize,

    /// Classes extracted (all nesting levels)
    pub total_classes: usize,

    /// Import records produced after grouping
    pub total_imports: usize,
}

// Helper module for serializing Duration
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: u64 = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

impl Default for ParserMetrics {
    fn default() -> Self {
        Self {
            files_attempted: 0,
            files_succeeded: 0,
            files_failed: 0,
            files_cancelled: 0,
            total_parse_time: Duration::ZERO,
            total_functions: 0,
            total_classes: 0,
            total_imports: 0,
        }
    }
}

impl ParserMetrics {
    /// Success rate (0.0 to 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.files_attempted == 0 {
            0.0
        } else {
            self.files_succeeded as f64 / self.files_attempted as f64
        }
    }

    /// Average parse time per file
    pub fn avg_parse_time(&self) -> Duration {
        if self.files_succeeded == 0 {
            Duration::ZERO
        } else {
            self.total_parse_time / self.files_succeeded as u32
        }
    }

    /// Merge another metrics object into this one
    pub fn merge(&mut self, other: &ParserMetrics) {
        self.files_attempted += other.files_attempted;
        self.files_succeeded += other.files_succeeded;
        self.files_failed += other.files_failed;
        self.files_cancelled += other.files_cancelled;
        self.total_parse_time += other.total_parse_time;
        self.total_functions += other.total_functions;
        self.total_classes += other.total_classes;
        self.total_imports += other.total_imports;
    }
}
