//! Core types for batch results.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::analysis::{ExtractionStats, FeatureVector, Schema};

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum FileStatus {
    Processed,
    /// Read or decode failure. The file contributes no vectors.
    Skipped(String),
    /// Parse failure or a node kind the language profile does not know.
    Failed(String),
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Processed => "processed",
            FileStatus::Skipped(_) => "skipped",
            FileStatus::Failed(_) => "failed",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            FileStatus::Processed => None,
            FileStatus::Skipped(reason) | FileStatus::Failed(reason) => Some(reason),
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{}: {}", self.as_str(), reason),
            None => write!(f, "{}", self.as_str()),
        }
    }
}

/// Vectors and counts of one file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Path relative to the scanned root, used in output rows.
    pub file_id: String,
    pub status: FileStatus,
    pub vectors: Vec<FeatureVector>,
    pub stats: ExtractionStats,
}

impl FileOutcome {
    pub fn processed(
        path: PathBuf,
        file_id: String,
        vectors: Vec<FeatureVector>,
        stats: ExtractionStats,
    ) -> Self {
        Self {
            path,
            file_id,
            status: FileStatus::Processed,
            vectors,
            stats,
        }
    }

    pub fn skipped(path: PathBuf, file_id: String, reason: impl Into<String>) -> Self {
        Self::empty(path, file_id, FileStatus::Skipped(reason.into()))
    }

    pub fn failed(path: PathBuf, file_id: String, reason: impl Into<String>) -> Self {
        Self::empty(path, file_id, FileStatus::Failed(reason.into()))
    }

    fn empty(path: PathBuf, file_id: String, status: FileStatus) -> Self {
        Self {
            path,
            file_id,
            status,
            vectors: Vec::new(),
            stats: ExtractionStats::default(),
        }
    }

    pub fn is_processed(&self) -> bool {
        self.status == FileStatus::Processed
    }
}

/// Aggregate counts over a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub blocks_seen: usize,
    pub blocks_discarded: usize,
    pub blocks_logged: usize,
    pub vectors_emitted: usize,
}

impl BatchSummary {
    /// Count one file outcome.
    pub fn add(&mut self, outcome: &FileOutcome) {
        match outcome.status {
            FileStatus::Processed => self.files_processed += 1,
            FileStatus::Skipped(_) => self.files_skipped += 1,
            FileStatus::Failed(_) => self.files_failed += 1,
        }
        self.blocks_seen += outcome.stats.blocks_seen;
        self.blocks_discarded += outcome.stats.blocks_discarded;
        self.blocks_logged += outcome.stats.blocks_logged;
        self.vectors_emitted += outcome.vectors.len();
    }

    pub fn files_total(&self) -> usize {
        self.files_processed + self.files_skipped + self.files_failed
    }
}

/// Results of a batch run, in input order.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub schema: Arc<Schema>,
    pub outcomes: Vec<FileOutcome>,
    pub summary: BatchSummary,
}

impl BatchResult {
    pub fn new(schema: Arc<Schema>, outcomes: Vec<FileOutcome>) -> Self {
        let mut summary = BatchSummary::default();
        for outcome in &outcomes {
            summary.add(outcome);
        }
        Self {
            schema,
            outcomes,
            summary,
        }
    }

    /// Every emitted vector with the file it came from.
    pub fn vectors(&self) -> impl Iterator<Item = (&FileOutcome, &FeatureVector)> {
        self.outcomes
            .iter()
            .flat_map(|o| o.vectors.iter().map(move |v| (o, v)))
    }

    /// Outcomes of files that were skipped or failed.
    pub fn problems(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_processed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_statuses_and_blocks() {
        let stats = ExtractionStats {
            blocks_seen: 4,
            blocks_discarded: 1,
            blocks_logged: 2,
        };
        let outcomes = [
            FileOutcome::processed("a.py".into(), "a.py".into(), Vec::new(), stats),
            FileOutcome::skipped("b.py".into(), "b.py".into(), "not valid UTF-8"),
            FileOutcome::failed("c.py".into(), "c.py".into(), "unknown kind"),
        ];

        let mut summary = BatchSummary::default();
        for outcome in &outcomes {
            summary.add(outcome);
        }
        assert_eq!(summary.files_processed, 1);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.files_failed, 1);
        assert_eq!(summary.files_total(), 3);
        assert_eq!(summary.blocks_seen, 4);
        assert_eq!(summary.blocks_discarded, 1);
        assert_eq!(summary.blocks_logged, 2);
        assert_eq!(summary.vectors_emitted, 0);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(FileStatus::Processed.to_string(), "processed");
        assert_eq!(
            FileStatus::Skipped("not valid UTF-8".into()).to_string(),
            "skipped: not valid UTF-8"
        );
    }
}
