//! Batch extraction over a directory tree.

mod files;
mod runner;
mod types;

pub use files::{build_exclusions, collect_files, file_id};
pub use runner::Runner;
pub use types::{BatchResult, BatchSummary, FileOutcome, FileStatus};
