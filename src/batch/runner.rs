//! Batch runner that extracts feature vectors from many files in parallel.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::analysis::Extractor;

use super::files::file_id;
use super::{BatchResult, FileOutcome};

/// Runs one extractor over a set of files.
///
/// Each file is an independent unit of work. A file that cannot be read,
/// decoded or extracted is recorded in its outcome and never stops the
/// other workers.
pub struct Runner<'a> {
    extractor: Extractor<'a>,
    base_dir: PathBuf,
    threads: Option<usize>,
    progress: bool,
}

impl<'a> Runner<'a> {
    /// Create a runner. Output file ids are relative to `base_dir`.
    pub fn new<P: AsRef<Path>>(extractor: Extractor<'a>, base_dir: P) -> Self {
        Self {
            extractor,
            base_dir: base_dir.as_ref().to_path_buf(),
            threads: None,
            progress: false,
        }
    }

    /// Use a dedicated pool of `threads` workers instead of the global pool.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Show a progress bar on stderr.
    pub fn progress(mut self, show: bool) -> Self {
        self.progress = show;
        self
    }

    /// Process every file. Outcomes keep the order of `files`.
    pub fn run(&self, files: &[PathBuf]) -> anyhow::Result<BatchResult> {
        let bar = self.progress_bar(files.len());

        let work = || -> Vec<FileOutcome> {
            files
                .par_iter()
                .map(|path| {
                    let outcome = self.process(path);
                    bar.inc(1);
                    outcome
                })
                .collect()
        };
        let outcomes = match self.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(work),
            None => work(),
        };
        bar.finish_and_clear();

        let result = BatchResult::new(self.extractor.schema().clone(), outcomes);
        tracing::info!(
            files = result.summary.files_total(),
            skipped = result.summary.files_skipped,
            failed = result.summary.files_failed,
            blocks = result.summary.blocks_seen,
            logged = result.summary.blocks_logged,
            "batch finished"
        );
        Ok(result)
    }

    /// Read, decode, parse and extract one file.
    pub fn process(&self, path: &Path) -> FileOutcome {
        let id = file_id(&self.base_dir, path);
        let path_buf = path.to_path_buf();

        let source = match std::fs::read(path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(file = %id, error = %e, "skipping unreadable file");
                return FileOutcome::skipped(path_buf, id, format!("read failed: {}", e));
            }
        };
        if let Err(e) = std::str::from_utf8(&source) {
            tracing::warn!(file = %id, error = %e, "skipping file that is not UTF-8");
            return FileOutcome::skipped(path_buf, id, format!("not valid UTF-8: {}", e));
        }

        let analyzer = self.extractor.analyzer();
        let parsed = match analyzer.parse(path, &source) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(file = %id, error = %e, "parse failed");
                return FileOutcome::failed(path_buf, id, format!("parse failed: {}", e));
            }
        };

        match self.extractor.extract(&id, &parsed) {
            Ok(extraction) => {
                FileOutcome::processed(path_buf, id, extraction.vectors, extraction.stats)
            }
            Err(e) => {
                tracing::warn!(file = %id, error = %e, "extraction aborted");
                FileOutcome::failed(path_buf, id, e.to_string())
            }
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar
    }
}
