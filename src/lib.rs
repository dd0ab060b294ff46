//! Logcheck - logging coverage analysis.
//!
//! Logcheck parses Python, Java and JavaScript sources with tree-sitter and
//! describes every statement block with a fixed-schema feature vector: what
//! owns the block, how deeply it is nested, which statement and expression
//! kinds it contains, and whether it already holds a logging call. The
//! vectors are training rows for logging-prediction models; the same data
//! drives recommendations for exception handlers that never log.
//!
//! # Architecture
//!
//! - `analysis`: language profiles, analyzers and the extraction engine
//! - `batch`: file discovery and the parallel runner
//! - `config`: YAML configuration
//! - `recommend`: handler blocks without logging
//! - `report`: output formatting (CSV, JSON, pretty)
//!
//! # Example
//!
//! ```no_run
//! use logcheck::analysis::{get_analyzer_by_id, ExtractOptions, Extractor};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let analyzer = get_analyzer_by_id("python")?.expect("python is registered");
//! let extractor = Extractor::new(
//!     analyzer,
//!     analyzer.default_matcher().clone(),
//!     ExtractOptions { training: true, ..Default::default() },
//! );
//! let source = b"def f():\n    try:\n        run()\n    except Exception:\n        pass\n";
//! let parsed = analyzer.parse(Path::new("f.py"), source)?;
//! let extraction = extractor.extract("f.py", &parsed)?;
//! for vector in &extraction.vectors {
//!     println!("{}", serde_json::to_string(vector)?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod recommend;
pub mod report;

pub use analysis::{
    get_analyzer, get_analyzer_by_id, ExtractOptions, Extraction, Extractor, FeatureValue,
    FeatureVector, LanguageAnalyzer, LoggingMatcher, Schema,
};
pub use batch::{BatchResult, BatchSummary, FileOutcome, Runner};
pub use config::Config;
pub use error::{ConfigError, ExtractError, ProfileError};
pub use recommend::{recommend, Recommendation, Recommendations};
