//! AST-backed block feature extraction.
//!
//! This module turns a tree-sitter tree into one feature vector per
//! statement block: where the block sits (type, parent, grandparent,
//! depths), what it contains (`contains_*` counters) and whether it already
//! logs (`contains_logging`).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source Files    │────▶│ Analyzers    │────▶│ ParsedFile    │
//! └─────────────────┘     │ (profile,    │     └───────────────┘
//!                         │  queries)    │             │
//!                         └──────────────┘             ▼
//!                                              ┌───────────────┐
//!                         ┌──────────────┐     │ Extractor     │
//!                         │ Feature      │◀────│ context →     │
//!                         │ Vectors      │     │ scanner →     │
//!                         └──────────────┘     │ classifier    │
//!                                              └───────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/` (e.g., `ruby.rs`)
//! 2. Describe the grammar's node kinds in a static `ProfileTables`
//! 3. Implement `LanguageAnalyzer` trait
//! 4. Register the analyzer and its extensions in `languages/mod.rs`

mod classifier;
mod context;
mod extractor;
pub mod features;
mod languages;
mod matcher;
mod profile;
mod scanner;
mod traits;
mod walk;

pub use classifier::{Classifier, Lineage};
pub use context::{ContextBuilder, Depths};
pub use extractor::{
    ErrorFlag, ExtractOptions, Extraction, ExtractionStats, Extractor, Scope, VisitedBlocks,
};
pub use features::{Counting, FeatureValue, FeatureVector, Schema, SchemaOptions};
pub use languages::{
    get_analyzer, get_analyzer_by_id, language_for_extension, registered_languages,
    JavaAnalyzer, JavaScriptAnalyzer, PythonAnalyzer,
};
#[cfg(test)]
pub(crate) use languages::PYTHON_WITHOUT_FOR;
pub use matcher::{
    LoggingMatcher, JAVASCRIPT_LOGGING_PATTERN, JAVA_LOGGING_PATTERN, PYTHON_LOGGING_PATTERN,
};
pub use profile::{Decorator, ElseShape, LanguageProfile, NodeCategory, ProfileTables};
pub use scanner::BlockScanner;
pub use traits::{LanguageAnalyzer, LanguageQueries, ParsedFile};
pub use walk::{ancestors, SubtreeWalk};
