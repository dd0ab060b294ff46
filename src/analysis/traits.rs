//! Core traits for language analysis.

use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Query, QueryCursor};

use super::matcher::LoggingMatcher;
use super::profile::LanguageProfile;
use crate::error::ProfileError;

/// Holds a parsed tree-sitter tree and associated metadata.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// Structural queries enumerating function definitions and blocks.
///
/// Both queries carry one pattern per kind, in profile order, so matches can
/// be grouped by kind.
pub struct LanguageQueries {
    function_defs: Query,
    blocks: Query,
}

impl LanguageQueries {
    pub fn compile(language: &Language, profile: &LanguageProfile) -> Result<Self, ProfileError> {
        let compile = |kinds: &[&str], capture: &str| {
            let source: String = kinds
                .iter()
                .map(|kind| format!("({}) @{}\n", kind, capture))
                .collect();
            Query::new(language, &source).map_err(|source| ProfileError::Query {
                language: profile.language(),
                source,
            })
        };
        Ok(Self {
            function_defs: compile(profile.function_def_kinds(), "def")?,
            blocks: compile(profile.block_kinds(), "block")?,
        })
    }

    /// Function definitions under `scope`, in document order.
    pub fn function_defs<'tree>(&self, scope: Node<'tree>, source: &[u8]) -> Vec<Node<'tree>> {
        let mut nodes = run(&self.function_defs, scope, source);
        nodes.sort_by_key(|(_, node)| (node.start_byte(), std::cmp::Reverse(node.end_byte())));
        nodes.into_iter().map(|(_, node)| node).collect()
    }

    /// Blocks under `scope`, grouped by kind (canonical kind first) and in
    /// document order within a kind, outer before inner.
    pub fn blocks<'tree>(&self, scope: Node<'tree>, source: &[u8]) -> Vec<Node<'tree>> {
        let mut nodes = run(&self.blocks, scope, source);
        nodes.sort_by_key(|(pattern, node)| {
            (
                *pattern,
                node.start_byte(),
                std::cmp::Reverse(node.end_byte()),
            )
        });
        nodes.into_iter().map(|(_, node)| node).collect()
    }
}

fn run<'tree>(query: &Query, scope: Node<'tree>, source: &[u8]) -> Vec<(usize, Node<'tree>)> {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, scope, source);
    let mut nodes = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            nodes.push((m.pattern_index, capture.node));
        }
    }
    nodes
}

/// Language-specific analyzer trait.
///
/// Each supported language implements this trait to expose its grammar,
/// its node-kind profile and its default logging matcher.
///
/// # Thread Safety
///
/// Note: tree_sitter::Parser is not Sync, so implementations create a
/// parser per `parse` call. Everything else is immutable and shared.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "python", "java").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Node-kind tables for this grammar.
    fn profile(&self) -> &LanguageProfile;

    /// Compiled function and block queries.
    fn queries(&self) -> &LanguageQueries;

    /// Logging matcher used when configuration does not override it.
    fn default_matcher(&self) -> &LoggingMatcher;

    /// Parse a source file into a tree-sitter tree.
    ///
    /// Partial parse errors are still returned as a valid tree with ERROR nodes.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile>;

    /// Lowercased `object.method` text of a call node.
    fn callee_text(&self, parsed: &ParsedFile, call: Node) -> String {
        call.child_by_field_name("function")
            .map(|function| parsed.node_text(function).to_lowercase())
            .unwrap_or_default()
    }

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
