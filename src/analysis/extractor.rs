//! Extraction driver: one feature vector per block of a parsed file.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use super::classifier::Classifier;
use super::context::ContextBuilder;
use super::features::{
    self, Counting, FeatureValue, FeatureVector, Schema, SchemaOptions, ROOT_SENTINEL,
};
use super::matcher::LoggingMatcher;
use super::scanner::BlockScanner;
use super::{LanguageAnalyzer, ParsedFile};
use crate::error::ExtractError;

/// Sticky per-block flag raised by malformed syntax.
#[derive(Debug, Default)]
pub struct ErrorFlag {
    raised: bool,
}

impl ErrorFlag {
    pub fn raise(&mut self, node: Node<'_>, reason: &'static str) {
        tracing::trace!(
            kind = node.kind(),
            line = node.start_position().row + 1,
            reason,
            "discarding block"
        );
        self.raised = true;
    }

    pub fn is_raised(&self) -> bool {
        self.raised
    }
}

/// Spans of blocks already emitted or folded into another block.
#[derive(Debug, Default)]
pub struct VisitedBlocks {
    spans: HashSet<(usize, usize)>,
}

impl VisitedBlocks {
    /// Returns false if the span was already present.
    pub fn insert(&mut self, node: Node<'_>) -> bool {
        self.spans.insert((node.start_byte(), node.end_byte()))
    }

    pub fn contains(&self, node: Node<'_>) -> bool {
        self.spans.contains(&(node.start_byte(), node.end_byte()))
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Which part of a file is searched for blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Blocks inside function definitions.
    #[default]
    Functions,
    /// Every block, module level included.
    File,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Keep blocks that already log.
    pub training: bool,
    /// Emit the `context` column.
    pub context: bool,
    /// Emit the `file` column.
    pub debug: bool,
    pub counting: Counting,
    pub scope: Scope,
}

/// Block counts of one extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub blocks_seen: usize,
    pub blocks_discarded: usize,
    pub blocks_logged: usize,
}

impl ExtractionStats {
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.blocks_seen += other.blocks_seen;
        self.blocks_discarded += other.blocks_discarded;
        self.blocks_logged += other.blocks_logged;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub vectors: Vec<FeatureVector>,
    pub stats: ExtractionStats,
}

/// Turns parsed files of one language into feature vectors.
///
/// An extractor is immutable and can be shared between worker threads.
pub struct Extractor<'a> {
    analyzer: &'a dyn LanguageAnalyzer,
    matcher: LoggingMatcher,
    options: ExtractOptions,
    schema: Arc<Schema>,
}

impl<'a> Extractor<'a> {
    pub fn new(
        analyzer: &'a dyn LanguageAnalyzer,
        matcher: LoggingMatcher,
        options: ExtractOptions,
    ) -> Self {
        let schema = Arc::new(Schema::for_profile(
            analyzer.profile(),
            SchemaOptions {
                context: options.context,
                debug: options.debug,
            },
        ));
        Self {
            analyzer,
            matcher,
            options,
            schema,
        }
    }

    pub fn analyzer(&self) -> &'a dyn LanguageAnalyzer {
        self.analyzer
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Extract the vectors of one file.
    ///
    /// Malformed blocks are discarded and counted. An unknown node kind
    /// aborts the whole file.
    pub fn extract(&self, file_id: &str, parsed: &ParsedFile) -> Result<Extraction, ExtractError> {
        let queries = self.analyzer.queries();
        let root = parsed.tree.root_node();
        let scopes = match self.options.scope {
            Scope::Functions => queries.function_defs(root, &parsed.source),
            Scope::File => vec![root],
        };

        let classifier = Classifier::new(self.analyzer.profile());
        let mut visited = VisitedBlocks::default();
        let mut extraction = Extraction::default();
        for scope in scopes {
            for block in queries.blocks(scope, &parsed.source) {
                let block = classifier.reported_block(block);
                if !visited.insert(block) {
                    continue;
                }
                extraction.stats.blocks_seen += 1;
                match self.extract_block(&classifier, file_id, parsed, block, &mut visited)? {
                    Some(vector) => {
                        let logged = vector.contains_logging();
                        if logged {
                            extraction.stats.blocks_logged += 1;
                        }
                        if self.options.training || !logged {
                            extraction.vectors.push(vector);
                        }
                    }
                    None => extraction.stats.blocks_discarded += 1,
                }
            }
        }

        tracing::debug!(
            file = file_id,
            blocks = extraction.stats.blocks_seen,
            discarded = extraction.stats.blocks_discarded,
            logged = extraction.stats.blocks_logged,
            "extracted"
        );
        Ok(extraction)
    }

    /// Build one vector: context, then content, then lineage.
    fn extract_block(
        &self,
        classifier: &Classifier<'_>,
        file_id: &str,
        parsed: &ParsedFile,
        block: Node<'_>,
        visited: &mut VisitedBlocks,
    ) -> Result<Option<FeatureVector>, ExtractError> {
        let mut flag = ErrorFlag::default();
        let mut vector = FeatureVector::new(self.schema.clone());

        vector.set_text(features::FILE, file_id);
        vector.set_text(features::LOCATION, features::location(block));
        vector.set_int(features::LENGTH, features::line_length(block));
        vector.set_int(features::NUM_CHILDREN, block.named_child_count() as i64);

        let context = ContextBuilder::new(self.analyzer, &self.matcher, parsed);
        let Some(depths) = context.depths(block, &mut flag) else {
            return Ok(None);
        };
        vector.set(
            features::DEPTH_FROM_DEF,
            depths
                .from_def
                .map_or(FeatureValue::Missing, FeatureValue::Int),
        );
        vector.set_int(features::DEPTH_FROM_ROOT, depths.from_root);
        if self.options.context {
            vector.set_text(features::CONTEXT, context.context(block));
        }

        BlockScanner::new(self.analyzer, &self.matcher, parsed).scan(
            block,
            &mut vector,
            visited,
            &mut flag,
        );
        if flag.is_raised() {
            return Ok(None);
        }

        let Some(lineage) = classifier.classify(block, &mut flag)? else {
            return Ok(None);
        };
        vector.set_text(features::TYPE, self.encode(lineage.block_type));
        vector.set_text(features::PARENT, self.encode(lineage.parent));
        vector.set_text(
            features::GRANDPARENT,
            lineage
                .grandparent
                .map_or_else(|| ROOT_SENTINEL.to_string(), |kind| self.encode(kind)),
        );
        vector.set_int(features::NUM_SIBLINGS, lineage.num_siblings);
        vector.set_int(features::NUM_COUSINS, lineage.num_cousins);

        vector.finalize(self.options.counting).map(Some)
    }

    /// Symbol of a categorized kind.
    fn encode(&self, kind: &str) -> String {
        self.analyzer
            .profile()
            .symbol(kind)
            .map(String::from)
            .unwrap_or_else(|| kind.to_string())
    }
}
