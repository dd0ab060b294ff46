//! Nesting depths and the serialized context stream of a block.

use tree_sitter::Node;

use super::extractor::ErrorFlag;
use super::matcher::LoggingMatcher;
use super::walk::{ancestors, SubtreeWalk};
use super::{LanguageAnalyzer, ParsedFile};

/// Nesting depths of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depths {
    /// Containing blocks between the block and its enclosing function
    /// definition. `None` outside any function.
    pub from_def: Option<i64>,
    /// Containing blocks above the block, the root included.
    pub from_root: i64,
}

/// Builds depth and context features for blocks of one parsed file.
pub struct ContextBuilder<'a> {
    analyzer: &'a dyn LanguageAnalyzer,
    matcher: &'a LoggingMatcher,
    parsed: &'a ParsedFile,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(
        analyzer: &'a dyn LanguageAnalyzer,
        matcher: &'a LoggingMatcher,
        parsed: &'a ParsedFile,
    ) -> Self {
        Self {
            analyzer,
            matcher,
            parsed,
        }
    }

    /// Climb from the block to the root. An error ancestor raises the flag.
    pub fn depths(&self, block: Node<'_>, flag: &mut ErrorFlag) -> Option<Depths> {
        let profile = self.analyzer.profile();
        let mut containers = 0;
        let mut from_def = None;
        for ancestor in ancestors(block) {
            let kind = ancestor.kind();
            if profile.is_error(kind) {
                flag.raise(ancestor, "error node above block");
                return None;
            }
            if from_def.is_none() && profile.is_function_def(kind) {
                from_def = Some(containers);
            }
            if profile.is_containing_block(kind) {
                containers += 1;
            }
        }
        Some(Depths {
            from_def,
            from_root: containers,
        })
    }

    /// Symbols of the nodes preceding the block in its defining scope,
    /// followed by the symbols inside the block. Logging calls are left out.
    pub fn context(&self, block: Node<'_>) -> String {
        let profile = self.analyzer.profile();
        let boundary = ancestors(block)
            .find(|n| profile.is_function_def(n.kind()))
            .unwrap_or_else(|| self.parsed.tree.root_node());

        SubtreeWalk::new(boundary, Some(block))
            .chain(SubtreeWalk::new(block, None))
            .filter_map(|node| self.symbol(node))
            .collect()
    }

    fn symbol(&self, node: Node<'_>) -> Option<char> {
        if !node.is_named() {
            return None;
        }
        let profile = self.analyzer.profile();
        let kind = profile.context_kind(node.kind())?;
        if kind == profile.call_kind()
            && self
                .matcher
                .is_logging_call(&self.analyzer.callee_text(self.parsed, node))
        {
            return None;
        }
        profile.symbol(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::get_analyzer_by_id;
    use std::path::Path;

    fn python() -> &'static dyn LanguageAnalyzer {
        get_analyzer_by_id("python").unwrap().unwrap()
    }

    fn encode(analyzer: &dyn LanguageAnalyzer, kinds: &[&str]) -> String {
        kinds
            .iter()
            .map(|k| analyzer.profile().symbol(k).unwrap())
            .collect()
    }

    #[test]
    fn test_depths_inside_function() {
        let analyzer = python();
        let source = "def f():\n    if x:\n        pass\n";
        let parsed = analyzer.parse(Path::new("t.py"), source.as_bytes()).unwrap();
        let def = parsed.tree.root_node().named_child(0).unwrap();
        let blocks = analyzer.queries().blocks(def, &parsed.source);
        let builder = ContextBuilder::new(analyzer, analyzer.default_matcher(), &parsed);
        let mut flag = ErrorFlag::default();

        let body = builder.depths(blocks[0], &mut flag).unwrap();
        assert_eq!(body.from_def, Some(0));
        assert_eq!(body.from_root, 1);

        let nested = builder.depths(blocks[1], &mut flag).unwrap();
        assert_eq!(nested.from_def, Some(1));
        assert_eq!(nested.from_root, 2);
        assert!(!flag.is_raised());
    }

    #[test]
    fn test_depth_from_def_missing_at_module_level() {
        let analyzer = python();
        let parsed = analyzer
            .parse(Path::new("t.py"), b"if x:\n    pass\n")
            .unwrap();
        let blocks = analyzer
            .queries()
            .blocks(parsed.tree.root_node(), &parsed.source);
        let builder = ContextBuilder::new(analyzer, analyzer.default_matcher(), &parsed);
        let mut flag = ErrorFlag::default();
        let depths = builder.depths(blocks[0], &mut flag).unwrap();
        assert_eq!(depths.from_def, None);
        assert_eq!(depths.from_root, 1);
    }

    #[test]
    fn test_context_skips_logging_calls() {
        let analyzer = python();
        let source = r#"
def f():
    x = load()
    try:
        run()
    except Exception:
        logger.error("failed")
"#;
        let parsed = analyzer.parse(Path::new("t.py"), source.as_bytes()).unwrap();
        let def = parsed.tree.root_node().named_child(0).unwrap();
        let blocks = analyzer.queries().blocks(def, &parsed.source);
        let except_block = blocks
            .iter()
            .copied()
            .find(|b| b.parent().map(|p| p.kind()) == Some("except_clause"))
            .unwrap();
        let builder = ContextBuilder::new(analyzer, analyzer.default_matcher(), &parsed);

        let expected = encode(
            analyzer,
            &[
                "function_definition",
                "assignment",
                "call",
                "try_statement",
                "call",
                "except_clause",
            ],
        );
        assert_eq!(builder.context(except_block), expected);
    }
}
