//! Tallies the statements and expressions directly inside a block.

use tree_sitter::Node;

use super::extractor::{ErrorFlag, VisitedBlocks};
use super::features::{contains_column, FeatureVector, CONTAINS_LOGGING};
use super::matcher::LoggingMatcher;
use super::{LanguageAnalyzer, ParsedFile};

pub struct BlockScanner<'a> {
    analyzer: &'a dyn LanguageAnalyzer,
    matcher: &'a LoggingMatcher,
    parsed: &'a ParsedFile,
}

impl<'a> BlockScanner<'a> {
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

    /// Count the block's direct children into `vector`.
    ///
    /// Nested blocks are folded into this block and marked visited. Any parse
    /// error inside the block raises the flag and stops the scan.
    pub fn scan(
        &self,
        block: Node<'_>,
        vector: &mut FeatureVector,
        visited: &mut VisitedBlocks,
        flag: &mut ErrorFlag,
    ) {
        if block.has_error() {
            flag.raise(block, "parse error inside block");
            return;
        }
        let profile = self.analyzer.profile();
        let tables = profile.tables();

        let mut cursor = block.walk();
        for child in block.named_children(&mut cursor) {
            let kind = child.kind();
            if profile.is_trivia(kind) {
                continue;
            }
            if profile.is_error(kind) {
                flag.raise(child, "error node in block");
                return;
            }

            if kind == tables.expression_statement_kind {
                let mut inner = child.walk();
                for expression in child.named_children(&mut inner) {
                    self.check_expression(expression, vector);
                }
            } else if let Some(decorator) = tables.decorator.filter(|d| d.kind == kind) {
                let definition = child
                    .child_by_field_name(decorator.definition_field)
                    .and_then(|d| profile.column_kind(d.kind()));
                match definition {
                    Some(column) => {
                        vector.increment(&contains_column(column));
                    }
                    None => tracing::debug!(
                        line = child.start_position().row + 1,
                        "decorated definition without a counted definition"
                    ),
                }
            } else if profile.is_block(kind) {
                self.scan(child, vector, visited, flag);
                visited.insert(child);
                if flag.is_raised() {
                    return;
                }
            } else if let Some(column) = profile.column_kind(kind) {
                vector.increment(&contains_column(column));
            } else {
                tracing::debug!(
                    kind,
                    line = child.start_position().row + 1,
                    "unhandled statement kind"
                );
            }
        }
    }

    /// Count one expression of an expression statement.
    fn check_expression(&self, expression: Node<'_>, vector: &mut FeatureVector) {
        let profile = self.analyzer.profile();
        let tables = profile.tables();
        let kind = expression.kind();
        let call = tables.call_kind;

        if kind == call {
            let callee = self.analyzer.callee_text(self.parsed, expression);
            if self.matcher.is_logging_call(&callee) {
                vector.set_int(CONTAINS_LOGGING, 1);
            } else {
                vector.increment(&contains_column(call));
            }
            return;
        }

        match profile.column_kind(kind) {
            Some(column) if column == tables.assignment_kind => {
                vector.increment(&contains_column(column));
                // A call on the right is an instantiation, never a logging call.
                let rhs_is_call = expression
                    .child_by_field_name("right")
                    .is_some_and(|rhs| rhs.kind() == call);
                if rhs_is_call {
                    vector.increment(&contains_column(call));
                }
            }
            Some(column) if Some(column) == tables.await_kind => {
                vector.increment(&contains_column(column));
                let mut cursor = expression.walk();
                let wraps_call = expression
                    .named_children(&mut cursor)
                    .any(|inner| inner.kind() == call);
                if wraps_call {
                    vector.increment(&contains_column(call));
                }
            }
            Some(column) => {
                vector.increment(&contains_column(column));
            }
            None if profile.is_trivia(kind) => {}
            None => tracing::trace!(
                kind,
                line = expression.start_position().row + 1,
                "uncounted expression"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::features::{Schema, SchemaOptions};
    use crate::analysis::get_analyzer_by_id;
    use std::path::Path;
    use std::sync::Arc;

    struct Scanned {
        vector: FeatureVector,
        visited: VisitedBlocks,
    }

    fn scan_first_block(lang: &str, source: &str, parent_kind: &str) -> Scanned {
        let analyzer = get_analyzer_by_id(lang).unwrap().unwrap();
        let parsed = analyzer.parse(Path::new("t"), source.as_bytes()).unwrap();
        let blocks = analyzer
            .queries()
            .blocks(parsed.tree.root_node(), &parsed.source);
        let block = blocks
            .into_iter()
            .find(|b| b.parent().map(|p| p.kind()) == Some(parent_kind))
            .unwrap();
        let schema = Arc::new(Schema::for_profile(
            analyzer.profile(),
            SchemaOptions::default(),
        ));
        let mut vector = FeatureVector::new(schema);
        let mut visited = VisitedBlocks::default();
        let mut flag = ErrorFlag::default();
        BlockScanner::new(analyzer, analyzer.default_matcher(), &parsed).scan(
            block,
            &mut vector,
            &mut visited,
            &mut flag,
        );
        assert!(!flag.is_raised());
        Scanned { vector, visited }
    }

    #[test]
    fn test_logging_call_is_not_counted_as_call() {
        let source = r#"
def f():
    try:
        foo()
    except Exception as e:
        logger.error("x")
"#;
        let s = scan_first_block("python", source, "except_clause");
        assert_eq!(s.vector.int("contains_logging"), Some(1));
        assert_eq!(s.vector.int("contains_call"), Some(0));
    }

    #[test]
    fn test_logging_flag_does_not_accumulate() {
        let source = "def f():\n    log.info('a')\n    log.info('b')\n    go()\n";
        let s = scan_first_block("python", source, "function_definition");
        assert_eq!(s.vector.int("contains_logging"), Some(1));
        assert_eq!(s.vector.int("contains_call"), Some(1));
    }

    #[test]
    fn test_assigned_logger_is_not_logging() {
        let source = "def f():\n    log = logging.getLogger()\n";
        let s = scan_first_block("python", source, "function_definition");
        assert_eq!(s.vector.int("contains_assignment"), Some(1));
        assert_eq!(s.vector.int("contains_call"), Some(1));
        assert_eq!(s.vector.int("contains_logging"), Some(0));
    }

    #[test]
    fn test_counters_accumulate_and_aliases_fold() {
        let source = r#"
async def f():
    x = 1
    x += 2
    await fetch()
    return x
    return x
"#;
        let s = scan_first_block("python", source, "function_definition");
        assert_eq!(s.vector.int("contains_assignment"), Some(2));
        assert_eq!(s.vector.int("contains_await"), Some(1));
        assert_eq!(s.vector.int("contains_call"), Some(1));
        assert_eq!(s.vector.int("contains_return_statement"), Some(2));
    }

    #[test]
    fn test_decorated_definition_counts_definition() {
        let source = r#"
def outer():
    @cache
    def inner():
        pass
    @dataclass
    class Point:
        x: int
"#;
        let s = scan_first_block("python", source, "function_definition");
        assert_eq!(s.vector.int("contains_function_definition"), Some(1));
        assert_eq!(s.vector.int("contains_class_definition"), Some(1));
    }

    #[test]
    fn test_parse_error_raises_flag() {
        let analyzer = get_analyzer_by_id("python").unwrap().unwrap();
        let source = "def f():\n    x = 1\n    return )\n";
        let parsed = analyzer.parse(Path::new("t.py"), source.as_bytes()).unwrap();
        let schema = Arc::new(Schema::for_profile(
            analyzer.profile(),
            SchemaOptions::default(),
        ));
        let scanner = BlockScanner::new(analyzer, analyzer.default_matcher(), &parsed);
        for block in analyzer
            .queries()
            .blocks(parsed.tree.root_node(), &parsed.source)
        {
            let mut flag = ErrorFlag::default();
            let mut vector = FeatureVector::new(schema.clone());
            scanner.scan(block, &mut vector, &mut VisitedBlocks::default(), &mut flag);
            assert_eq!(flag.is_raised(), block.has_error());
        }
        assert!(parsed.tree.root_node().has_error());
    }

    #[test]
    fn test_java_nested_block_folded_once() {
        let source = r#"
class A {
    void run() {
        go();
        {
            stop();
            LOG.info("x");
        }
    }
}
"#;
        let s = scan_first_block("java", source, "method_declaration");
        assert_eq!(s.vector.int("contains_method_invocation"), Some(2));
        assert_eq!(s.vector.int("contains_logging"), Some(1));
        assert_eq!(s.visited.len(), 1);
    }

    #[test]
    fn test_javascript_console_error() {
        let source = r#"
function f() {
    try {
        run();
    } catch (err) {
        console.error(err);
        retries += 1;
    }
}
"#;
        let s = scan_first_block("javascript", source, "catch_clause");
        assert_eq!(s.vector.int("contains_logging"), Some(1));
        assert_eq!(s.vector.int("contains_call_expression"), Some(0));
        assert_eq!(s.vector.int("contains_assignment_expression"), Some(1));
    }
}
