//! Java language analyzer using tree-sitter.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use crate::analysis::matcher::{LoggingMatcher, JAVA_LOGGING_PATTERN};
use crate::analysis::profile::{ElseShape, LanguageProfile, ProfileTables};
use crate::analysis::{LanguageAnalyzer, LanguageQueries, ParsedFile};
use crate::error::ProfileError;

pub(crate) static JAVA_TABLES: ProfileTables = ProfileTables {
    language: "java",
    root_kind: "program",
    error_kind: "ERROR",
    block_kinds: &["block", "constructor_body", "switch_block_statement_group"],
    body_kinds: &[
        "class_body",
        "interface_body",
        "enum_body_declarations",
        "annotation_type_body",
    ],
    compound_statement_kinds: &[
        "class_declaration",
        "interface_declaration",
        "enum_declaration",
        "record_declaration",
        "annotation_type_declaration",
        "method_declaration",
        "constructor_declaration",
        "compact_constructor_declaration",
        "static_initializer",
        "lambda_expression",
        "enum_constant",
        "if_statement",
        "for_statement",
        "enhanced_for_statement",
        "while_statement",
        "do_statement",
        "try_statement",
        "try_with_resources_statement",
        "switch_expression",
        "synchronized_statement",
        "labeled_statement",
    ],
    // `else` and `elif` have no nodes of their own in this grammar.
    extra_clause_kinds: &["else", "elif", "catch_clause", "finally_clause", "switch_rule"],
    simple_statement_kinds: &[
        "local_variable_declaration",
        "return_statement",
        "break_statement",
        "continue_statement",
        "throw_statement",
        "assert_statement",
        "yield_statement",
        "explicit_constructor_invocation",
    ],
    expression_kinds: &[
        "assignment_expression",
        "method_invocation",
        "object_creation_expression",
        "update_expression",
    ],
    pass_through_kinds: &["switch_block", "enum_body", "expression_statement"],
    trivia_kinds: &["line_comment", "block_comment", "switch_label"],
    aliases: &[],
    function_def_kinds: &["method_declaration", "constructor_declaration"],
    call_kind: "method_invocation",
    expression_statement_kind: "expression_statement",
    assignment_kind: "assignment_expression",
    await_kind: None,
    yield_kind: None,
    decorator: None,
    if_kind: "if_statement",
    else_shape: ElseShape::Token("else"),
    elif_kind: "elif",
    handler_kinds: &["catch_clause"],
};

pub struct JavaAnalyzer {
    language: Language,
    profile: LanguageProfile,
    queries: LanguageQueries,
    matcher: LoggingMatcher,
}

impl JavaAnalyzer {
    pub fn new() -> Result<Self, ProfileError> {
        let language: Language = tree_sitter_java::LANGUAGE.into();
        let profile = LanguageProfile::build(&JAVA_TABLES)?;
        let queries = LanguageQueries::compile(&language, &profile)?;
        let matcher =
            LoggingMatcher::new(JAVA_LOGGING_PATTERN).map_err(|source| ProfileError::Pattern {
                language: "java",
                source,
            })?;
        Ok(Self {
            language,
            profile,
            queries,
            matcher,
        })
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }
}

impl LanguageAnalyzer for JavaAnalyzer {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn profile(&self) -> &LanguageProfile {
        &self.profile
    }

    fn queries(&self) -> &LanguageQueries {
        &self.queries
    }

    fn default_matcher(&self) -> &LoggingMatcher {
        &self.matcher
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Java source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    /// `object.name` of a `method_invocation`, or just `name` when the
    /// receiver is implicit.
    fn callee_text(&self, parsed: &ParsedFile, call: Node) -> String {
        let name = call
            .child_by_field_name("name")
            .map(|n| parsed.node_text(n))
            .unwrap_or("");
        let text = match call.child_by_field_name("object") {
            Some(object) => format!("{}.{}", parsed.node_text(object), name),
            None => name.to_string(),
        };
        text.to_lowercase()
    }
}
