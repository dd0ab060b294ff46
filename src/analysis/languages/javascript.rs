//! JavaScript language analyzer using tree-sitter.

use std::path::Path;

use tree_sitter::{Language, Parser};

use crate::analysis::matcher::{LoggingMatcher, JAVASCRIPT_LOGGING_PATTERN};
use crate::analysis::profile::{ElseShape, LanguageProfile, ProfileTables};
use crate::analysis::{LanguageAnalyzer, LanguageQueries, ParsedFile};
use crate::error::ProfileError;

pub(crate) static JAVASCRIPT_TABLES: ProfileTables = ProfileTables {
    language: "javascript",
    root_kind: "program",
    error_kind: "ERROR",
    block_kinds: &["statement_block", "switch_case", "switch_default"],
    body_kinds: &["class_body"],
    compound_statement_kinds: &[
        "function_declaration",
        "function_expression",
        "generator_function_declaration",
        "generator_function",
        "arrow_function",
        "method_definition",
        "class_declaration",
        "class",
        "class_static_block",
        "if_statement",
        "for_statement",
        "for_in_statement",
        "while_statement",
        "do_statement",
        "try_statement",
        "switch_statement",
        "with_statement",
        "labeled_statement",
    ],
    extra_clause_kinds: &["else_clause", "elif", "catch_clause", "finally_clause"],
    simple_statement_kinds: &[
        "lexical_declaration",
        "variable_declaration",
        "return_statement",
        "throw_statement",
        "break_statement",
        "continue_statement",
        "debugger_statement",
        "empty_statement",
        "import_statement",
        "export_statement",
    ],
    expression_kinds: &[
        "assignment_expression",
        "call_expression",
        "await_expression",
        "yield_expression",
        "new_expression",
        "update_expression",
    ],
    pass_through_kinds: &["switch_body", "expression_statement"],
    trivia_kinds: &["comment", "hash_bang_line"],
    aliases: &[("augmented_assignment_expression", "assignment_expression")],
    function_def_kinds: &[
        "function_declaration",
        "function_expression",
        "generator_function_declaration",
        "generator_function",
        "arrow_function",
        "method_definition",
    ],
    call_kind: "call_expression",
    expression_statement_kind: "expression_statement",
    assignment_kind: "assignment_expression",
    await_kind: Some("await_expression"),
    yield_kind: Some("yield_expression"),
    decorator: None,
    if_kind: "if_statement",
    else_shape: ElseShape::Clause("else_clause"),
    elif_kind: "elif",
    handler_kinds: &["catch_clause"],
};

pub struct JavaScriptAnalyzer {
    language: Language,
    profile: LanguageProfile,
    queries: LanguageQueries,
    matcher: LoggingMatcher,
}

impl JavaScriptAnalyzer {
    pub fn new() -> Result<Self, ProfileError> {
        let language: Language = tree_sitter_javascript::LANGUAGE.into();
        let profile = LanguageProfile::build(&JAVASCRIPT_TABLES)?;
        let queries = LanguageQueries::compile(&language, &profile)?;
        let matcher = LoggingMatcher::new(JAVASCRIPT_LOGGING_PATTERN).map_err(|source| {
            ProfileError::Pattern {
                language: "javascript",
                source,
            }
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

impl LanguageAnalyzer for JavaScriptAnalyzer {
    fn language_id(&self) -> &'static str {
        "javascript"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "mjs"]
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
        let tree = parser.parse(source, None).ok_or_else(|| {
            anyhow::anyhow!("failed to parse JavaScript source: {}", path.display())
        })?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }
}
