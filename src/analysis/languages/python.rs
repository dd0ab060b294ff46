//! Python language analyzer using tree-sitter.

use std::path::Path;

use tree_sitter::{Language, Parser};

use crate::analysis::matcher::{LoggingMatcher, PYTHON_LOGGING_PATTERN};
use crate::analysis::profile::{Decorator, ElseShape, LanguageProfile, ProfileTables};
use crate::analysis::{LanguageAnalyzer, LanguageQueries, ParsedFile};
use crate::error::ProfileError;

const PYTHON_FIELDS: ProfileTables = ProfileTables {
    language: "python",
    root_kind: "module",
    error_kind: "ERROR",
    block_kinds: &["block"],
    body_kinds: &[],
    compound_statement_kinds: &[
        "class_definition",
        "function_definition",
        "if_statement",
        "for_statement",
        "match_statement",
        "while_statement",
        "try_statement",
        "with_statement",
    ],
    extra_clause_kinds: &[
        "case_clause",
        "elif_clause",
        "else_clause",
        "except_clause",
        "except_group_clause",
        "finally_clause",
    ],
    simple_statement_kinds: &[
        "return_statement",
        "assert_statement",
        "break_statement",
        "continue_statement",
        "raise_statement",
        "import_statement",
        "import_from_statement",
        "pass_statement",
        "delete_statement",
        "exec_statement",
        "future_import_statement",
        "global_statement",
        "nonlocal_statement",
        "print_statement",
        "type_alias_statement",
    ],
    expression_kinds: &["assignment", "call", "await", "yield"],
    pass_through_kinds: &["decorated_definition", "expression_statement"],
    trivia_kinds: &["comment", "line_continuation"],
    aliases: &[("augmented_assignment", "assignment")],
    function_def_kinds: &["function_definition"],
    call_kind: "call",
    expression_statement_kind: "expression_statement",
    assignment_kind: "assignment",
    await_kind: Some("await"),
    yield_kind: Some("yield"),
    decorator: Some(Decorator {
        kind: "decorated_definition",
        definition_field: "definition",
    }),
    if_kind: "if_statement",
    else_shape: ElseShape::Clause("else_clause"),
    elif_kind: "elif_clause",
    handler_kinds: &["except_clause", "except_group_clause"],
};

static PYTHON_TABLES: ProfileTables = PYTHON_FIELDS;

/// Tables that leave `for_statement` out of every category.
#[cfg(test)]
pub(crate) static PYTHON_WITHOUT_FOR: ProfileTables = ProfileTables {
    compound_statement_kinds: &[
        "class_definition",
        "function_definition",
        "if_statement",
        "match_statement",
        "while_statement",
        "try_statement",
        "with_statement",
    ],
    ..PYTHON_FIELDS
};

pub struct PythonAnalyzer {
    language: Language,
    profile: LanguageProfile,
    queries: LanguageQueries,
    matcher: LoggingMatcher,
}

impl PythonAnalyzer {
    pub fn new() -> Result<Self, ProfileError> {
        Self::with_tables(&PYTHON_TABLES)
    }

    /// Analyzer over the Python grammar described by other tables.
    pub(crate) fn with_tables(tables: &'static ProfileTables) -> Result<Self, ProfileError> {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let profile = LanguageProfile::build(tables)?;
        let queries = LanguageQueries::compile(&language, &profile)?;
        let matcher = LoggingMatcher::new(PYTHON_LOGGING_PATTERN).map_err(|source| {
            ProfileError::Pattern {
                language: "python",
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

impl LanguageAnalyzer for PythonAnalyzer {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
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
            .ok_or_else(|| anyhow::anyhow!("failed to parse Python source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }
}
