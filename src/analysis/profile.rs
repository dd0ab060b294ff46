//! Per-language node-kind tables.
//!
//! A `LanguageProfile` is built once from static `ProfileTables` and is
//! read-only afterwards, so it can be shared by every worker. Building it
//! checks that each node kind belongs to exactly one category and assigns
//! every categorized kind a one-character symbol used by the context stream
//! and by the `type`/`parent`/`grandparent` features.

use std::collections::HashMap;
use std::fmt;

use crate::error::ProfileError;

/// Symbols handed out in order of first appearance.
const SYMBOL_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!#$%&*+-/<=>?@^_~";

/// Category of a syntax node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// The tree root (`module`, `program`).
    Root,
    /// The parser's error node.
    Error,
    /// Statement containers that receive a feature vector.
    Block,
    /// Containers that bound sibling counts but are never emitted.
    Body,
    /// Statements that own blocks.
    Compound,
    /// Subordinate clauses that own blocks (else, except, catch, ...).
    ExtraClause,
    /// Statements without blocks.
    Simple,
    /// Expressions counted inside expression statements.
    Expression,
    /// Transparent wrappers skipped when resolving a logical owner.
    PassThrough,
}

impl NodeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Root => "root",
            NodeCategory::Error => "error",
            NodeCategory::Block => "block",
            NodeCategory::Body => "body",
            NodeCategory::Compound => "compound statement",
            NodeCategory::ExtraClause => "extra clause",
            NodeCategory::Simple => "simple statement",
            NodeCategory::Expression => "expression",
            NodeCategory::PassThrough => "pass-through",
        }
    }

    /// Whether nodes of this category contribute to the context stream.
    pub fn in_context(&self) -> bool {
        matches!(
            self,
            NodeCategory::Root
                | NodeCategory::Error
                | NodeCategory::Compound
                | NodeCategory::ExtraClause
                | NodeCategory::Expression
                | NodeCategory::Simple
        )
    }

    /// Whether nodes of this category delimit a containing block.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeCategory::Root | NodeCategory::Block | NodeCategory::Body
        )
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a grammar represents the `else` branch of a compound statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElseShape {
    /// A dedicated clause node owns the else block (`else_clause`).
    Clause(&'static str),
    /// The else block follows an anonymous `else` token; blocks found there
    /// are typed with the synthetic kind of the same name.
    Token(&'static str),
}

impl ElseShape {
    /// The kind used as `type` for else blocks.
    pub fn kind(&self) -> &'static str {
        match self {
            ElseShape::Clause(kind) | ElseShape::Token(kind) => kind,
        }
    }
}

/// A wrapper that decorates a definition, counted as the wrapped definition.
#[derive(Debug, Clone, Copy)]
pub struct Decorator {
    pub kind: &'static str,
    pub definition_field: &'static str,
}

/// Static description of one grammar.
#[derive(Debug)]
pub struct ProfileTables {
    pub language: &'static str,
    pub root_kind: &'static str,
    pub error_kind: &'static str,
    /// Canonical block kind first.
    pub block_kinds: &'static [&'static str],
    pub body_kinds: &'static [&'static str],
    pub compound_statement_kinds: &'static [&'static str],
    pub extra_clause_kinds: &'static [&'static str],
    pub simple_statement_kinds: &'static [&'static str],
    pub expression_kinds: &'static [&'static str],
    pub pass_through_kinds: &'static [&'static str],
    /// Named kinds the scanner skips silently (comments, labels).
    pub trivia_kinds: &'static [&'static str],
    /// `(alias, kind)`: alias is counted in kind's column.
    pub aliases: &'static [(&'static str, &'static str)],
    /// Canonical function-definition kind first.
    pub function_def_kinds: &'static [&'static str],
    pub call_kind: &'static str,
    pub expression_statement_kind: &'static str,
    pub assignment_kind: &'static str,
    pub await_kind: Option<&'static str>,
    pub yield_kind: Option<&'static str>,
    pub decorator: Option<Decorator>,
    pub if_kind: &'static str,
    pub else_shape: ElseShape,
    /// Kind used as `type` for blocks continuing an if-chain.
    pub elif_kind: &'static str,
    /// Exception-handler kinds reported by recommendation mode.
    pub handler_kinds: &'static [&'static str],
}

impl ProfileTables {
    /// Category lists in symbol-assignment order.
    fn category_lists(&self) -> Vec<(NodeCategory, Vec<&'static str>)> {
        vec![
            (NodeCategory::Root, vec![self.root_kind]),
            (NodeCategory::Error, vec![self.error_kind]),
            (NodeCategory::Compound, self.compound_statement_kinds.to_vec()),
            (NodeCategory::ExtraClause, self.extra_clause_kinds.to_vec()),
            (NodeCategory::Expression, self.expression_kinds.to_vec()),
            (NodeCategory::Simple, self.simple_statement_kinds.to_vec()),
            (NodeCategory::Block, self.block_kinds.to_vec()),
            (NodeCategory::Body, self.body_kinds.to_vec()),
            (NodeCategory::PassThrough, self.pass_through_kinds.to_vec()),
        ]
    }
}

/// Immutable, validated view of a grammar's node kinds.
#[derive(Debug)]
pub struct LanguageProfile {
    tables: &'static ProfileTables,
    categories: HashMap<&'static str, NodeCategory>,
    symbols: HashMap<&'static str, char>,
    kinds_by_symbol: HashMap<char, &'static str>,
    aliases: HashMap<&'static str, &'static str>,
    feature_kinds: Vec<&'static str>,
}

impl LanguageProfile {
    /// Build the dispatch tables and check the category invariants.
    pub fn build(tables: &'static ProfileTables) -> Result<Self, ProfileError> {
        let language = tables.language;
        if tables.block_kinds.is_empty() {
            return Err(ProfileError::MissingKind {
                language,
                role: "block",
                kind: "<none>",
            });
        }
        let mut categories: HashMap<&'static str, NodeCategory> = HashMap::new();
        let mut symbols = HashMap::new();
        let mut kinds_by_symbol = HashMap::new();
        let mut alphabet = SYMBOL_ALPHABET.chars();
        let mut count = 0;

        for (category, kinds) in tables.category_lists() {
            for kind in kinds {
                if let Some(first) = categories.get(kind) {
                    return Err(ProfileError::DuplicateKind {
                        language,
                        kind,
                        first: first.as_str(),
                        second: category.as_str(),
                    });
                }
                categories.insert(kind, category);
                count += 1;
                let symbol = alphabet
                    .next()
                    .ok_or(ProfileError::AlphabetExhausted { language, count })?;
                symbols.insert(kind, symbol);
                kinds_by_symbol.insert(symbol, kind);
            }
        }

        let designated = tables
            .function_def_kinds
            .iter()
            .map(|kind| ("function definition", *kind))
            .chain(tables.handler_kinds.iter().map(|kind| ("handler", *kind)))
            .chain([
                ("call", tables.call_kind),
                ("expression statement", tables.expression_statement_kind),
                ("assignment", tables.assignment_kind),
                ("if", tables.if_kind),
                ("else", tables.else_shape.kind()),
                ("elif", tables.elif_kind),
            ])
            .chain(tables.await_kind.map(|kind| ("await", kind)))
            .chain(tables.yield_kind.map(|kind| ("yield", kind)));
        for (role, kind) in designated {
            if !categories.contains_key(kind) {
                return Err(ProfileError::MissingKind {
                    language,
                    role,
                    kind,
                });
            }
        }

        let mut aliases = HashMap::new();
        for (alias, kind) in tables.aliases {
            if categories.contains_key(alias) {
                return Err(ProfileError::DuplicateKind {
                    language,
                    kind: alias,
                    first: categories[alias].as_str(),
                    second: "alias",
                });
            }
            if !categories.contains_key(kind) {
                return Err(ProfileError::MissingKind {
                    language,
                    role: "alias target",
                    kind,
                });
            }
            aliases.insert(*alias, *kind);
        }

        let feature_kinds = tables
            .compound_statement_kinds
            .iter()
            .chain(tables.simple_statement_kinds)
            .chain(tables.expression_kinds)
            .copied()
            .collect();

        Ok(Self {
            tables,
            categories,
            symbols,
            kinds_by_symbol,
            aliases,
            feature_kinds,
        })
    }

    pub fn language(&self) -> &'static str {
        self.tables.language
    }

    pub fn tables(&self) -> &'static ProfileTables {
        self.tables
    }

    pub fn root_kind(&self) -> &'static str {
        self.tables.root_kind
    }

    pub fn error_kind(&self) -> &'static str {
        self.tables.error_kind
    }

    /// Block kinds in query order, canonical first.
    pub fn block_kinds(&self) -> &'static [&'static str] {
        self.tables.block_kinds
    }

    pub fn canonical_block_kind(&self) -> &'static str {
        self.tables.block_kinds[0]
    }

    pub fn function_def_kinds(&self) -> &'static [&'static str] {
        self.tables.function_def_kinds
    }

    pub fn is_function_def(&self, kind: &str) -> bool {
        self.tables.function_def_kinds.contains(&kind)
    }

    pub fn call_kind(&self) -> &'static str {
        self.tables.call_kind
    }

    pub fn category(&self, kind: &str) -> Option<NodeCategory> {
        self.categories.get(kind).copied()
    }

    pub fn is_error(&self, kind: &str) -> bool {
        kind == self.tables.error_kind
    }

    pub fn is_containing_block(&self, kind: &str) -> bool {
        self.category(kind).is_some_and(|c| c.is_container())
    }

    pub fn is_block(&self, kind: &str) -> bool {
        self.category(kind) == Some(NodeCategory::Block)
    }

    pub fn is_pass_through(&self, kind: &str) -> bool {
        self.category(kind) == Some(NodeCategory::PassThrough)
    }

    pub fn is_trivia(&self, kind: &str) -> bool {
        self.tables.trivia_kinds.contains(&kind)
    }

    pub fn is_handler(&self, kind: &str) -> bool {
        self.tables.handler_kinds.contains(&kind)
    }

    /// Symbol for a categorized kind.
    pub fn symbol(&self, kind: &str) -> Option<char> {
        self.symbols.get(kind).copied()
    }

    /// Kind behind a symbol (reverse of `symbol`).
    pub fn kind_for_symbol(&self, symbol: char) -> Option<&'static str> {
        self.kinds_by_symbol.get(&symbol).copied()
    }

    /// Kinds with a `contains_<kind>` column, in column order.
    pub fn feature_kinds(&self) -> &[&'static str] {
        &self.feature_kinds
    }

    /// Kind whose symbol a node contributes to the context stream, if any.
    pub fn context_kind(&self, kind: &str) -> Option<&'static str> {
        let kind = self.canonical(kind)?;
        self.category(kind)
            .filter(NodeCategory::in_context)
            .map(|_| kind)
    }

    /// Categorized kind for a node kind, following aliases.
    fn canonical(&self, kind: &str) -> Option<&'static str> {
        self.aliases.get(kind).copied().or_else(|| {
            self.categories
                .get_key_value(kind)
                .map(|(canonical, _)| *canonical)
        })
    }

    /// Column kind for a node kind, following aliases.
    pub fn column_kind(&self, kind: &str) -> Option<&'static str> {
        let kind = self.canonical(kind)?;
        match self.category(kind)? {
            NodeCategory::Compound | NodeCategory::Simple | NodeCategory::Expression => Some(kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TOY: ProfileTables = TOY_FIELDS;

    static DUPLICATED: ProfileTables = ProfileTables {
        language: "duplicated",
        simple_statement_kinds: &["return_statement", "call"],
        ..TOY_FIELDS
    };

    static NO_BLOCKS: ProfileTables = ProfileTables {
        language: "no-blocks",
        block_kinds: &[],
        ..TOY_FIELDS
    };

    static MISSING_CALL: ProfileTables = ProfileTables {
        language: "missing",
        call_kind: "method_invocation",
        ..TOY_FIELDS
    };

    const TOY_FIELDS: ProfileTables = ProfileTables {
        language: "toy",
        root_kind: "module",
        error_kind: "ERROR",
        block_kinds: &["block"],
        body_kinds: &[],
        compound_statement_kinds: &["function_definition", "if_statement"],
        extra_clause_kinds: &["else_clause", "elif_clause"],
        simple_statement_kinds: &["return_statement"],
        expression_kinds: &["assignment", "call"],
        pass_through_kinds: &["expression_statement"],
        trivia_kinds: &["comment"],
        aliases: &[("augmented_assignment", "assignment")],
        function_def_kinds: &["function_definition"],
        call_kind: "call",
        expression_statement_kind: "expression_statement",
        assignment_kind: "assignment",
        await_kind: None,
        yield_kind: None,
        decorator: None,
        if_kind: "if_statement",
        else_shape: ElseShape::Clause("else_clause"),
        elif_kind: "elif_clause",
        handler_kinds: &[],
    };

    #[test]
    fn test_symbols_follow_first_appearance() {
        let profile = LanguageProfile::build(&TOY).unwrap();
        assert_eq!(profile.symbol("module"), Some('a'));
        assert_eq!(profile.symbol("ERROR"), Some('b'));
        assert_eq!(profile.symbol("function_definition"), Some('c'));
        assert_eq!(profile.symbol("if_statement"), Some('d'));
        assert_eq!(profile.symbol("else_clause"), Some('e'));
        assert_eq!(profile.kind_for_symbol('e'), Some("else_clause"));
        assert_eq!(profile.symbol("identifier"), None);
    }

    #[test]
    fn test_feature_kinds_are_statements_then_expressions() {
        let profile = LanguageProfile::build(&TOY).unwrap();
        assert_eq!(
            profile.feature_kinds(),
            &[
                "function_definition",
                "if_statement",
                "return_statement",
                "assignment",
                "call"
            ]
        );
    }

    #[test]
    fn test_column_kind_follows_aliases() {
        let profile = LanguageProfile::build(&TOY).unwrap();
        assert_eq!(profile.column_kind("augmented_assignment"), Some("assignment"));
        assert_eq!(profile.column_kind("call"), Some("call"));
        assert_eq!(profile.column_kind("else_clause"), None);
        assert_eq!(profile.column_kind("string"), None);
    }

    #[test]
    fn test_containers() {
        let profile = LanguageProfile::build(&TOY).unwrap();
        assert!(profile.is_containing_block("module"));
        assert!(profile.is_containing_block("block"));
        assert!(!profile.is_containing_block("if_statement"));
        assert_eq!(profile.canonical_block_kind(), "block");
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let err = LanguageProfile::build(&DUPLICATED).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::DuplicateKind { kind: "call", .. }
        ));
    }

    #[test]
    fn test_missing_designated_kind_rejected() {
        let err = LanguageProfile::build(&MISSING_CALL).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::MissingKind {
                role: "call",
                kind: "method_invocation",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_block_kinds_rejected() {
        let err = LanguageProfile::build(&NO_BLOCKS).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::MissingKind { role: "block", .. }
        ));
    }
}
