//! Error types shared by the analysis engine and the batch runner.

use thiserror::Error;

/// A language profile whose tables violate the category invariants.
///
/// These are raised once, when the profile is built, and indicate a bug in
/// the static tables rather than in the analyzed source.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{language}: node kind {kind:?} is listed as both {first} and {second}")]
    DuplicateKind {
        language: &'static str,
        kind: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error("{language}: {role} kind {kind:?} has no category")]
    MissingKind {
        language: &'static str,
        role: &'static str,
        kind: &'static str,
    },

    #[error("{language}: {count} node kinds exceed the symbol alphabet")]
    AlphabetExhausted {
        language: &'static str,
        count: usize,
    },

    #[error("{language}: invalid tree-sitter query: {source}")]
    Query {
        language: &'static str,
        #[source]
        source: tree_sitter::QueryError,
    },

    #[error("{language}: invalid logging pattern: {source}")]
    Pattern {
        language: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Failures that abort one extraction call.
///
/// Malformed syntax never surfaces here; it only discards the affected block.
/// These variants mean the profile does not describe the grammar in use.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{language}: node kind {kind:?} at line {line} has no category")]
    UnknownNodeKind {
        language: &'static str,
        kind: String,
        line: usize,
    },

    #[error("feature vector holds {actual} values but the schema declares {expected}")]
    SchemaMismatch { expected: usize, actual: usize },
}

/// Invalid configuration file or command-line overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unsupported language {0:?}")]
    UnsupportedLanguage(String),

    #[error("invalid exclusion glob {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid logging pattern for {language}: {source}")]
    Pattern {
        language: String,
        #[source]
        source: regex::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_message() {
        let err = ExtractError::UnknownNodeKind {
            language: "java",
            kind: "record_pattern".to_string(),
            line: 12,
        };
        assert_eq!(
            err.to_string(),
            "java: node kind \"record_pattern\" at line 12 has no category"
        );
    }

    #[test]
    fn test_duplicate_kind_message() {
        let err = ProfileError::DuplicateKind {
            language: "python",
            kind: "call",
            first: "expression",
            second: "simple statement",
        };
        assert!(err.to_string().contains("both expression and simple statement"));
    }
}
