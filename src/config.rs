//! Configuration file for logcheck.
//!
//! Every field is optional. Command-line flags take precedence over the
//! values read here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{
    get_analyzer_by_id, registered_languages, Counting, LanguageAnalyzer, LoggingMatcher, Scope,
};
use crate::batch::build_exclusions;
use crate::error::ConfigError;

/// Config file names searched for, in order.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["logcheck.yaml", ".logcheck.yaml"];

/// Template written by `logcheck init`.
pub const TEMPLATE: &str = include_str!("templates/logcheck.yaml");

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Language id: "python", "java" or "javascript".
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub counting: Option<Counting>,
    /// Emit the serialized context column.
    #[serde(default)]
    pub context: Option<bool>,
    /// Emit the file column.
    #[serde(default)]
    pub debug: Option<bool>,
    /// Glob patterns for paths to exclude (e.g., "**/migrations/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Per-language logging call patterns replacing the built-in ones.
    #[serde(default)]
    pub logging_patterns: BTreeMap<String, String>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_str(&content, &path.display().to_string())
    }

    /// Parse a config from YAML text. `origin` names the source in errors.
    pub fn parse_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Find a config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Check languages, globs and patterns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(language) = &self.language {
            check_language(language)?;
        }
        build_exclusions(&self.excluded_paths)?;
        for (language, pattern) in &self.logging_patterns {
            check_language(language)?;
            LoggingMatcher::new(pattern).map_err(|source| ConfigError::Pattern {
                language: language.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// The logging matcher for an analyzer: the configured override if any,
    /// the analyzer's built-in one otherwise.
    pub fn matcher_for(&self, analyzer: &dyn LanguageAnalyzer) -> Result<LoggingMatcher, ConfigError> {
        match self.logging_patterns.get(analyzer.language_id()) {
            Some(pattern) => LoggingMatcher::new(pattern).map_err(|source| ConfigError::Pattern {
                language: analyzer.language_id().to_string(),
                source,
            }),
            None => Ok(analyzer.default_matcher().clone()),
        }
    }
}

/// Fail unless `language` names a registered analyzer.
pub fn check_language(language: &str) -> Result<(), ConfigError> {
    if registered_languages().contains(&language) {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedLanguage(language.to_string()))
    }
}

/// The analyzer for a language id that passed `check_language`.
pub fn analyzer_for(language: &str) -> anyhow::Result<&'static dyn LanguageAnalyzer> {
    match get_analyzer_by_id(language)? {
        Some(analyzer) => Ok(analyzer),
        None => Err(ConfigError::UnsupportedLanguage(language.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
language: java
scope: file
counting: onehot
context: true
excluded_paths:
  - "**/generated/**"
logging_patterns:
  java: '[\w.]*(log|logger)\.(info|error)'
"#;
        let config = Config::parse_str(yaml, "inline").unwrap();
        assert_eq!(config.language.as_deref(), Some("java"));
        assert_eq!(config.scope, Some(Scope::File));
        assert_eq!(config.counting, Some(Counting::OneHot));
        assert_eq!(config.context, Some(true));
        assert_eq!(config.debug, None);
        assert_eq!(config.excluded_paths.len(), 1);
        config.validate().unwrap();
    }

    #[test]
    fn test_template_parses_and_validates() {
        let config = Config::parse_str(TEMPLATE, "template").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Config::parse_str("langauge: python\n", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validate_rejects_unsupported_language() {
        let config = Config {
            language: Some("cobol".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let mut config = Config::default();
        config
            .logging_patterns
            .insert("python".to_string(), "log(".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Pattern { .. })));
    }

    #[test]
    fn test_matcher_override() {
        let analyzer = analyzer_for("python").unwrap();
        let mut config = Config::default();
        assert!(config
            .matcher_for(analyzer)
            .unwrap()
            .is_logging_call("logger.info"));

        config
            .logging_patterns
            .insert("python".to_string(), r"audit\.record".to_string());
        let matcher = config.matcher_for(analyzer).unwrap();
        assert_eq!(matcher.pattern(), r"audit\.record");
        assert!(matcher.is_logging_call("audit.record"));
        assert!(!matcher.is_logging_call("logger.info"));
    }

    #[test]
    fn test_discover() {
        let temp = TempDir::new().unwrap();
        assert!(Config::discover(temp.path()).is_none());
        std::fs::write(temp.path().join(".logcheck.yaml"), "language: python\n").unwrap();
        let found = Config::discover(temp.path()).unwrap();
        assert!(found.ends_with(".logcheck.yaml"));
        let config = Config::parse_file(found).unwrap();
        assert_eq!(config.language.as_deref(), Some("python"));
    }
}
