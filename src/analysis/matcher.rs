//! Recognizes logging invocations from normalized callee text.

use regex::{Regex, RegexBuilder};

/// Qualifier chain ending in a Python logging object.
pub const PYTHON_LOGGING_PATTERN: &str =
    r"[\w.]*log(g(ing|er))?\.(debug|info|warning|error|critical|log|exception)";

/// Qualifier chain ending in a JUL/Log4j/SLF4J logger, with the optional
/// fluent level selector (`logger.atInfo().log(..)`).
pub const JAVA_LOGGING_PATTERN: &str = concat!(
    r"[\w.]*log(g(ing|er))?",
    r"(\.at(debug|error|fatal|info|trace|warn)(\(\))?|\.atlevel\([\w.]*\))?",
    r"\.(config|entering|exiting|fine(r|st)?|info|log(p|rb)?|severe|throwing|warning",
    r"|always|catching|debug|entry|error|exit|fatal|printf|trace(entry|exit)?|warn)",
);

/// Qualifier chain ending in `console` or a logger object.
pub const JAVASCRIPT_LOGGING_PATTERN: &str =
    r"[\w.]*(console|log(g(ing|er))?)\.(debug|error|info|log|trace|warn(ing)?|fatal)";

/// Decides whether a callee string denotes a logging call.
///
/// Input is the lowercased `object.method` text of a call. Matching is
/// anchored at both ends and case-insensitive. A bare `log` (a method called
/// on an implicit object) always matches.
#[derive(Debug, Clone)]
pub struct LoggingMatcher {
    pattern: String,
    regex: Regex,
}

impl LoggingMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&format!("^(?:log|{})$", pattern))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as supplied, without anchors.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_logging_call(&self, callee: &str) -> bool {
        self.regex.is_match(callee)
    }
}
