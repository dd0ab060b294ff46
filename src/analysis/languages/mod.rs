//! Language-specific analyzer implementations.

mod java;
mod javascript;
mod python;

pub use java::JavaAnalyzer;
pub use javascript::JavaScriptAnalyzer;
pub use python::PythonAnalyzer;
#[cfg(test)]
pub(crate) use python::PYTHON_WITHOUT_FOR;

use once_cell::sync::OnceCell;
use phf::phf_map;

use super::LanguageAnalyzer;
use crate::error::ProfileError;

/// File extension to language id.
static EXTENSIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "py" => "python",
    "java" => "java",
    "js" => "javascript",
    "jsx" => "javascript",
    "mjs" => "javascript",
};

/// Static storage for Java analyzer.
static JAVA_ANALYZER: OnceCell<JavaAnalyzer> = OnceCell::new();

/// Static storage for JavaScript analyzer.
static JAVASCRIPT_ANALYZER: OnceCell<JavaScriptAnalyzer> = OnceCell::new();

/// Static storage for Python analyzer.
static PYTHON_ANALYZER: OnceCell<PythonAnalyzer> = OnceCell::new();

/// Language id for a file extension (without dot).
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    EXTENSIONS.get(ext).copied()
}

/// Get an analyzer for the given file extension.
///
/// Returns `Ok(None)` if no analyzer handles the extension.
pub fn get_analyzer(ext: &str) -> Result<Option<&'static dyn LanguageAnalyzer>, ProfileError> {
    match language_for_extension(ext) {
        Some(lang_id) => get_analyzer_by_id(lang_id),
        None => Ok(None),
    }
}

/// Get an analyzer by language ID, building it on first use.
pub fn get_analyzer_by_id(
    lang_id: &str,
) -> Result<Option<&'static dyn LanguageAnalyzer>, ProfileError> {
    let analyzer: &'static dyn LanguageAnalyzer = match lang_id {
        "java" => JAVA_ANALYZER.get_or_try_init(JavaAnalyzer::new)?,
        "javascript" => JAVASCRIPT_ANALYZER.get_or_try_init(JavaScriptAnalyzer::new)?,
        "python" => PYTHON_ANALYZER.get_or_try_init(PythonAnalyzer::new)?,
        _ => return Ok(None),
    };
    Ok(Some(analyzer))
}

/// Get all registered language IDs.
pub fn registered_languages() -> &'static [&'static str] {
    &["java", "javascript", "python"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lookup() {
        assert_eq!(language_for_extension("py"), Some("python"));
        assert_eq!(language_for_extension("mjs"), Some("javascript"));
        assert_eq!(language_for_extension("rs"), None);
    }

    #[test]
    fn test_every_registered_language_builds() {
        for lang in registered_languages() {
            let analyzer = get_analyzer_by_id(lang).unwrap();
            assert_eq!(analyzer.map(|a| a.language_id()), Some(*lang));
        }
    }

    #[test]
    fn test_extensions_agree_with_analyzers() {
        for ext in ["py", "java", "js", "jsx", "mjs"] {
            let analyzer = get_analyzer(ext).unwrap().unwrap();
            assert!(analyzer.handles_extension(ext));
        }
        assert!(get_analyzer("go").unwrap().is_none());
    }
}
