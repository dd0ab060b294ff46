//! Discovery of the source files to extract from.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::analysis::language_for_extension;
use crate::error::ConfigError;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["vendor", "node_modules", "__pycache__", "target", "venv"];

/// Compile exclusion globs (e.g. `"**/generated/**"`) into one matcher.
pub fn build_exclusions(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ConfigError::Glob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ConfigError::Glob {
        pattern: patterns.join(", "),
        source,
    })
}

/// Collect the files of `language` under `root`, sorted by path.
///
/// A file given directly is returned as-is, whatever its extension.
pub fn collect_files(
    root: &Path,
    language: &str,
    excluded: &GlobSet,
) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.iter().any(|skip| *skip == name)
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if language_for_extension(ext) != Some(language) {
            continue;
        }
        if is_excluded(excluded, root, path) {
            tracing::debug!(path = %path.display(), "excluded");
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// Globs are tried against the path relative to the root and the full path.
fn is_excluded(excluded: &GlobSet, root: &Path, path: &Path) -> bool {
    if excluded.is_empty() {
        return false;
    }
    let relative = path.strip_prefix(root).unwrap_or(path);
    excluded.is_match(relative) || excluded.is_match(path)
}

/// Identifier written to output rows for a file.
pub fn file_id(root: &Path, path: &Path) -> String {
    let relative = match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel,
        _ => path,
    };
    relative.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x = 1\n").unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files.iter().map(|f| file_id(root, f)).collect()
    }

    #[test]
    fn test_collect_filters_by_language() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.py");
        touch(temp.path(), "a.py");
        touch(temp.path(), "Main.java");
        touch(temp.path(), "app.js");
        touch(temp.path(), "pkg/c.py");

        let none = build_exclusions(&[]).unwrap();
        let files = collect_files(temp.path(), "python", &none).unwrap();
        assert_eq!(names(temp.path(), &files), vec!["a.py", "b.py", "pkg/c.py"]);

        let files = collect_files(temp.path(), "java", &none).unwrap();
        assert_eq!(names(temp.path(), &files), vec!["Main.java"]);
    }

    #[test]
    fn test_collect_skips_hidden_and_vendor_dirs() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "keep.js");
        touch(temp.path(), ".git/hook.js");
        touch(temp.path(), "node_modules/lib/index.js");

        let none = build_exclusions(&[]).unwrap();
        let files = collect_files(temp.path(), "javascript", &none).unwrap();
        assert_eq!(names(temp.path(), &files), vec!["keep.js"]);
    }

    #[test]
    fn test_collect_applies_exclusions() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "src/main.py");
        touch(temp.path(), "src/generated/models.py");

        let excluded = build_exclusions(&["**/generated/**".to_string()]).unwrap();
        let files = collect_files(temp.path(), "python", &excluded).unwrap();
        assert_eq!(names(temp.path(), &files), vec!["src/main.py"]);
    }

    #[test]
    fn test_single_file_accepted_as_is() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "script");

        let none = build_exclusions(&[]).unwrap();
        let path = temp.path().join("script");
        let files = collect_files(&path, "python", &none).unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let err = build_exclusions(&["src/[".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::Glob { .. }));
    }

    #[test]
    fn test_file_id_for_single_file_keeps_path() {
        let path = Path::new("/tmp/app.py");
        assert_eq!(file_id(path, path), "/tmp/app.py");
        assert_eq!(file_id(Path::new("/tmp"), path), "app.py");
    }
}
