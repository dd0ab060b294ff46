//! Recommendations for blocks that do not log.
//!
//! By default only exception handlers are considered. Each handler block
//! without a logging call becomes one [`Recommendation`].

use serde::Serialize;

use crate::analysis::features::{LOCATION, TYPE};
use crate::analysis::{FeatureVector, LanguageProfile};
use crate::batch::BatchResult;

/// One block that should log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub file: String,
    pub line: usize,
    pub block_type: String,
    pub message: String,
}

/// Counts behind the summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecommendSummary {
    pub blocks_considered: usize,
    pub blocks_logged: usize,
    /// Whether every block kind was considered, not only handlers.
    pub all_blocks: bool,
}

impl RecommendSummary {
    pub fn headline(&self) -> String {
        let what = if self.all_blocks { "blocks" } else { "handler blocks" };
        format!(
            "Logging used in {} out of {} {}",
            self.blocks_logged, self.blocks_considered, what
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Recommendations {
    pub items: Vec<Recommendation>,
    pub summary: RecommendSummary,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Build recommendations from a batch run.
///
/// The run must keep logged blocks (training mode) so they can be counted
/// in the summary.
pub fn recommend(result: &BatchResult, profile: &LanguageProfile, all: bool) -> Recommendations {
    let mut recommendations = Recommendations {
        summary: RecommendSummary {
            all_blocks: all,
            ..Default::default()
        },
        ..Default::default()
    };

    for (outcome, vector) in result.vectors() {
        let Some(kind) = block_kind(profile, vector) else {
            tracing::debug!(file = %outcome.file_id, "vector without a decodable type");
            continue;
        };
        if !all && !profile.is_handler(kind) {
            continue;
        }

        recommendations.summary.blocks_considered += 1;
        if vector.contains_logging() {
            recommendations.summary.blocks_logged += 1;
            continue;
        }

        let line = vector.text(LOCATION).and_then(start_line).unwrap_or(0);
        recommendations.items.push(Recommendation {
            file: outcome.file_id.clone(),
            line,
            block_type: kind.to_string(),
            message: format!("{} block has no logging call", kind),
        });
    }

    recommendations
}

/// Kind of the block, decoded from its `type` symbol.
fn block_kind(profile: &LanguageProfile, vector: &FeatureVector) -> Option<&'static str> {
    let symbol = vector.text(TYPE)?.chars().next()?;
    profile.kind_for_symbol(symbol)
}

/// Start line of a `"sl:sc;el:ec"` location.
fn start_line(location: &str) -> Option<usize> {
    location.split(':').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{get_analyzer_by_id, ExtractOptions, Extractor};
    use crate::batch::Runner;
    use tempfile::TempDir;

    const SOURCE: &str = r#"
def load(path):
    try:
        return read(path)
    except OSError:
        return None

def save(path, data):
    try:
        write(path, data)
    except OSError as e:
        logger.error("save failed")
"#;

    fn run(source: &str, all: bool) -> Recommendations {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("io.py");
        std::fs::write(&path, source).unwrap();

        let analyzer = get_analyzer_by_id("python").unwrap().unwrap();
        let options = ExtractOptions {
            training: true,
            ..Default::default()
        };
        let extractor = Extractor::new(analyzer, analyzer.default_matcher().clone(), options);
        let result = Runner::new(extractor, temp.path()).run(&[path]).unwrap();
        recommend(&result, analyzer.profile(), all)
    }

    #[test]
    fn test_unlogged_handler_recommended() {
        let recs = run(SOURCE, false);
        assert_eq!(recs.items.len(), 1);
        let rec = &recs.items[0];
        assert_eq!(rec.file, "io.py");
        assert_eq!(rec.line, 6);
        assert_eq!(rec.block_type, "except_clause");
        assert_eq!(
            recs.summary.headline(),
            "Logging used in 1 out of 2 handler blocks"
        );
    }

    #[test]
    fn test_all_blocks_considered() {
        let recs = run(SOURCE, true);
        assert_eq!(recs.summary.blocks_considered, 6);
        assert_eq!(recs.summary.blocks_logged, 1);
        assert_eq!(recs.items.len(), 5);
        assert!(recs.summary.headline().ends_with("out of 6 blocks"));
    }

    #[test]
    fn test_start_line() {
        assert_eq!(start_line("12:5;14:9"), Some(12));
        assert_eq!(start_line(""), None);
    }
}
