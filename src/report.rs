//! Output formatting for logcheck results.
//!
//! Supports three output formats:
//! - CSV: one row per feature vector, header = schema columns
//! - JSON: vectors or recommendations for programmatic consumption
//! - Pretty: colored terminal output for recommendations
//!
//! Run summaries always go to stderr so they never mix with the data stream.

use colored::*;
use serde::Serialize;
use std::io::{self, Write};

use crate::analysis::FeatureVector;
use crate::batch::{BatchResult, BatchSummary, FileOutcome};
use crate::recommend::{Recommendation, RecommendSummary, Recommendations};

// =============================================================================
// CSV Format
// =============================================================================

/// Write every vector as one CSV row, preceded by the header row.
pub fn write_csv<W: Write>(out: &mut W, result: &BatchResult) -> io::Result<()> {
    write_csv_row(out, result.schema.columns().iter().map(String::as_str))?;
    for (_, vector) in result.vectors() {
        let cells: Vec<String> = vector.values().map(|v| v.to_string()).collect();
        write_csv_row(out, cells.iter().map(String::as_str))?;
    }
    out.flush()
}

fn write_csv_row<'a, W: Write>(
    out: &mut W,
    cells: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
    let row: Vec<String> = cells.map(csv_escape).collect();
    writeln!(out, "{}", row.join(","))
}

/// Quote a cell when it holds a delimiter, a quote or a line break.
pub fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report of an extraction run.
#[derive(Serialize)]
pub struct JsonExtractReport<'a> {
    pub version: &'static str,
    pub language: &'a str,
    pub columns: &'a [String],
    pub summary: BatchSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<JsonProblem<'a>>,
    pub vectors: Vec<&'a FeatureVector>,
}

/// A file that contributed no vectors.
#[derive(Serialize)]
pub struct JsonProblem<'a> {
    pub file: &'a str,
    pub status: &'static str,
    pub reason: &'a str,
}

impl<'a> JsonProblem<'a> {
    fn from_outcome(outcome: &'a FileOutcome) -> Self {
        JsonProblem {
            file: &outcome.file_id,
            status: outcome.status.as_str(),
            reason: outcome.status.reason().unwrap_or(""),
        }
    }
}

/// Write the vectors of a run as one JSON document.
pub fn write_json<W: Write>(
    out: &mut W,
    language: &str,
    result: &BatchResult,
) -> anyhow::Result<()> {
    let report = JsonExtractReport {
        version: env!("CARGO_PKG_VERSION"),
        language,
        columns: result.schema.columns(),
        summary: result.summary,
        problems: result.problems().map(JsonProblem::from_outcome).collect(),
        vectors: result.vectors().map(|(_, v)| v).collect(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

/// JSON report of a recommendation run.
#[derive(Serialize)]
pub struct JsonRecommendReport<'a> {
    pub version: &'static str,
    pub path: &'a str,
    pub headline: String,
    pub summary: RecommendSummary,
    pub recommendations: &'a [Recommendation],
}

pub fn write_recommendations_json<W: Write>(
    out: &mut W,
    path: &str,
    recommendations: &Recommendations,
) -> anyhow::Result<()> {
    let report = JsonRecommendReport {
        version: env!("CARGO_PKG_VERSION"),
        path,
        headline: recommendations.summary.headline(),
        summary: recommendations.summary,
        recommendations: &recommendations.items,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write recommendations in pretty (human-readable) format.
pub fn write_recommendations_pretty(path: &str, recommendations: &Recommendations) {
    // Header
    println!();
    print!("  ");
    print!("{}", "logcheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    println!();

    write_headline(&recommendations.summary, recommendations.items.len());
    println!();

    if !recommendations.is_empty() {
        write_recommendation_list(&recommendations.items);
    }
}

fn write_headline(summary: &RecommendSummary, missing: usize) {
    if missing == 0 {
        print!("  {}", "✓ PASS".green());
    } else {
        print!("  {}", "✗ MISSING LOGS".red());
    }
    println!("  {}", summary.headline());
}

fn write_recommendation_list(items: &[Recommendation]) {
    println!("  {} ({}):", "Recommendations".bold(), items.len());
    println!();

    for rec in items {
        print!("    {} ", "LOG  ".yellow());
        print!("{:<20}", rec.block_type.dimmed());
        print!("{}", rec.file.blue());
        if rec.line > 0 {
            print!("{}", format!(":{}", rec.line).dimmed());
        }
        println!();
        println!("            {}", rec.message);
        println!();
    }
}

// =============================================================================
// Summary (stderr)
// =============================================================================

/// Write the per-file problems and the aggregate counts of a run to stderr.
pub fn write_summary(result: &BatchResult) {
    for outcome in result.problems() {
        eprintln!(
            "  {} {} ({})",
            outcome.status.as_str().yellow(),
            outcome.file_id,
            outcome.status.reason().unwrap_or("")
        );
    }
    eprintln!("{}", summary_line(&result.summary).dimmed());
}

/// One-line aggregate of a run.
pub fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "{} files ({} skipped, {} failed), {} blocks ({} discarded, {} with logging), {} vectors",
        summary.files_total(),
        summary.files_skipped,
        summary.files_failed,
        summary.blocks_seen,
        summary.blocks_discarded,
        summary.blocks_logged,
        summary.vectors_emitted
    )
}
