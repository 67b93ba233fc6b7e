//! Terminal rendering of classification outcomes.
//!
//! Human output mirrors the original demo page: a headline with an emoji and
//! the threshold comparison, the label, and the confidence to two decimals.

use std::io::{self, Write};

use serde::Serialize;
use spamgate_ai::{AssetError, AssetSummary};
use spamgate_core::{ClassifyError, Label, Outcome, Settings, Verdict};

pub const EMPTY_INPUT_WARNING: &str = "Please enter some email text to classify.";

const RULE: &str = "---";

#[derive(Serialize)]
struct JsonOutcome<'a> {
    status: &'static str,
    #[serde(flatten)]
    verdict: Option<&'a Verdict>,
}

/// Headline sentence naming the label and the threshold it was judged against.
pub fn headline(verdict: &Verdict) -> String {
    match verdict.label {
        Label::Spam => format!("🚫 Classified as SPAM (Score >= {})", verdict.threshold),
        Label::Ham => format!("✅ Classified as HAM (Score < {})", verdict.threshold),
    }
}

pub fn write_outcome(out: &mut impl Write, outcome: &Outcome, json: bool) -> io::Result<()> {
    if json {
        let doc = JsonOutcome {
            status: match outcome {
                Outcome::Empty => "empty",
                Outcome::Classified(_) => "classified",
            },
            verdict: outcome.verdict(),
        };
        let line = serde_json::to_string(&doc).map_err(io::Error::other)?;
        return writeln!(out, "{line}");
    }

    match outcome {
        Outcome::Empty => writeln!(out, "Warning: {EMPTY_INPUT_WARNING}"),
        Outcome::Classified(v) => {
            writeln!(out, "{RULE}")?;
            writeln!(out, "{}", headline(v))?;
            writeln!(out)?;
            writeln!(out, "Classification: {}", v.label.display_name())?;
            writeln!(
                out,
                "Model Confidence Score: {:.2} (Decision Threshold is set at {})",
                v.confidence, v.threshold
            )
        }
    }
}

pub fn write_classify_error(out: &mut impl Write, err: &ClassifyError) -> io::Result<()> {
    writeln!(out, "Error: classification failed: {err}")
}

/// User-facing message for a fatal asset-load failure.
pub fn asset_error_message(err: &AssetError, settings: &Settings) -> String {
    match err {
        AssetError::NotFound(_) => format!(
            "Error: Model or Vectorizer file not found. Please ensure '{}' and '{}' exist.",
            settings.model_path.display(),
            settings.vectorizer_path.display()
        ),
        other => format!("Error loading model assets: {other}"),
    }
}

pub fn print_summary(summary: &AssetSummary, settings: &Settings) {
    println!("=== spamgate assets ===");
    println!("  {:<18} {}", "model", settings.model_path.display());
    println!("  {:<18} {}", "vectorizer", settings.vectorizer_path.display());
    println!("  {:<18} {}", "vocabulary", summary.vocabulary_len);
    println!("  {:<18} {}", "dimension", summary.dim);
    println!(
        "  {:<18} ({}, {})",
        "ngram_range", summary.ngram_range.0, summary.ngram_range.1
    );
    println!("  {:<18} {:.4}", "intercept", summary.intercept);
    if let Some(classes) = &summary.classes {
        println!("  {:<18} {}", "classes", classes.join(", "));
    }
    println!("  {:<18} {}", "threshold", settings.threshold);
}
