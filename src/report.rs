//! Plain-text report rendering.

use std::fmt::Write;

use crate::models::PlagiarismAnalysis;
use crate::text_stats::truncate_chars;

/// Match excerpts are cut to this many chars.
pub const EXCERPT_CHARS: usize = 100;

/// Renders `analysis` as the text report served by the export endpoint.
pub fn render_report(analysis: &PlagiarismAnalysis) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Plagiarism Analysis Report");
    let _ = writeln!(out, "==========================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Overall Score: {}%", analysis.overall_score);
    let _ = writeln!(
        out,
        "AI Generated: {}",
        if analysis.ai_generated { "Yes" } else { "No" }
    );
    let _ = writeln!(out, "Processing Time: {}ms", analysis.processing_time);
    let _ = writeln!(out, "Word Count: {}", analysis.word_count);
    let _ = writeln!(out, "Unique Text: {}%", analysis.unique_text);
    let _ = writeln!(out);
    let _ = writeln!(out, "Matches Found: {}", analysis.matches.len());

    for m in &analysis.matches {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "- {} ({}%)",
            m.match_type.as_str().to_uppercase(),
            m.similarity
        );
        let _ = writeln!(
            out,
            "  Text: \"{}...\"",
            truncate_chars(&m.text, EXCERPT_CHARS)
        );
        let _ = writeln!(out, "  Source: {}", m.source);
        let _ = writeln!(out, "  Lines: {}", m.line_numbers);
    }

    out
}
