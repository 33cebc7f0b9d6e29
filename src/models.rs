//! Core data models.
//!
//! These types flow through the analysis pipeline and are serialized with
//! camelCase field names, which is the JSON shape the web client consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How closely a matched passage follows its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Paraphrased,
    Similar,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Paraphrased => "paraphrased",
            MatchType::Similar => "similar",
        }
    }
}

/// A passage of the analyzed text attributed to an external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismMatch {
    pub id: String,
    pub text: String,
    /// Similarity in `[0, 100]`.
    pub similarity: f64,
    /// Source URI.
    pub source: String,
    /// Char offset of the passage start in the analyzed text.
    pub start_index: usize,
    /// Char offset one past the passage end.
    pub end_index: usize,
    /// `"<first>-<last>"`, 1-based.
    pub line_numbers: String,
    #[serde(rename = "type")]
    pub match_type: MatchType,
}

/// Result of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismAnalysis {
    /// Integer in `[0, 100]`.
    pub overall_score: u32,
    pub matches: Vec<PlagiarismMatch>,
    pub ai_generated: bool,
    /// Wall-clock milliseconds.
    pub processing_time: u64,
    pub word_count: usize,
    /// Integer in `[0, 100]`.
    pub unique_text: u32,
}

/// Normalized answer from an AI backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub ai_generated: bool,
    /// In `[0, 1]`.
    pub confidence: f64,
    /// Semantic similarity estimate in `[0, 100]`, when the backend reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_similarity: Option<f64>,
    /// Name of the backend that answered, or `"none"`.
    pub provider: String,
}

impl AiAnalysis {
    /// The degraded result returned when every backend failed.
    pub fn none() -> Self {
        Self {
            ai_generated: false,
            confidence: 0.0,
            semantic_similarity: None,
            provider: "none".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseSuggestion {
    pub original_text: String,
    pub paraphrased_text: String,
    /// In `[0, 100]`.
    pub uniqueness_score: u32,
    /// In `[0, 100]`.
    pub improvement: u32,
}

/// A submitted document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: u64,
    pub user_id: Option<u64>,
    pub filename: String,
    pub original_text: String,
    pub file_type: String,
    pub file_size: usize,
    /// Hex SHA-256 of `original_text`.
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a [`Document`].
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Option<u64>,
    pub filename: String,
    pub original_text: String,
    pub file_type: String,
    pub file_size: usize,
}

/// A stored analysis of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismReport {
    pub id: u64,
    pub document_id: u64,
    pub overall_score: u32,
    pub matches: Vec<PlagiarismMatch>,
    pub ai_generated: bool,
    pub processing_time: u64,
    pub word_count: usize,
    pub unique_text: u32,
    pub created_at: DateTime<Utc>,
}

impl PlagiarismReport {
    /// The analysis this report was created from.
    pub fn analysis(&self) -> PlagiarismAnalysis {
        PlagiarismAnalysis {
            overall_score: self.overall_score,
            matches: self.matches.clone(),
            ai_generated: self.ai_generated,
            processing_time: self.processing_time,
            word_count: self.word_count,
            unique_text: self.unique_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseCacheEntry {
    pub id: u64,
    pub original_text: String,
    pub paraphrased_text: String,
    pub uniqueness_score: u32,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when caching a paraphrase.
#[derive(Debug, Clone)]
pub struct NewParaphrase {
    pub original_text: String,
    pub paraphrased_text: String,
    pub uniqueness_score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_serializes_with_wire_names() {
        let m = PlagiarismMatch {
            id: "match-0".into(),
            text: "abc".into(),
            similarity: 91.5,
            source: "https://arxiv.org/article/abc".into(),
            start_index: 0,
            end_index: 3,
            line_numbers: "1-1".into(),
            match_type: MatchType::Exact,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["type"], "exact");
        assert_eq!(json["startIndex"], 0);
        assert_eq!(json["lineNumbers"], "1-1");
    }

    #[test]
    fn none_analysis_is_low_confidence() {
        let a = AiAnalysis::none();
        assert!(!a.ai_generated);
        assert_eq!(a.confidence, 0.0);
        assert_eq!(a.provider, "none");
    }
}
