//! Plagiarism detection pipeline.
//!
//! [`PlagiarismDetector::analyze`] segments the text, runs source matching and
//! the AI analysis concurrently, and aggregates both into a
//! [`PlagiarismAnalysis`]:
//!
//! ```text
//! text ─► split_sentences ─► SourceMatcher::find_matches ─┐
//!   │                                                    ├─► score ─► PlagiarismAnalysis
//!   └──────────► ProviderManager::analyze_for_plagiarism ─┘
//! ```
//!
//! Scoring: `round(clamp(avg_similarity * match_weight + confidence * 100 * ai_weight, 0, 100))`,
//! and 0 when there are no matches.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, Instrument};

use crate::config::{Config, ScoringConfig};
use crate::error::{CheckError, CheckResult};
use crate::models::{PlagiarismAnalysis, PlagiarismMatch};
use crate::providers::ProviderManager;
use crate::source_match::{SimulatedWebSearch, SourceMatcher};
use crate::text_stats::{count_words, split_sentences, unique_text_percent};

pub struct PlagiarismDetector {
    matcher: Arc<dyn SourceMatcher>,
    providers: Arc<ProviderManager>,
    scoring: ScoringConfig,
}

impl PlagiarismDetector {
    pub fn new(
        matcher: Arc<dyn SourceMatcher>,
        providers: Arc<ProviderManager>,
        scoring: ScoringConfig,
    ) -> Self {
        Self {
            matcher,
            providers,
            scoring,
        }
    }

    /// Detector with the simulated web search, sharing `providers`.
    pub fn from_config(config: &Config, providers: Arc<ProviderManager>) -> Self {
        let matcher = SimulatedWebSearch::new(&config.sources, &config.scoring);
        Self::new(Arc::new(matcher), providers, config.scoring.clone())
    }

    pub fn providers(&self) -> &Arc<ProviderManager> {
        &self.providers
    }

    /// Analyzes `text`.
    ///
    /// # Errors
    ///
    /// [`CheckError::InvalidInput`] when `text` is empty or whitespace. AI
    /// backend failures are absorbed by the provider manager and only lower
    /// the score's AI component.
    pub async fn analyze(&self, text: &str) -> CheckResult<PlagiarismAnalysis> {
        if text.trim().is_empty() {
            return Err(CheckError::invalid("No text content found"));
        }

        let request_id = uuid::Uuid::new_v4();
        let span = info_span!("analyze", %request_id, chars = text.chars().count());
        self.analyze_inner(text).instrument(span).await
    }

    async fn analyze_inner(&self, text: &str) -> CheckResult<PlagiarismAnalysis> {
        let started = Instant::now();

        let sentences = split_sentences(text, self.scoring.min_sentence_chars);
        let (matches, ai) = tokio::join!(
            self.matcher.find_matches(&sentences),
            self.providers.analyze_for_plagiarism(text),
        );

        let overall_score = overall_score(&matches, ai.confidence, &self.scoring);
        let word_count = count_words(text);
        let matched_words: usize = matches.iter().map(|m| count_words(&m.text)).sum();
        let unique_text = unique_text_percent(word_count, matched_words);
        let processing_time = started.elapsed().as_millis() as u64;

        info!(
            overall_score,
            matches = matches.len(),
            ai_generated = ai.ai_generated,
            provider = %ai.provider,
            elapsed_ms = processing_time,
            "Analysis complete"
        );

        Ok(PlagiarismAnalysis {
            overall_score,
            matches,
            ai_generated: ai.ai_generated,
            processing_time,
            word_count,
            unique_text,
        })
    }
}

/// Weighted score in `[0, 100]`; 0 without matches regardless of `confidence`.
pub fn overall_score(matches: &[PlagiarismMatch], confidence: f64, scoring: &ScoringConfig) -> u32 {
    if matches.is_empty() {
        return 0;
    }
    let avg = matches.iter().map(|m| m.similarity).sum::<f64>() / matches.len() as f64;
    let weighted = avg * scoring.match_weight + confidence * 100.0 * scoring.ai_weight;
    weighted.clamp(0.0, 100.0).round() as u32
}
