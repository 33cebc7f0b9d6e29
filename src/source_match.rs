//! Source matching: attributing sentences to external sources.
//!
//! [`SourceMatcher`] is the seam between the detector and whatever corpus
//! backs it. The shipped implementation, [`SimulatedWebSearch`], draws
//! similarity scores at random and invents article URLs on a fixed pool of
//! domains. A real search API or a local corpus index plugs in by
//! implementing the same trait.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::config::{ScoringConfig, SourcesConfig};
use crate::models::{MatchType, PlagiarismMatch};
use crate::text_stats::{strip_markup, Sentence};

const URL_ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const URL_ID_LEN: usize = 9;

/// Finds external passages resembling the given sentences.
#[async_trait]
pub trait SourceMatcher: Send + Sync {
    async fn find_matches(&self, sentences: &[Sentence]) -> Vec<PlagiarismMatch>;
}

/// Classifies a similarity score, or `None` when it does not clear the
/// detection threshold.
///
/// Thresholds are exclusive: with the defaults, `(85, 100]` is exact,
/// `(70, 85]` paraphrased, `(60, 70]` similar.
pub fn classify_similarity(similarity: f64, scoring: &ScoringConfig) -> Option<MatchType> {
    if similarity > scoring.exact_threshold {
        Some(MatchType::Exact)
    } else if similarity > scoring.paraphrased_threshold {
        Some(MatchType::Paraphrased)
    } else if similarity > scoring.detection_threshold {
        Some(MatchType::Similar)
    } else {
        None
    }
}

/// Random stand-in for a web search backend.
pub struct SimulatedWebSearch {
    domains: Vec<String>,
    scoring: ScoringConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedWebSearch {
    /// A fixed `sources.seed` makes every run produce the same matches.
    pub fn new(sources: &SourcesConfig, scoring: &ScoringConfig) -> Self {
        let rng = match sources.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            domains: sources.domains.clone(),
            scoring: scoring.clone(),
            rng: Mutex::new(rng),
        }
    }

    fn article_url(&self, rng: &mut StdRng) -> Option<String> {
        let domain = self.domains.choose(rng)?;
        let id: String = (0..URL_ID_LEN)
            .map(|_| URL_ID_CHARS[rng.gen_range(0..URL_ID_CHARS.len())] as char)
            .collect();
        Some(format!("https://{}/article/{}", domain, id))
    }
}

#[async_trait]
impl SourceMatcher for SimulatedWebSearch {
    async fn find_matches(&self, sentences: &[Sentence]) -> Vec<PlagiarismMatch> {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut matches = Vec::new();
        for sentence in sentences.iter().take(self.scoring.max_sentences) {
            let similarity = (rng.gen_range(0.0..100.0_f64) * 10.0).round() / 10.0;
            let Some(match_type) = classify_similarity(similarity, &self.scoring) else {
                continue;
            };
            let Some(source) = self.article_url(&mut rng) else {
                continue;
            };

            matches.push(PlagiarismMatch {
                id: format!("match-{}", sentence.index),
                text: strip_markup(&sentence.text),
                similarity,
                source,
                start_index: sentence.start,
                end_index: sentence.end,
                line_numbers: sentence.line_range(),
                match_type,
            });
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_stats::split_sentences;

    fn seeded(seed: u64) -> SimulatedWebSearch {
        let sources = SourcesConfig {
            seed: Some(seed),
            ..SourcesConfig::default()
        };
        SimulatedWebSearch::new(&sources, &ScoringConfig::default())
    }

    fn many_sentences() -> Vec<Sentence> {
        let text = (0..12)
            .map(|i| format!("Sentence number {i} is long enough to keep."))
            .collect::<Vec<_>>()
            .join(" ");
        split_sentences(&text, 10)
    }

    #[test]
    fn classification_thresholds_are_exclusive() {
        let s = ScoringConfig::default();
        assert_eq!(classify_similarity(100.0, &s), Some(MatchType::Exact));
        assert_eq!(classify_similarity(85.1, &s), Some(MatchType::Exact));
        assert_eq!(classify_similarity(85.0, &s), Some(MatchType::Paraphrased));
        assert_eq!(classify_similarity(70.1, &s), Some(MatchType::Paraphrased));
        assert_eq!(classify_similarity(70.0, &s), Some(MatchType::Similar));
        assert_eq!(classify_similarity(60.1, &s), Some(MatchType::Similar));
        assert_eq!(classify_similarity(60.0, &s), None);
        assert_eq!(classify_similarity(0.0, &s), None);
    }

    #[tokio::test]
    async fn matches_respect_threshold_and_limit() {
        let search = seeded(42);
        let sentences = many_sentences();
        for _ in 0..20 {
            let matches = search.find_matches(&sentences).await;
            assert!(matches.len() <= 5);
            for m in &matches {
                assert!(m.similarity > 60.0 && m.similarity <= 100.0);
                let index: usize = m.id.trim_start_matches("match-").parse().unwrap();
                assert!(index < 5);
                assert_eq!(
                    classify_similarity(m.similarity, &ScoringConfig::default()),
                    Some(m.match_type)
                );
            }
        }
    }

    #[tokio::test]
    async fn urls_use_configured_domains() {
        let search = seeded(7);
        let sentences = many_sentences();
        let domains = SourcesConfig::default().domains;
        for _ in 0..20 {
            for m in search.find_matches(&sentences).await {
                let rest = m.source.strip_prefix("https://").unwrap();
                let (domain, path) = rest.split_once("/article/").unwrap();
                assert!(domains.iter().any(|d| d == domain));
                assert_eq!(path.len(), URL_ID_LEN);
                assert!(path
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
            }
        }
    }

    #[tokio::test]
    async fn same_seed_same_matches() {
        let sentences = many_sentences();
        let a = seeded(99).find_matches(&sentences).await;
        let b = seeded(99).find_matches(&sentences).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn offsets_come_from_sentences() {
        let search = seeded(3);
        let sentences = many_sentences();
        for _ in 0..20 {
            for m in search.find_matches(&sentences).await {
                let index: usize = m.id.trim_start_matches("match-").parse().unwrap();
                assert_eq!(m.start_index, sentences[index].start);
                assert_eq!(m.end_index, sentences[index].end);
                assert_eq!(m.text, sentences[index].text);
            }
        }
    }

    #[tokio::test]
    async fn markup_is_stripped_from_excerpts() {
        let sources = SourcesConfig {
            seed: Some(1),
            ..SourcesConfig::default()
        };
        let scoring = ScoringConfig {
            detection_threshold: 0.0,
            paraphrased_threshold: 0.5,
            exact_threshold: 99.9,
            ..ScoringConfig::default()
        };
        let search = SimulatedWebSearch::new(&sources, &scoring);
        let sentences = split_sentences("<b>Bold claims</b> are made here", 10);
        let mut seen = false;
        for _ in 0..50 {
            for m in search.find_matches(&sentences).await {
                assert_eq!(m.text, "Bold claims are made here");
                seen = true;
            }
        }
        assert!(seen);
    }

    #[tokio::test]
    async fn no_sentences_no_matches() {
        assert!(seeded(1).find_matches(&[]).await.is_empty());
    }
}
