//! Local stylometric backend.
//!
//! Scores text by the density of formal connective vocabulary typical of
//! generated prose against informal markers (contractions, first person,
//! exclamations). Paraphrases are rule-based rewrites. Always configured.

use async_trait::async_trait;
use std::collections::HashSet;

use super::{AnalysisProvider, ProviderError};
use crate::models::{AiAnalysis, ParaphraseSuggestion};

const FORMAL_WORDS: &[&str] = &[
    "additionally",
    "comprehensive",
    "consequently",
    "crucial",
    "delve",
    "enhance",
    "enhanced",
    "facilitate",
    "facilitated",
    "facilitates",
    "furthermore",
    "hence",
    "implementation",
    "landscape",
    "leverage",
    "moreover",
    "nevertheless",
    "notably",
    "numerous",
    "paramount",
    "pivotal",
    "revolutionize",
    "revolutionized",
    "significant",
    "significantly",
    "thus",
    "utilize",
    "utilized",
    "various",
];

const FORMAL_PHRASES: &[&str] = &[
    "it is important to note",
    "it is worth noting",
    "in conclusion",
    "plays a crucial role",
    "a wide range of",
    "in today's",
];

const FIRST_PERSON: &[&str] = &["i", "me", "my", "mine", "i'm", "i've", "i'd", "i'll"];

const SYNONYMS: &[(&str, &str)] = &[
    ("important", "significant"),
    ("use", "employ"),
    ("uses", "employs"),
    ("used", "employed"),
    ("show", "demonstrate"),
    ("shows", "demonstrates"),
    ("help", "assist"),
    ("helps", "assists"),
    ("big", "large"),
    ("small", "minor"),
    ("many", "numerous"),
    ("quick", "rapid"),
    ("quickly", "rapidly"),
    ("common", "widespread"),
    ("sample", "example"),
    ("sentence", "statement"),
    ("make", "create"),
    ("makes", "creates"),
    ("start", "begin"),
    ("get", "obtain"),
    ("need", "require"),
    ("needs", "requires"),
    ("find", "discover"),
    ("good", "favorable"),
    ("bad", "unfavorable"),
    ("often", "frequently"),
    ("also", "additionally"),
    ("about", "regarding"),
    ("change", "alter"),
    ("changed", "altered"),
    ("buy", "purchase"),
    ("enough", "sufficient"),
    ("try", "attempt"),
    ("idea", "concept"),
    ("main", "primary"),
    ("whole", "entire"),
    ("therefore", "thus"),
    ("however", "nevertheless"),
];

const CONTRACTIONS: &[(&str, &str)] = &[
    ("can't", "cannot"),
    ("won't", "will not"),
    ("don't", "do not"),
    ("doesn't", "does not"),
    ("didn't", "did not"),
    ("isn't", "is not"),
    ("aren't", "are not"),
    ("wasn't", "was not"),
    ("it's", "it is"),
    ("that's", "that is"),
    ("there's", "there is"),
    ("i'm", "I am"),
    ("i've", "I have"),
    ("you're", "you are"),
    ("we're", "we are"),
    ("they're", "they are"),
];

#[derive(Debug, Default)]
pub struct HeuristicProvider;

impl HeuristicProvider {
    pub fn new() -> Self {
        Self
    }

    /// Probability in `[0, 1]` that `text` is generated prose, or `None`
    /// when it has no words.
    pub fn ai_likelihood(text: &str) -> Option<f64> {
        let words = normalized_words(text);
        if words.is_empty() {
            return None;
        }
        let n = words.len() as f64;
        let lower = text.to_lowercase();

        let formal_hits = words
            .iter()
            .filter(|w| FORMAL_WORDS.contains(&w.as_str()))
            .count()
            + 2 * FORMAL_PHRASES
                .iter()
                .map(|p| lower.matches(p).count())
                .sum::<usize>();

        let contractions = words
            .iter()
            .filter(|w| w.contains('\'') && !w.starts_with('\'') && !w.ends_with('\''))
            .count();
        let first_person = words
            .iter()
            .filter(|w| FIRST_PERSON.contains(&w.as_str()))
            .count();
        let exclamations = text.matches('!').count();
        let informal_hits = contractions + first_person + exclamations;

        let formal_density = (formal_hits as f64 / n * 10.0).min(2.0);
        let informal_density = (informal_hits as f64 / n * 10.0).min(2.0);
        let avg_len = words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / n;
        let length_bias = if avg_len > 5.5 {
            0.1
        } else if avg_len < 4.0 {
            -0.05
        } else {
            0.0
        };

        let p = 0.35 + 0.25 * formal_density - 0.2 * informal_density + length_bias;
        Some((p.clamp(0.0, 1.0) * 1000.0).round() / 1000.0)
    }

    /// Rule-based rewrites of `text`, deduplicated and never equal to the input.
    pub fn rewrites(text: &str) -> Vec<String> {
        let text = text.trim();
        let synonyms = map_words(text, |w| lookup(SYNONYMS, w));
        let expanded = map_words(&map_words(text, |w| lookup(CONTRACTIONS, w)), |w| {
            lookup(SYNONYMS, w)
        });
        let reordered = reorder(&synonyms);

        let mut out: Vec<String> = Vec::new();
        for candidate in [synonyms, expanded, reordered] {
            if candidate != text && !candidate.is_empty() && !out.contains(&candidate) {
                out.push(candidate);
            }
        }
        out
    }
}

#[async_trait]
impl AnalysisProvider for HeuristicProvider {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn analyze(&self, text: &str) -> Result<AiAnalysis, ProviderError> {
        let confidence = Self::ai_likelihood(text)
            .ok_or(ProviderError::Unsupported("no words to analyze"))?;
        Ok(AiAnalysis {
            ai_generated: confidence >= 0.5,
            confidence,
            semantic_similarity: None,
            provider: self.name().to_string(),
        })
    }

    async fn generate_paraphrase(
        &self,
        text: &str,
    ) -> Result<Vec<ParaphraseSuggestion>, ProviderError> {
        Ok(Self::rewrites(text)
            .into_iter()
            .map(|paraphrased| {
                let uniqueness = (100.0 - jaccard(text, &paraphrased)).round().clamp(0.0, 100.0);
                ParaphraseSuggestion {
                    original_text: text.to_string(),
                    paraphrased_text: paraphrased,
                    uniqueness_score: uniqueness as u32,
                    improvement: (uniqueness * 0.8).round() as u32,
                }
            })
            .collect())
    }

    async fn compare_similarity(&self, a: &str, b: &str) -> Result<f64, ProviderError> {
        Ok(jaccard(a, b))
    }
}

/// Lowercase words with surrounding punctuation removed.
fn normalized_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| core_of(t).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// The token without leading or trailing punctuation (inner apostrophes kept).
fn core_of(token: &str) -> &str {
    token
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .trim_matches('\'')
}

/// Word-set Jaccard similarity in `[0, 100]`, rounded to one decimal.
fn jaccard(a: &str, b: &str) -> f64 {
    let a: HashSet<String> = normalized_words(a).into_iter().collect();
    let b: HashSet<String> = normalized_words(b).into_iter().collect();
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count() as f64;
    let union = a.union(&b).count() as f64;
    (shared / union * 1000.0).round() / 10.0
}

fn lookup(table: &[(&str, &'static str)], word: &str) -> Option<&'static str> {
    let lower = word.to_lowercase();
    table
        .iter()
        .find(|(from, _)| *from == lower)
        .map(|(_, to)| *to)
}

/// Rewrites each whitespace token's core with `f`, keeping punctuation and
/// leading capitalization.
fn map_words(text: &str, f: impl Fn(&str) -> Option<&'static str>) -> String {
    text.split_whitespace()
        .map(|token| {
            let core = core_of(token);
            let Some(replacement) = (!core.is_empty()).then(|| f(core)).flatten() else {
                return token.to_string();
            };
            let Some(at) = token.find(core) else {
                return token.to_string();
            };
            let replacement = if core.chars().next().is_some_and(char::is_uppercase) {
                capitalize(replacement)
            } else {
                replacement.to_string()
            };
            format!(
                "{}{}{}",
                &token[..at],
                replacement,
                &token[at + core.len()..]
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Swaps sentence order, or clause order around the first comma; otherwise
/// prefixes a framing phrase.
fn reorder(text: &str) -> String {
    let sentences: Vec<&str> = text
        .split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.len() > 1 {
        return sentences.into_iter().rev().collect::<Vec<_>>().join(" ");
    }

    if let Some((head, tail)) = text.split_once(", ") {
        let (tail, end) = match tail.char_indices().last() {
            Some((i, c)) if matches!(c, '.' | '!' | '?') => (&tail[..i], &tail[i..]),
            _ => (tail, ""),
        };
        if !head.is_empty() && !tail.is_empty() {
            return format!("{}, {}{}", capitalize(tail), decapitalize(head), end);
        }
    }

    format!("In other words, {}", decapitalize(text))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercases the first char unless the first word looks like `I` or an acronym.
fn decapitalize(s: &str) -> String {
    let first_word = s.split_whitespace().next().unwrap_or("");
    let upper_run = first_word.chars().filter(|c| c.is_uppercase()).count();
    if first_word == "I" || first_word.starts_with("I'") || upper_run > 1 {
        return s.to_string();
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
