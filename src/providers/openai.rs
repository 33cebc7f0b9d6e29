//! OpenAI-compatible chat completions backend.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{AnalysisProvider, ProviderError};
use crate::config::AiConfig;
use crate::models::{AiAnalysis, ParaphraseSuggestion};
use crate::text_stats::truncate_chars;

const ANALYZE_PROMPT: &str = "You are an expert plagiarism detection system. Analyze the given text for:
1. Whether it appears to be AI-generated (check for patterns, repetitiveness, lack of human errors)
2. Semantic similarity patterns that might indicate plagiarism
3. Overall confidence in the analysis

Respond with JSON in this format: {
  \"aiGenerated\": boolean,
  \"semanticSimilarity\": number (0-100),
  \"confidence\": number (0-1),
  \"reasoning\": string
}";

const PARAPHRASE_PROMPT: &str = "You are an expert writing assistant. Generate 3 high-quality paraphrasing suggestions for the given text.
Each suggestion should:
1. Maintain the original meaning
2. Use different vocabulary and sentence structure
3. Be more unique and original
4. Improve readability

Respond with JSON in this format: {
  \"suggestions\": [
    {
      \"paraphrasedText\": string,
      \"uniquenessScore\": number (0-100),
      \"improvement\": number (0-100)
    }
  ]
}";

const SIMILARITY_PROMPT: &str = "Compare the semantic similarity between these two texts. Consider meaning, concepts, and structure.
Respond with JSON: { \"similarity\": number (0-100) }";

/// Calls `POST {base_url}/chat/completions` with `response_format: json_object`.
///
/// Retry strategy (same for every operation):
/// - HTTP 429 or 5xx → retry with exponential backoff
/// - HTTP 4xx (not 429) → fail immediately
/// - Network error → retry
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_retries: u32,
    max_input_chars: usize,
}

impl OpenAiProvider {
    /// Reads the API key from the environment variable named by `config.api_key_env`.
    pub fn new(config: &AiConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &AiConfig, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            max_retries: config.max_retries,
            max_input_chars: config.max_input_chars,
        }
    }

    /// Sends one chat completion and parses the message content as JSON.
    async fn chat_json(&self, system: &str, user: &str) -> Result<Value, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured(self.name().to_string()))?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "response_format": { "type": "json_object" },
        });
        let url = format!("{}/chat/completions", self.base_url);

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&url)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: Value = response.json().await?;
                        return parse_message_content(&json);
                    }

                    let message = response.text().await.unwrap_or_default();
                    let err = ProviderError::Api {
                        status: status.as_u16(),
                        message,
                    };
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or(ProviderError::MissingContent))
    }
}

#[async_trait]
impl AnalysisProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn analyze(&self, text: &str) -> Result<AiAnalysis, ProviderError> {
        let input = truncate_chars(text, self.max_input_chars);
        let value = self.chat_json(ANALYZE_PROMPT, input).await?;
        parse_analysis(value, self.name())
    }

    async fn generate_paraphrase(
        &self,
        text: &str,
    ) -> Result<Vec<ParaphraseSuggestion>, ProviderError> {
        let input = truncate_chars(text, self.max_input_chars);
        let value = self.chat_json(PARAPHRASE_PROMPT, input).await?;
        parse_suggestions(value, text)
    }

    async fn compare_similarity(&self, a: &str, b: &str) -> Result<f64, ProviderError> {
        let half = self.max_input_chars / 2;
        let user = format!(
            "Text 1: {}\n\nText 2: {}",
            truncate_chars(a, half),
            truncate_chars(b, half)
        );
        let value = self.chat_json(SIMILARITY_PROMPT, &user).await?;
        let parsed: SimilarityReply =
            serde_json::from_value(value).map_err(|e| ProviderError::Json(e.to_string()))?;
        Ok(parsed.similarity.clamp(0.0, 100.0))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisReply {
    #[serde(default)]
    ai_generated: bool,
    #[serde(default)]
    semantic_similarity: f64,
    #[serde(default = "default_confidence")]
    confidence: f64,
}

fn default_confidence() -> f64 {
    0.5
}

#[derive(Debug, Deserialize)]
struct ParaphraseReply {
    #[serde(default)]
    suggestions: Vec<SuggestionReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionReply {
    #[serde(default)]
    paraphrased_text: String,
    #[serde(default)]
    uniqueness_score: f64,
    #[serde(default)]
    improvement: f64,
}

#[derive(Debug, Deserialize)]
struct SimilarityReply {
    #[serde(default)]
    similarity: f64,
}

/// Extracts `choices[0].message.content` and parses it as a JSON object.
fn parse_message_content(json: &Value) -> Result<Value, ProviderError> {
    let content = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or(ProviderError::MissingContent)?;

    serde_json::from_str(content).map_err(|e| ProviderError::Json(e.to_string()))
}

fn parse_analysis(value: Value, provider: &str) -> Result<AiAnalysis, ProviderError> {
    let reply: AnalysisReply =
        serde_json::from_value(value).map_err(|e| ProviderError::Json(e.to_string()))?;
    Ok(AiAnalysis {
        ai_generated: reply.ai_generated,
        confidence: reply.confidence.clamp(0.0, 1.0),
        semantic_similarity: Some(reply.semantic_similarity.clamp(0.0, 100.0)),
        provider: provider.to_string(),
    })
}

fn parse_suggestions(
    value: Value,
    original: &str,
) -> Result<Vec<ParaphraseSuggestion>, ProviderError> {
    let reply: ParaphraseReply =
        serde_json::from_value(value).map_err(|e| ProviderError::Json(e.to_string()))?;
    Ok(reply
        .suggestions
        .into_iter()
        .filter(|s| !s.paraphrased_text.trim().is_empty())
        .map(|s| ParaphraseSuggestion {
            original_text: original.to_string(),
            paraphrased_text: s.paraphrased_text,
            uniqueness_score: s.uniqueness_score.clamp(0.0, 100.0).round() as u32,
            improvement: s.improvement.clamp(0.0, 100.0).round() as u32,
        })
        .collect())
}
