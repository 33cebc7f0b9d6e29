//! TOML configuration.
//!
//! Every section has defaults, so an empty file (or no file at all, via
//! [`Config::default`]) is a valid configuration. [`load_config`] parses and
//! validates a file on disk.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:5000"
//! max_upload_bytes = 10485760
//!
//! [scoring]
//! match_weight = 0.7
//! ai_weight = 0.3
//!
//! [ai]
//! providers = ["openai", "heuristic"]
//! model = "gpt-4o"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Provider names accepted in `[ai].providers`.
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "heuristic"];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// Weights and thresholds used by the detector.
///
/// The defaults reproduce the historical scoring: 70% average match
/// similarity, 30% AI confidence, matches kept above 60 and classified at
/// 70 (paraphrased) and 85 (exact).
#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    #[serde(default = "default_match_weight")]
    pub match_weight: f64,
    #[serde(default = "default_ai_weight")]
    pub ai_weight: f64,
    #[serde(default = "default_detection_threshold")]
    pub detection_threshold: f64,
    #[serde(default = "default_paraphrased_threshold")]
    pub paraphrased_threshold: f64,
    #[serde(default = "default_exact_threshold")]
    pub exact_threshold: f64,
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            match_weight: default_match_weight(),
            ai_weight: default_ai_weight(),
            detection_threshold: default_detection_threshold(),
            paraphrased_threshold: default_paraphrased_threshold(),
            exact_threshold: default_exact_threshold(),
            max_sentences: default_max_sentences(),
            min_sentence_chars: default_min_sentence_chars(),
        }
    }
}

fn default_match_weight() -> f64 {
    0.7
}
fn default_ai_weight() -> f64 {
    0.3
}
fn default_detection_threshold() -> f64 {
    60.0
}
fn default_paraphrased_threshold() -> f64 {
    70.0
}
fn default_exact_threshold() -> f64 {
    85.0
}
fn default_max_sentences() -> usize {
    5
}
fn default_min_sentence_chars() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    #[serde(default = "default_domains")]
    pub domains: Vec<String>,
    /// Fixed RNG seed for reproducible simulated matches.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            domains: default_domains(),
            seed: None,
        }
    }
}

fn default_domains() -> Vec<String> {
    [
        "wikipedia.org",
        "arxiv.org",
        "scholar.google.com",
        "researchgate.net",
        "jstor.org",
        "pubmed.ncbi.nlm.nih.gov",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// Providers in priority order.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

fn default_providers() -> Vec<String> {
    vec!["openai".to_string(), "heuristic".to_string()]
}
fn default_model() -> String {
    "gpt-4o".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_max_input_chars() -> usize {
    12_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            dir: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.server.max_upload_bytes == 0 {
            bail!("server.max_upload_bytes must be > 0");
        }

        let s = &self.scoring;
        for (name, w) in [("match_weight", s.match_weight), ("ai_weight", s.ai_weight)] {
            if !(0.0..=1.0).contains(&w) {
                bail!("scoring.{} must be in [0.0, 1.0]", name);
            }
        }
        if !(0.0 <= s.detection_threshold
            && s.detection_threshold < s.paraphrased_threshold
            && s.paraphrased_threshold < s.exact_threshold
            && s.exact_threshold <= 100.0)
        {
            bail!(
                "scoring thresholds must satisfy 0 <= detection < paraphrased < exact <= 100 \
                 (got {}, {}, {})",
                s.detection_threshold,
                s.paraphrased_threshold,
                s.exact_threshold
            );
        }
        if s.max_sentences == 0 {
            bail!("scoring.max_sentences must be >= 1");
        }

        if self.sources.domains.is_empty() {
            bail!("sources.domains must not be empty");
        }

        if self.ai.providers.is_empty() {
            bail!("ai.providers must list at least one provider");
        }
        for p in &self.ai.providers {
            if !KNOWN_PROVIDERS.contains(&p.as_str()) {
                bail!(
                    "Unknown AI provider: '{}'. Must be one of: {}",
                    p,
                    KNOWN_PROVIDERS.join(", ")
                );
            }
        }
        if self.ai.max_input_chars == 0 {
            bail!("ai.max_input_chars must be > 0");
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
