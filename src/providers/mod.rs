//! AI analysis providers and the failover manager.
//!
//! Defines the [`AnalysisProvider`] trait and two implementations:
//! - **[`OpenAiProvider`]**: calls an OpenAI-compatible chat completions API
//!   with JSON responses, retry, and backoff.
//! - **[`HeuristicProvider`]**: local stylometric heuristic; needs no
//!   credentials and no network.
//!
//! [`ProviderManager`] holds providers in priority order and answers every
//! request with the first one that succeeds. Provider errors are logged and
//! swallowed; when every provider fails the manager returns a degraded result
//! ([`AiAnalysis::none`], an empty suggestion list, or a similarity of 0)
//! instead of an error.
//!
//! # Provider Selection
//!
//! ```rust
//! use plagcheck::config::AiConfig;
//! use plagcheck::providers::ProviderManager;
//!
//! let config = AiConfig {
//!     providers: vec!["heuristic".to_string()],
//!     ..AiConfig::default()
//! };
//! let manager = ProviderManager::from_config(&config);
//! assert_eq!(manager.available_providers(), vec!["heuristic".to_string()]);
//! ```

mod heuristic;
mod openai;

pub use heuristic::HeuristicProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AiConfig;
use crate::models::{AiAnalysis, ParaphraseSuggestion};

/// Failure of a single provider call. Never leaves the manager.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    Json(String),
    #[error("provider '{0}' has no credentials")]
    NotConfigured(String),
    #[error("{0}")]
    Unsupported(&'static str),
}

/// A text-analysis backend.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Identifier reported in results and health output (e.g. `"openai"`).
    fn name(&self) -> &str;

    /// Whether the provider has what it needs (credentials) to be called.
    fn is_configured(&self) -> bool;

    /// Estimates whether `text` is AI-generated.
    async fn analyze(&self, text: &str) -> Result<AiAnalysis, ProviderError>;

    /// Produces rewrites of `text`.
    async fn generate_paraphrase(
        &self,
        text: &str,
    ) -> Result<Vec<ParaphraseSuggestion>, ProviderError>;

    /// Semantic similarity of two texts in `[0, 100]`.
    async fn compare_similarity(&self, a: &str, b: &str) -> Result<f64, ProviderError>;
}

type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Ordered list of providers with failover.
pub struct ProviderManager {
    providers: Vec<Arc<dyn AnalysisProvider>>,
    available: OnceLock<Vec<String>>,
    current: RwLock<Option<String>>,
}

impl ProviderManager {
    /// Providers are tried in the order given.
    pub fn new(providers: Vec<Arc<dyn AnalysisProvider>>) -> Self {
        Self {
            providers,
            available: OnceLock::new(),
            current: RwLock::new(None),
        }
    }

    /// Builds the provider list named in `[ai].providers`.
    ///
    /// Names are validated by [`Config::validate`](crate::config::Config::validate);
    /// unknown names are skipped here with a warning.
    pub fn from_config(config: &AiConfig) -> Self {
        let mut providers: Vec<Arc<dyn AnalysisProvider>> = Vec::new();
        for name in &config.providers {
            match name.as_str() {
                "openai" => providers.push(Arc::new(OpenAiProvider::new(config))),
                "heuristic" => providers.push(Arc::new(HeuristicProvider::new())),
                other => warn!(provider = other, "Ignoring unknown AI provider"),
            }
        }
        Self::new(providers)
    }

    /// Records which providers have credentials. Later calls are no-ops.
    pub fn initialize(&self) -> &[String] {
        self.available.get_or_init(|| {
            let names: Vec<String> = self
                .providers
                .iter()
                .filter(|p| p.is_configured())
                .map(|p| p.name().to_string())
                .collect();
            for p in &self.providers {
                if p.is_configured() {
                    info!(provider = p.name(), "AI provider available");
                } else {
                    warn!(provider = p.name(), "AI provider not configured; skipping");
                }
            }
            names
        })
    }

    /// Names of configured providers in priority order.
    pub fn available_providers(&self) -> Vec<String> {
        self.initialize().to_vec()
    }

    /// Whether `name` is one of the configured providers.
    pub fn is_available(&self, name: &str) -> bool {
        self.initialize().iter().any(|n| n == name)
    }

    /// Every provider in priority order, with whether it is configured.
    pub fn provider_status(&self) -> Vec<(String, bool)> {
        self.providers
            .iter()
            .map(|p| (p.name().to_string(), p.is_configured()))
            .collect()
    }

    /// The provider that answered most recently; before any call, the first
    /// configured provider; `"none"` when nothing is configured.
    pub fn current_provider(&self) -> String {
        let current = self
            .current
            .read()
            .ok()
            .and_then(|guard| guard.clone());
        current
            .or_else(|| self.initialize().first().cloned())
            .unwrap_or_else(|| "none".to_string())
    }

    /// Never fails: returns [`AiAnalysis::none`] when every provider fails.
    pub async fn analyze_for_plagiarism(&self, text: &str) -> AiAnalysis {
        self.first_success("analyze", |p| p.analyze(text))
            .await
            .unwrap_or_else(|| {
                warn!("All AI providers failed for analysis; returning default");
                AiAnalysis::none()
            })
    }

    /// Never fails: returns an empty list when every provider fails or
    /// produces nothing.
    pub async fn generate_paraphrase(&self, text: &str) -> Vec<ParaphraseSuggestion> {
        self.first_success("paraphrase", |p| {
            Box::pin(async move {
                let suggestions = p.generate_paraphrase(text).await?;
                if suggestions.is_empty() {
                    return Err(ProviderError::MissingContent);
                }
                Ok(suggestions)
            })
        })
        .await
        .unwrap_or_default()
    }

    /// Never fails: returns 0 when every provider fails.
    pub async fn compare_similarity(&self, a: &str, b: &str) -> f64 {
        self.first_success("similarity", |p| p.compare_similarity(a, b))
            .await
            .unwrap_or(0.0)
    }

    async fn first_success<'a, T, F>(&'a self, operation: &'static str, mut call: F) -> Option<T>
    where
        F: FnMut(&'a dyn AnalysisProvider) -> ProviderFuture<'a, T> + Send,
        T: Send,
    {
        self.initialize();

        for provider in &self.providers {
            let provider: &'a dyn AnalysisProvider = provider.as_ref();
            if !provider.is_configured() {
                debug!(provider = provider.name(), operation, "Skipping unconfigured provider");
                continue;
            }

            match call(provider).await {
                Ok(value) => {
                    if let Ok(mut current) = self.current.write() {
                        *current = Some(provider.name().to_string());
                    }
                    debug!(provider = provider.name(), operation, "AI provider answered");
                    return Some(value);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        operation,
                        error = %e,
                        "AI provider failed; trying next"
                    );
                }
            }
        }

        None
    }
}
