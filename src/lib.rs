//! # plagcheck
//!
//! Plagiarism and AI-generation analysis for pasted text and uploaded
//! documents, served over HTTP and a CLI.
//!
//! Text is split into sentences, each sentence is looked up by a
//! [`SourceMatcher`](source_match::SourceMatcher), and the AI-likelihood of the
//! whole text is estimated by an ordered list of AI providers with failover.
//! The two are combined into a [`PlagiarismAnalysis`](models::PlagiarismAnalysis)
//! that can be stored, fetched, and exported as a plain-text report.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌───────────────┐
//! │  HTTP/CLI  │──▶│   Detector   │──▶│ SourceMatcher │
//! │  extract   │   │ score + stats│   └───────────────┘
//! └─────┬──────┘   └──────┬───────┘   ┌───────────────┐
//!       │                 └──────────▶│ProviderManager│
//!       ▼                             │ openai ▸ heur. │
//! ┌────────────┐                      └───────────────┘
//! │   Store    │  documents, reports, paraphrase cache
//! └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! plagcheck analyze --text "The quick brown fox jumps over the lazy dog."
//! plagcheck analyze essay.docx --format report
//! plagcheck paraphrase "This sentence needs rewording."
//! plagcheck serve --config ./config/plagcheck.toml
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`text_stats`] | Word counts, sentence splitting, unique-text percentage |
//! | [`source_match`] | Source lookup trait and the simulated web search |
//! | [`providers`] | AI providers and the failover manager |
//! | [`detector`] | Plagiarism analysis and score aggregation |
//! | [`report`] | Plain-text report rendering |
//! | [`extract`] | Upload validation and `.txt`/`.docx`/`.pdf` extraction |
//! | [`store`] | Documents, reports, and the paraphrase cache |
//! | [`qa`] | Built-in QA self-check suite |
//! | [`server`] | HTTP API |
//! | [`logging`] | Tracing subscriber setup |
//! | [`error`] | Error types |

pub mod config;
pub mod detector;
pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod providers;
pub mod qa;
pub mod report;
pub mod server;
pub mod source_match;
pub mod store;
pub mod text_stats;
