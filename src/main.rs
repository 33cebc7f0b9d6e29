//! # plagcheck CLI
//!
//! Runs analyses from the command line or starts the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! plagcheck [--config ./config/plagcheck.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `plagcheck serve` | Start the HTTP API server |
//! | `plagcheck analyze` | Analyze text or a `.txt`/`.docx`/`.pdf` file |
//! | `plagcheck paraphrase <text>` | Print paraphrase suggestions |
//! | `plagcheck qa` | Run the QA self-check suite |
//! | `plagcheck providers` | List AI providers and their credentials status |
//!
//! ## Examples
//!
//! ```bash
//! # Analyze pasted text and print JSON
//! plagcheck analyze --text "The quick brown fox jumps over the lazy dog."
//!
//! # Analyze a Word document and print the text report
//! plagcheck analyze essay.docx --format report
//!
//! # Start the server with a config file
//! plagcheck serve --config ./config/plagcheck.toml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use plagcheck::config::{self, Config};
use plagcheck::detector::PlagiarismDetector;
use plagcheck::extract::{extract_text, FileUpload};
use plagcheck::logging::init_logging;
use plagcheck::providers::ProviderManager;
use plagcheck::qa::QaTestSuite;
use plagcheck::report::render_report;
use plagcheck::server;
use plagcheck::store::InMemoryStore;

/// Plagiarism and AI-generation analysis.
///
/// All commands accept an optional `--config` flag pointing to a TOML
/// configuration file. Without it, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "plagcheck",
    about = "Plagiarism and AI-generation analysis with AI provider failover",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    ///
    /// Binds to `[server].bind` and serves until Ctrl-C.
    Serve,

    /// Analyze text or a file for plagiarism and AI generation.
    Analyze {
        /// File to analyze (`.txt`, `.docx`, or `.pdf`).
        #[arg(required_unless_present = "text", conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Text to analyze instead of a file.
        #[arg(long)]
        text: Option<String>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Print paraphrase suggestions for a text as JSON.
    Paraphrase {
        text: String,
    },

    /// Run the QA self-check suite and print its report.
    ///
    /// Exits with a non-zero status when any check fails.
    Qa,

    /// List configured AI providers and whether their credentials are present.
    Providers,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// The analysis as pretty-printed JSON.
    Json,
    /// The plain-text report.
    Report,
}

fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_config(path),
        None => Ok(Config::default()),
    }
}

fn build_detector(cfg: &Config) -> Arc<PlagiarismDetector> {
    let providers = Arc::new(ProviderManager::from_config(&cfg.ai));
    providers.initialize();
    Arc::new(PlagiarismDetector::from_config(cfg, providers))
}

fn read_upload(path: &Path) -> Result<FileUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FileUpload { filename, bytes })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let cfg = load(cli.config.as_deref())?;
    let _log_guard = init_logging(&cfg.logging)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Analyze { file, text, format } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => {
                    let upload = read_upload(&path)?;
                    extract_text(&upload, cfg.server.max_upload_bytes)?.text
                }
                (None, None) => anyhow::bail!("Provide --text or a file to analyze"),
            };

            let analysis = build_detector(&cfg).analyze(&text).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
                OutputFormat::Report => print!("{}", render_report(&analysis)),
            }
        }
        Commands::Paraphrase { text } => {
            let providers = ProviderManager::from_config(&cfg.ai);
            let suggestions = providers.generate_paraphrase(&text).await;
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        }
        Commands::Qa => {
            let suite = QaTestSuite::new(
                build_detector(&cfg),
                Arc::new(InMemoryStore::new()),
                cfg.server.max_upload_bytes,
                cfg.ai.api_key_env.clone(),
            );
            let result = suite.run_all().await;
            print!("{}", result.report());
            if result.failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Providers => {
            let providers = ProviderManager::from_config(&cfg.ai);
            for (name, configured) in providers.provider_status() {
                let status = if configured {
                    "configured".to_string()
                } else {
                    format!("missing credentials (set {})", cfg.ai.api_key_env)
                };
                println!("{:<12} {}", name, status);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
