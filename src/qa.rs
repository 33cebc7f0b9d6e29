//! Built-in QA self-check suite.
//!
//! Runs a fixed catalog of named checks against the live detector, provider
//! manager, extraction layer, and store, and tallies them per category.
//! Checks are independent: an error inside one marks it failed and the run
//! continues. Checks that need a browser or load-testing infrastructure are
//! reported as skipped with the reason.

use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::detector::PlagiarismDetector;
use crate::error::CheckError;
use crate::extract::{extract_text, validate_upload, FileUpload};
use crate::models::{MatchType, NewDocument, NewParaphrase, PlagiarismAnalysis, PlagiarismMatch};
use crate::report::render_report;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Functionality,
    Performance,
    Security,
    Usability,
    Reliability,
    Compatibility,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Functionality,
        Category::Performance,
        Category::Security,
        Category::Usability,
        Category::Reliability,
        Category::Compatibility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Functionality => "functionality",
            Category::Performance => "performance",
            Category::Security => "security",
            Category::Usability => "usability",
            Category::Reliability => "reliability",
            Category::Compatibility => "compatibility",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Passed,
    Failed,
    Skipped,
}

impl Status {
    fn marker(&self) -> &'static str {
        match self {
            Status::Passed => "[PASS]",
            Status::Failed => "[FAIL]",
            Status::Skipped => "[SKIP]",
            Status::Pending => "[....]",
        }
    }
}

/// One executed (or skipped) check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QaTestCase {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub expected_result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_result: Option<String>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

/// Percentage of passed checks per category; 0 for a category without checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Coverage {
    pub functionality: f64,
    pub performance: f64,
    pub security: f64,
    pub usability: f64,
    pub reliability: f64,
    pub compatibility: f64,
}

impl Coverage {
    pub fn from_details(details: &[QaTestCase]) -> Self {
        let pct = |category: Category| {
            let in_category: Vec<_> = details.iter().filter(|t| t.category == category).collect();
            if in_category.is_empty() {
                return 0.0;
            }
            let passed = in_category
                .iter()
                .filter(|t| t.status == Status::Passed)
                .count();
            passed as f64 / in_category.len() as f64 * 100.0
        };
        Self {
            functionality: pct(Category::Functionality),
            performance: pct(Category::Performance),
            security: pct(Category::Security),
            usability: pct(Category::Usability),
            reliability: pct(Category::Reliability),
            compatibility: pct(Category::Compatibility),
        }
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Functionality => self.functionality,
            Category::Performance => self.performance,
            Category::Security => self.security,
            Category::Usability => self.usability,
            Category::Reliability => self.reliability,
            Category::Compatibility => self.compatibility,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QaRunResult {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Milliseconds for the whole run.
    pub execution_time: u64,
    pub coverage: Coverage,
    pub details: Vec<QaTestCase>,
}

impl QaRunResult {
    /// Passed over total, in percent; 0 for an empty run.
    pub fn pass_rate(&self) -> f64 {
        if self.total_tests == 0 {
            return 0.0;
        }
        self.passed as f64 / self.total_tests as f64 * 100.0
    }

    /// Human-readable report with summary, coverage, details, and recommendations.
    pub fn report(&self) -> String {
        let rule = "-".repeat(60);
        let pass_rate = self.pass_rate();
        let mut out = String::new();

        let _ = writeln!(out, "QA TEST REPORT");
        let _ = writeln!(out, "{}", "=".repeat(60));
        let _ = writeln!(out);
        let _ = writeln!(out, "SUMMARY");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Total Tests: {}", self.total_tests);
        let _ = writeln!(out, "Passed: {} ({:.1}%)", self.passed, pass_rate);
        let _ = writeln!(out, "Failed: {}", self.failed);
        let _ = writeln!(out, "Skipped: {}", self.skipped);
        let _ = writeln!(out, "Execution Time: {}ms", self.execution_time);
        let _ = writeln!(out);
        let _ = writeln!(out, "COVERAGE");
        let _ = writeln!(out, "{rule}");
        for category in Category::ALL {
            let _ = writeln!(
                out,
                "{}: {:.1}%",
                capitalize(category.as_str()),
                self.coverage.get(category)
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "DETAILS");
        let _ = writeln!(out, "{rule}");
        for category in Category::ALL {
            let _ = writeln!(out);
            let _ = writeln!(out, "{} TESTS", category.as_str().to_uppercase());
            for test in self.details.iter().filter(|t| t.category == category) {
                let _ = writeln!(out, "{} {}", test.status.marker(), test.name);
                let _ = writeln!(out, "   Priority: {:?}", test.priority);
                let _ = writeln!(out, "   Expected: {}", test.expected_result);
                let _ = writeln!(
                    out,
                    "   Actual: {}",
                    test.actual_result.as_deref().unwrap_or("Not executed")
                );
                let _ = writeln!(out, "   Time: {}ms", test.execution_time.unwrap_or(0));
                if let Some(err) = &test.error_details {
                    let _ = writeln!(out, "   Error: {}", err);
                }
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "RECOMMENDATIONS");
        let _ = writeln!(out, "{rule}");
        if self.failed > 0 {
            let _ = writeln!(
                out,
                "* Fix {} failing tests for production readiness",
                self.failed
            );
        }
        if self.coverage.security < 100.0 {
            let _ = writeln!(
                out,
                "* Complete security testing coverage ({:.1}%)",
                self.coverage.security
            );
        }
        if self.coverage.performance < 80.0 {
            let _ = writeln!(
                out,
                "* Improve performance test coverage ({:.1}%)",
                self.coverage.performance
            );
        }
        let readiness = if pass_rate >= 90.0 {
            "System is ready for production deployment"
        } else if pass_rate >= 70.0 {
            "System needs minor improvements before production"
        } else {
            "System requires significant improvements before production"
        };
        let _ = writeln!(out, "* {}", readiness);

        out
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Executable checks. Catalog entries without one are reported as skipped.
#[derive(Debug, Clone, Copy)]
enum Check {
    TextAnalysisBasic,
    AiDetectionAccuracy,
    FileProcessing,
    ParaphraseGeneration,
    WebSearchSimulation,
    ReportGeneration,
    LargeDocument,
    ConcurrentAnalysis,
    MemoryUsage,
    CachePerformance,
    FileUploadSecurity,
    InputSanitization,
    ApiKeySecurity,
    RateLimiting,
    ProviderFailover,
    ErrorHandling,
    NetworkResilience,
    StoreConsistency,
}

struct CatalogEntry {
    name: &'static str,
    description: &'static str,
    category: Category,
    priority: Priority,
    expected: &'static str,
    check: Option<Check>,
}

const fn entry(
    name: &'static str,
    description: &'static str,
    category: Category,
    priority: Priority,
    expected: &'static str,
    check: Option<Check>,
) -> CatalogEntry {
    CatalogEntry {
        name,
        description,
        category,
        priority,
        expected,
        check,
    }
}

use Category::*;
use Priority::*;

const CATALOG: &[CatalogEntry] = &[
    entry(
        "Text Analysis Basic",
        "Test basic text analysis functionality",
        Functionality,
        High,
        "Returns plagiarism analysis with score, matches, and AI detection",
        Some(Check::TextAnalysisBasic),
    ),
    entry(
        "AI Detection Accuracy",
        "Test AI-generated content detection accuracy",
        Functionality,
        High,
        "Correctly identifies AI-generated vs human-written content",
        Some(Check::AiDetectionAccuracy),
    ),
    entry(
        "File Processing Multi-format",
        "Test DOCX and TXT file processing",
        Functionality,
        High,
        "Successfully extracts text from supported file formats",
        Some(Check::FileProcessing),
    ),
    entry(
        "Paraphrase Generation",
        "Test paraphrase suggestion generation",
        Functionality,
        Medium,
        "Generates paraphrase suggestions that differ from the input",
        Some(Check::ParaphraseGeneration),
    ),
    entry(
        "Web Search Simulation",
        "Test web search matching functionality",
        Functionality,
        Medium,
        "Simulates web search and finds potential matches",
        Some(Check::WebSearchSimulation),
    ),
    entry(
        "Report Generation",
        "Test plagiarism report generation and export",
        Functionality,
        Medium,
        "Generates comprehensive plagiarism reports",
        Some(Check::ReportGeneration),
    ),
    entry(
        "Large Document Processing",
        "Test performance with a large document",
        Performance,
        High,
        "Processes large documents within 30 seconds",
        Some(Check::LargeDocument),
    ),
    entry(
        "Concurrent Analysis",
        "Test concurrent plagiarism analysis requests",
        Performance,
        Medium,
        "Handles multiple concurrent requests without degradation",
        Some(Check::ConcurrentAnalysis),
    ),
    entry(
        "Memory Usage",
        "Test memory usage during intensive operations",
        Performance,
        Medium,
        "Memory usage remains stable and within limits",
        Some(Check::MemoryUsage),
    ),
    entry(
        "Cache Performance",
        "Test paraphrase cache behavior",
        Performance,
        Low,
        "Cached paraphrases are returned for repeated queries",
        Some(Check::CachePerformance),
    ),
    entry(
        "File Upload Security",
        "Test file upload security and validation",
        Security,
        High,
        "Rejects disallowed and oversized files",
        Some(Check::FileUploadSecurity),
    ),
    entry(
        "Input Sanitization",
        "Test input handling for markup and script injection",
        Security,
        High,
        "No script markup is echoed back in match excerpts",
        Some(Check::InputSanitization),
    ),
    entry(
        "API Key Security",
        "Test API key handling",
        Security,
        High,
        "API keys are read from the environment and never stored in config",
        Some(Check::ApiKeySecurity),
    ),
    entry(
        "Rate Limiting",
        "Test rate limiting for API endpoints",
        Security,
        Medium,
        "Prevents abuse through rate limiting",
        Some(Check::RateLimiting),
    ),
    entry(
        "AI Provider Failover",
        "Test AI provider failover mechanism",
        Reliability,
        High,
        "Gracefully fails over to backup AI providers",
        Some(Check::ProviderFailover),
    ),
    entry(
        "Error Handling",
        "Test error handling and graceful degradation",
        Reliability,
        High,
        "Handles errors gracefully without crashing",
        Some(Check::ErrorHandling),
    ),
    entry(
        "Network Resilience",
        "Test resilience to network failures",
        Reliability,
        Medium,
        "Handles network failures with appropriate fallbacks",
        Some(Check::NetworkResilience),
    ),
    entry(
        "Database Consistency",
        "Test store operations and consistency",
        Reliability,
        Medium,
        "Maintains data consistency across operations",
        Some(Check::StoreConsistency),
    ),
    entry(
        "User Interface Responsiveness",
        "Test UI responsiveness and user experience",
        Usability,
        Medium,
        "Interface is responsive and user-friendly",
        None,
    ),
    entry(
        "File Upload UX",
        "Test file upload user experience",
        Usability,
        Medium,
        "File upload is intuitive with clear feedback",
        None,
    ),
    entry(
        "Result Presentation",
        "Test plagiarism result presentation",
        Usability,
        Medium,
        "Results are clearly presented and actionable",
        None,
    ),
    entry(
        "Browser Compatibility",
        "Test compatibility across different browsers",
        Compatibility,
        Medium,
        "Works consistently across major browsers",
        None,
    ),
    entry(
        "Mobile Responsiveness",
        "Test mobile device compatibility",
        Compatibility,
        Medium,
        "Responsive design works on mobile devices",
        None,
    ),
    entry(
        "API Compatibility",
        "Test API compatibility and versioning",
        Compatibility,
        Low,
        "API maintains backward compatibility",
        None,
    ),
];

const AI_TEXT: &str = "Furthermore, it is important to note that artificial intelligence has \
    revolutionized various industries. Moreover, the implementation of AI technologies has \
    facilitated numerous advancements in efficiency and productivity.";
const HUMAN_TEXT: &str = "I love pizza! My favorite topping is pepperoni, but sometimes I go \
    crazy and add pineapple too. Don't judge me - it's actually pretty good.";
const FOX_TEXT: &str =
    "The quick brown fox jumps over the lazy dog. This is a common phrase used in typing tests.";

enum Outcome {
    Passed(String),
    Failed(String),
    Skipped(String),
}

pub struct QaTestSuite {
    detector: Arc<PlagiarismDetector>,
    store: Arc<dyn Store>,
    max_upload_bytes: usize,
    api_key_env: String,
}

impl QaTestSuite {
    pub fn new(
        detector: Arc<PlagiarismDetector>,
        store: Arc<dyn Store>,
        max_upload_bytes: usize,
        api_key_env: impl Into<String>,
    ) -> Self {
        Self {
            detector,
            store,
            max_upload_bytes,
            api_key_env: api_key_env.into(),
        }
    }

    pub async fn run_all(&self) -> QaRunResult {
        let started = Instant::now();
        info!(checks = CATALOG.len(), "Starting QA test suite");

        let mut details = Vec::with_capacity(CATALOG.len());
        for entry in CATALOG {
            let check_started = Instant::now();
            let outcome = match entry.check {
                Some(check) => self.run_check(check).await,
                None => Ok(Outcome::Skipped(
                    "Requires a browser-based test harness".to_string(),
                )),
            };

            let (status, actual, error) = match outcome {
                Ok(Outcome::Passed(msg)) => (Status::Passed, msg, None),
                Ok(Outcome::Failed(msg)) => (Status::Failed, msg, None),
                Ok(Outcome::Skipped(msg)) => (Status::Skipped, msg, None),
                Err(e) => (
                    Status::Failed,
                    "Test execution failed".to_string(),
                    Some(format!("{:#}", e)),
                ),
            };
            if status == Status::Failed {
                warn!(check = entry.name, actual = %actual, "QA check failed");
            }

            details.push(QaTestCase {
                name: entry.name.to_string(),
                description: entry.description.to_string(),
                category: entry.category,
                priority: entry.priority,
                expected_result: entry.expected.to_string(),
                actual_result: Some(actual),
                status,
                execution_time: Some(check_started.elapsed().as_millis() as u64),
                error_details: error,
            });
        }

        let count = |s: Status| details.iter().filter(|t| t.status == s).count();
        let result = QaRunResult {
            total_tests: details.len(),
            passed: count(Status::Passed),
            failed: count(Status::Failed),
            skipped: count(Status::Skipped),
            execution_time: started.elapsed().as_millis() as u64,
            coverage: Coverage::from_details(&details),
            details,
        };

        info!(
            total = result.total_tests,
            passed = result.passed,
            failed = result.failed,
            skipped = result.skipped,
            elapsed_ms = result.execution_time,
            "QA test suite finished"
        );
        result
    }

    async fn run_check(&self, check: Check) -> Result<Outcome> {
        match check {
            Check::TextAnalysisBasic => self.text_analysis_basic().await,
            Check::AiDetectionAccuracy => self.ai_detection_accuracy().await,
            Check::FileProcessing => self.file_processing(),
            Check::ParaphraseGeneration => self.paraphrase_generation().await,
            Check::WebSearchSimulation => self.web_search_simulation().await,
            Check::ReportGeneration => Ok(report_generation()),
            Check::LargeDocument => self.large_document().await,
            Check::ConcurrentAnalysis => self.concurrent_analysis().await,
            Check::MemoryUsage => Ok(Outcome::Skipped(
                "No portable heap accounting available in-process".to_string(),
            )),
            Check::CachePerformance => self.cache_performance().await,
            Check::FileUploadSecurity => Ok(self.file_upload_security()),
            Check::InputSanitization => self.input_sanitization().await,
            Check::ApiKeySecurity => Ok(self.api_key_security()),
            Check::RateLimiting => Ok(Outcome::Skipped(
                "Would require load testing infrastructure".to_string(),
            )),
            Check::ProviderFailover => Ok(self.provider_failover().await),
            Check::ErrorHandling => Ok(self.error_handling().await),
            Check::NetworkResilience => Ok(self.network_resilience().await),
            Check::StoreConsistency => self.store_consistency().await,
        }
    }

    async fn text_analysis_basic(&self) -> Result<Outcome> {
        let text = "This is a sample text for plagiarism analysis. It contains various \
            sentences that should be analyzed for potential plagiarism.";
        let a = self.detector.analyze(text).await?;
        if a.overall_score <= 100 && a.unique_text <= 100 && a.word_count > 0 {
            Ok(Outcome::Passed(format!(
                "Analysis completed: Score {}, {} matches, AI: {}",
                a.overall_score,
                a.matches.len(),
                a.ai_generated
            )))
        } else {
            Ok(Outcome::Failed(
                "Analysis result structure is invalid".to_string(),
            ))
        }
    }

    async fn ai_detection_accuracy(&self) -> Result<Outcome> {
        let providers = self.detector.providers();
        let ai = providers.analyze_for_plagiarism(AI_TEXT).await;
        let human = providers.analyze_for_plagiarism(HUMAN_TEXT).await;

        Ok(if ai.ai_generated && !human.ai_generated {
            Outcome::Passed(format!(
                "AI detection working: AI text detected ({}), Human text not detected ({})",
                ai.confidence, human.confidence
            ))
        } else if ai.confidence > human.confidence {
            Outcome::Passed(format!(
                "AI detection partially working: AI confidence ({}) > Human confidence ({})",
                ai.confidence, human.confidence
            ))
        } else {
            Outcome::Failed(format!(
                "AI detection failed: AI confidence ({}) <= Human confidence ({})",
                ai.confidence, human.confidence
            ))
        })
    }

    fn file_processing(&self) -> Result<Outcome> {
        let txt = FileUpload {
            filename: "test.txt".to_string(),
            bytes: b"This is a test text file content.".to_vec(),
        };
        let docx = FileUpload {
            filename: "test.docx".to_string(),
            bytes: minimal_docx("This is a test document content.")?,
        };

        let mut extracted = 0;
        for upload in [&txt, &docx] {
            let out = extract_text(upload, self.max_upload_bytes)?;
            if out.text.trim().is_empty() {
                return Ok(Outcome::Failed(format!(
                    "File processing failed: No text extracted from {}",
                    upload.filename
                )));
            }
            extracted += out.text.chars().count();
        }
        Ok(Outcome::Passed(format!(
            "File processing successful: Extracted {} characters from .txt and .docx",
            extracted
        )))
    }

    async fn paraphrase_generation(&self) -> Result<Outcome> {
        let original = "This is a sample sentence for paraphrasing.";
        let suggestions = self.detector.providers().generate_paraphrase(original).await;
        Ok(match suggestions.first() {
            Some(first) if first.paraphrased_text != original => Outcome::Passed(format!(
                "Generated {} paraphrase suggestions",
                suggestions.len()
            )),
            _ => Outcome::Failed(
                "Paraphrase generation failed or produced identical text".to_string(),
            ),
        })
    }

    async fn web_search_simulation(&self) -> Result<Outcome> {
        let a = self.detector.analyze(FOX_TEXT).await?;
        if a.matches.len() <= 2 && a.matches.iter().all(|m| m.similarity > 60.0) {
            Ok(Outcome::Passed(format!(
                "Web search simulation completed: Found {} potential matches",
                a.matches.len()
            )))
        } else {
            Ok(Outcome::Failed(format!(
                "Web search simulation returned {} matches for 2 sentences",
                a.matches.len()
            )))
        }
    }

    async fn large_document(&self) -> Result<Outcome> {
        let text = "This is a large document test. ".repeat(10_000);
        let started = Instant::now();
        let a = self.detector.analyze(&text).await?;
        let elapsed = started.elapsed().as_millis();
        Ok(if elapsed < 30_000 && a.word_count > 0 {
            Outcome::Passed(format!("Large document processed in {}ms", elapsed))
        } else {
            Outcome::Failed(format!("Large document processing too slow: {}ms", elapsed))
        })
    }

    async fn concurrent_analysis(&self) -> Result<Outcome> {
        let texts = [
            "First concurrent analysis text",
            "Second concurrent analysis text",
            "Third concurrent analysis text",
        ];
        let started = Instant::now();

        let mut set = JoinSet::new();
        for text in texts {
            let detector = Arc::clone(&self.detector);
            set.spawn(async move { detector.analyze(text).await });
        }

        let mut results = Vec::with_capacity(texts.len());
        while let Some(joined) = set.join_next().await {
            results.push(joined??);
        }

        let elapsed = started.elapsed().as_millis();
        Ok(
            if results.len() == texts.len() && results.iter().all(|r| r.word_count > 0) {
                Outcome::Passed(format!("Concurrent analysis completed in {}ms", elapsed))
            } else {
                Outcome::Failed("Concurrent analysis failed".to_string())
            },
        )
    }

    async fn cache_performance(&self) -> Result<Outcome> {
        let key = format!("Cache performance test text {}", uuid::Uuid::new_v4());
        if self.store.get_paraphrase_from_cache(&key).await?.is_some() {
            return Ok(Outcome::Failed(
                "Cache returned an entry before anything was saved".to_string(),
            ));
        }
        self.store
            .save_paraphrase_to_cache(NewParaphrase {
                original_text: key.clone(),
                paraphrased_text: "Cached paraphrase result".to_string(),
                uniqueness_score: 80,
            })
            .await?;

        let started = Instant::now();
        let cached = self.store.get_paraphrase_from_cache(&key).await?;
        let elapsed = started.elapsed().as_micros();
        Ok(match cached {
            Some(entry) if entry.paraphrased_text == "Cached paraphrase result" => {
                Outcome::Passed(format!("Cache hit served in {}us", elapsed))
            }
            _ => Outcome::Failed("Cached paraphrase was not returned".to_string()),
        })
    }

    fn file_upload_security(&self) -> Outcome {
        let executable = FileUpload {
            filename: "malicious.exe".to_string(),
            bytes: vec![0u8; 1024],
        };
        if validate_upload(&executable, self.max_upload_bytes).is_ok() {
            return Outcome::Failed(
                "Security validation failed: Malicious file accepted".to_string(),
            );
        }

        let oversized = FileUpload {
            filename: "huge.txt".to_string(),
            bytes: vec![b'a'; self.max_upload_bytes + 1],
        };
        match validate_upload(&oversized, self.max_upload_bytes) {
            Err(CheckError::FileTooLarge { .. }) => Outcome::Passed(
                "Security validation passed: Executable and oversized files rejected".to_string(),
            ),
            _ => Outcome::Failed(
                "Security validation failed: Oversized file accepted".to_string(),
            ),
        }
    }

    async fn input_sanitization(&self) -> Result<Outcome> {
        let input = "<script>alert('XSS')</script>";
        Ok(match self.detector.analyze(input).await {
            Ok(a) if a.matches.iter().all(|m| !m.text.contains("<script>")) => Outcome::Passed(
                "Input sanitization working: Script tags removed".to_string(),
            ),
            Ok(_) => Outcome::Failed(
                "Input sanitization failed: Script tags present".to_string(),
            ),
            Err(_) => Outcome::Passed(
                "Input sanitization working: Malicious input rejected".to_string(),
            ),
        })
    }

    fn api_key_security(&self) -> Outcome {
        let present = std::env::var(&self.api_key_env)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        if present {
            Outcome::Passed(format!(
                "API key security: Credentials read from environment variable {}",
                self.api_key_env
            ))
        } else {
            Outcome::Skipped(format!(
                "API key security: {} not set; only local providers are active",
                self.api_key_env
            ))
        }
    }

    async fn provider_failover(&self) -> Outcome {
        let providers = self.detector.providers();
        let result = providers
            .analyze_for_plagiarism("AI provider failover test")
            .await;
        if providers.is_available(&result.provider) && result.confidence >= 0.0 {
            Outcome::Passed(format!(
                "AI provider failover working: Using {}",
                result.provider
            ))
        } else {
            Outcome::Failed(format!(
                "AI provider failover failed: No provider answered (got {})",
                result.provider
            ))
        }
    }

    async fn error_handling(&self) -> Outcome {
        match self.detector.analyze("").await {
            Err(CheckError::InvalidInput(_)) => {
                Outcome::Passed("Error handling working: Empty input rejected".to_string())
            }
            Err(e) => Outcome::Failed(format!(
                "Error handling: Empty input rejected with unexpected error: {}",
                e
            )),
            Ok(_) => Outcome::Failed("Error handling failed: Empty input accepted".to_string()),
        }
    }

    async fn network_resilience(&self) -> Outcome {
        let providers = self.detector.providers();
        let result = providers
            .analyze_for_plagiarism("Network resilience test")
            .await;
        if !providers.is_available(&result.provider) {
            return Outcome::Failed(
                "Network resilience failed: Every AI provider was unreachable".to_string(),
            );
        }

        match providers.available_providers().into_iter().next() {
            Some(primary) if primary == result.provider => Outcome::Passed(format!(
                "Network resilience working: Primary provider {}",
                result.provider
            )),
            primary => Outcome::Passed(format!(
                "Network resilience working: {} answered after {} failed",
                result.provider,
                primary.unwrap_or_default()
            )),
        }
    }

    async fn store_consistency(&self) -> Result<Outcome> {
        let doc = self
            .store
            .create_document(NewDocument {
                user_id: None,
                filename: "test.txt".to_string(),
                original_text: "Test content".to_string(),
                file_type: "text".to_string(),
                file_size: 12,
            })
            .await?;

        let retrieved = self.store.get_document(doc.id).await?;
        let consistent = retrieved.as_ref().is_some_and(|d| {
            d.original_text == "Test content" && d.content_hash == doc.content_hash
        });
        if !self.store.delete_document(doc.id).await? {
            bail!("document {} vanished before cleanup", doc.id);
        }

        Ok(if consistent {
            Outcome::Passed(
                "Database consistency working: Document stored and retrieved correctly"
                    .to_string(),
            )
        } else {
            Outcome::Failed(
                "Database consistency failed: Document not retrieved correctly".to_string(),
            )
        })
    }
}

fn report_generation() -> Outcome {
    let sample = PlagiarismAnalysis {
        overall_score: 75,
        matches: vec![PlagiarismMatch {
            id: "test-1".to_string(),
            text: "Sample matched text".to_string(),
            similarity: 85.0,
            source: "https://example.com".to_string(),
            start_index: 0,
            end_index: 18,
            line_numbers: "1-1".to_string(),
            match_type: MatchType::Exact,
        }],
        ai_generated: false,
        processing_time: 1500,
        word_count: 50,
        unique_text: 25,
    };
    let report = render_report(&sample);
    if report.contains("Overall Score: 75%") && report.contains("Sample matched text") {
        Outcome::Passed(format!(
            "Report generated successfully: {} characters",
            report.chars().count()
        ))
    } else {
        Outcome::Failed("Report generation failed: Missing content".to_string())
    }
}

/// A one-paragraph DOCX archive.
fn minimal_docx(text: &str) -> Result<Vec<u8>> {
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>"#,
        text
    );
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())?;
        zip.write_all(xml.as_bytes())?;
        zip.finish()?;
    }
    Ok(cursor.into_inner())
}
