//! HTTP API server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/analyze` | Analyze pasted text (JSON) or an uploaded file (multipart) |
//! | `GET`  | `/api/report/{id}` | Fetch a stored report |
//! | `POST` | `/api/paraphrase` | Paraphrase suggestions, served from cache when possible |
//! | `GET`  | `/api/export/{reportId}` | Plain-text report download |
//! | `GET`  | `/api/health` | Liveness and AI provider status |
//! | `POST` | `/api/qa-test` | Run the QA self-check suite |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "No text or file provided" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `payload_too_large` (413),
//! `unsupported_media_type` (415), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser client can
//! be served from a different origin.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::detector::PlagiarismDetector;
use crate::error::CheckError;
use crate::extract::{extract_text, FileUpload};
use crate::models::{NewDocument, NewParaphrase, PlagiarismAnalysis, PlagiarismReport};
use crate::providers::ProviderManager;
use crate::qa::{Coverage, QaTestCase, QaTestSuite};
use crate::report::render_report;
use crate::store::{InMemoryStore, Store};

/// Headroom above `max_upload_bytes` for multipart framing and other fields.
const BODY_LIMIT_HEADROOM: usize = 1024 * 1024;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    detector: Arc<PlagiarismDetector>,
    store: Arc<dyn Store>,
    qa: Arc<QaTestSuite>,
}

impl AppState {
    /// Builds providers, detector, and an empty in-memory store from `config`.
    pub fn new(config: Config) -> Self {
        let providers = Arc::new(ProviderManager::from_config(&config.ai));
        providers.initialize();
        let detector = Arc::new(PlagiarismDetector::from_config(&config, providers));
        Self::with_parts(config, detector, Arc::new(InMemoryStore::new()))
    }

    pub fn with_parts(
        config: Config,
        detector: Arc<PlagiarismDetector>,
        store: Arc<dyn Store>,
    ) -> Self {
        let qa = Arc::new(QaTestSuite::new(
            Arc::clone(&detector),
            Arc::clone(&store),
            config.server.max_upload_bytes,
            config.ai.api_key_env.clone(),
        ));
        Self {
            config: Arc::new(config),
            detector,
            store,
            qa,
        }
    }
}

/// The API router with CORS and the upload body limit applied.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.config.server.max_upload_bytes + BODY_LIMIT_HEADROOM;

    Router::new()
        .route("/api/analyze", post(handle_analyze))
        .route("/api/report/{id}", get(handle_get_report))
        .route("/api/paraphrase", post(handle_paraphrase))
        .route("/api/export/{report_id}", get(handle_export))
        .route("/api/health", get(handle_health))
        .route("/api/qa-test", post(handle_qa_test))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` and serves until Ctrl-C.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState::new(config.clone());
    info!(
        providers = ?state.detector.providers().available_providers(),
        "AI providers initialized"
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Plagiarism checker API listening on http://{}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CheckError> for AppError {
    fn from(err: CheckError) -> Self {
        let message = if err.is_client_error() {
            err.to_string()
        } else {
            error!(error = ?err, "Request failed");
            "Internal server error".to_string()
        };
        AppError {
            status: err.status_code(),
            code: err.code().to_string(),
            message,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        CheckError::Internal(err).into()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    CheckError::invalid(message).into()
}

fn not_found(message: impl Into<String>) -> AppError {
    CheckError::not_found(message).into()
}

/// Maps an extractor rejection onto the error contract.
fn rejection(status: StatusCode, message: String) -> AppError {
    let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "payload_too_large"
    } else {
        "bad_request"
    };
    AppError {
        status,
        code: code.to_string(),
        message,
    }
}

fn parse_id(raw: &str, what: &str) -> Result<u64, AppError> {
    raw.parse()
        .map_err(|_| bad_request(format!("Invalid {} id: {}", what, raw)))
}

/// Parses a JSON body; an empty body parses as `null`.
fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| bad_request(format!("Invalid JSON body: {}", e)))
}

// ============ POST /api/analyze ============

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    user_id: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    document_id: u64,
    report_id: u64,
    analysis: PlagiarismAnalysis,
}

/// What the client submitted, after reading the body.
struct Submission {
    text: Option<String>,
    file: Option<FileUpload>,
    user_id: Option<u64>,
}

async fn read_submission(state: &AppState, request: Request) -> Result<Submission, AppError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if !is_multipart {
        let body = Bytes::from_request(request, state)
            .await
            .map_err(|e| rejection(e.status(), e.body_text()))?;
        let parsed: Option<AnalyzeRequest> = parse_json(&body)?;
        let parsed = parsed.unwrap_or_default();
        return Ok(Submission {
            text: parsed.text,
            file: None,
            user_id: parsed.user_id,
        });
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| bad_request(e.body_text()))?;
    let mut submission = Submission {
        text: None,
        file: None,
        user_id: None,
    };

    let multipart_error =
        |e: axum::extract::multipart::MultipartError| rejection(e.status(), e.body_text());

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                submission.file = Some(FileUpload {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            "text" => submission.text = Some(field.text().await.map_err(multipart_error)?),
            "userId" => {
                let raw = field.text().await.map_err(multipart_error)?;
                submission.user_id = Some(parse_id(raw.trim(), "user")?);
            }
            _ => {}
        }
    }

    Ok(submission)
}

async fn handle_analyze(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let submission = read_submission(&state, request).await?;

    let new_doc = if let Some(upload) = submission.file {
        let extracted = extract_text(&upload, state.config.server.max_upload_bytes)?;
        NewDocument {
            user_id: submission.user_id,
            filename: extracted.metadata.filename,
            original_text: extracted.text,
            file_type: extracted.metadata.extension,
            file_size: extracted.metadata.size,
        }
    } else {
        match submission.text {
            Some(text) if !text.is_empty() => NewDocument {
                user_id: submission.user_id,
                filename: "pasted-text.txt".to_string(),
                file_size: text.len(),
                original_text: text,
                file_type: "text".to_string(),
            },
            _ => return Err(bad_request("No text or file provided")),
        }
    };

    if new_doc.original_text.trim().is_empty() {
        return Err(bad_request("No text content found"));
    }

    let document = state.store.create_document(new_doc).await?;
    let analysis = state.detector.analyze(&document.original_text).await?;
    let report = state.store.create_report(document.id, &analysis).await?;

    info!(
        document_id = document.id,
        report_id = report.id,
        file_type = %document.file_type,
        overall_score = analysis.overall_score,
        "Document analyzed"
    );

    Ok(Json(AnalyzeResponse {
        document_id: document.id,
        report_id: report.id,
        analysis,
    }))
}

// ============ GET /api/report/{id} ============

async fn handle_get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlagiarismReport>, AppError> {
    let id = parse_id(&id, "report")?;
    let report = state
        .store
        .get_report(id)
        .await?
        .ok_or_else(|| not_found("Report not found"))?;
    Ok(Json(report))
}

// ============ POST /api/paraphrase ============

async fn handle_paraphrase(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let value: serde_json::Value = parse_json(&body)?;
    let text = match value.get("text").and_then(|t| t.as_str()) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => return Err(bad_request("Text is required")),
    };

    if let Some(cached) = state.store.get_paraphrase_from_cache(&text).await? {
        info!(cache = "hit", "Paraphrase served from cache");
        let suggestion = serde_json::json!([{
            "originalText": cached.original_text,
            "paraphrasedText": cached.paraphrased_text,
            "uniquenessScore": cached.uniqueness_score,
            "improvement": 0,
        }]);
        return Ok(Json(suggestion).into_response());
    }

    let suggestions = state.detector.providers().generate_paraphrase(&text).await;

    // Ties keep the earliest suggestion.
    let best = suggestions
        .iter()
        .reduce(|best, s| if s.uniqueness_score > best.uniqueness_score { s } else { best });
    if let Some(best) = best {
        state
            .store
            .save_paraphrase_to_cache(NewParaphrase {
                original_text: text.clone(),
                paraphrased_text: best.paraphrased_text.clone(),
                uniqueness_score: best.uniqueness_score,
            })
            .await?;
    }

    info!(cache = "miss", suggestions = suggestions.len(), "Paraphrase generated");
    Ok(Json(suggestions).into_response())
}

// ============ GET /api/export/{report_id} ============

async fn handle_export(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Result<Response, AppError> {
    let report_id = parse_id(&report_id, "report")?;
    let report = state
        .store
        .get_report(report_id)
        .await?
        .ok_or_else(|| not_found("Report not found"))?;
    if state.store.get_document(report.document_id).await?.is_none() {
        return Err(not_found("Document not found"));
    }

    let body = render_report(&report.analysis());
    let disposition = format!(
        "attachment; filename=\"plagiarism-report-{}.txt\"",
        report_id
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

// ============ GET /api/health ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    /// Always `"healthy"` when the server is running.
    status: String,
    /// RFC 3339.
    timestamp: String,
    service: String,
    version: String,
    ai_providers: Vec<String>,
    current_provider: String,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let providers = state.detector.providers();
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: "plagiarism-checker-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ai_providers: providers.available_providers(),
        current_provider: providers.current_provider(),
    })
}

// ============ POST /api/qa-test ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QaSummary {
    total_tests: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    /// Percentage with one decimal, as a string.
    pass_rate: String,
    execution_time: u64,
    coverage: Coverage,
}

#[derive(Serialize)]
struct QaResponse {
    summary: QaSummary,
    details: Vec<QaTestCase>,
    report: String,
}

async fn handle_qa_test(State(state): State<AppState>) -> Json<QaResponse> {
    let result = state.qa.run_all().await;
    let report = result.report();
    Json(QaResponse {
        summary: QaSummary {
            total_tests: result.total_tests,
            passed: result.passed,
            failed: result.failed,
            skipped: result.skipped,
            pass_rate: format!("{:.1}", result.pass_rate()),
            execution_time: result.execution_time,
            coverage: result.coverage,
        },
        details: result.details,
        report,
    })
}
