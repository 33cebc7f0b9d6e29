//! Error types.
//!
//! [`CheckError`] is the caller-visible error of the analysis pipeline and the
//! storage layer. The HTTP layer maps each variant to a status code and a
//! machine-readable error code (see [`CheckError::status_code`]).
//!
//! AI backend failures have their own type, [`ProviderError`](crate::providers::ProviderError),
//! and are recovered inside the provider manager; they never become a
//! `CheckError`.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors surfaced to callers of the detector, the file ingestion layer, and the store.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Empty text, missing request fields, or text that could not be extracted.
    #[error("{0}")]
    InvalidInput(String),

    /// Uploaded file exceeds the configured limit. Checked before extraction.
    #[error("File size {size} bytes exceeds {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    /// Uploaded file has an extension other than `.txt`, `.docx`, or `.pdf`.
    #[error("Invalid file type '{0}'. Only .txt, .docx, and .pdf files are allowed.")]
    UnsupportedFileType(String),

    /// Missing report or document.
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CheckError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CheckError::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CheckError::NotFound(message.into())
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CheckError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CheckError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CheckError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            CheckError::NotFound(_) => StatusCode::NOT_FOUND,
            CheckError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code used in the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            CheckError::InvalidInput(_) => "bad_request",
            CheckError::FileTooLarge { .. } => "payload_too_large",
            CheckError::UnsupportedFileType(_) => "unsupported_media_type",
            CheckError::NotFound(_) => "not_found",
            CheckError::Internal(_) => "internal",
        }
    }

    /// True for every variant the caller caused (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

pub type CheckResult<T> = Result<T, CheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            CheckError::invalid("empty").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CheckError::FileTooLarge { size: 11, limit: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            CheckError::UnsupportedFileType(".exe".into()).status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            CheckError::not_found("Report not found").status_code(),
            StatusCode::NOT_FOUND
        );
        let internal: CheckError = anyhow::anyhow!("boom").into();
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!internal.is_client_error());
    }

    #[test]
    fn unsupported_type_message_names_allowed_types() {
        let msg = CheckError::UnsupportedFileType(".exe".into()).to_string();
        assert!(msg.contains(".txt, .docx, and .pdf"));
    }
}
