//! Error types for the lease server
//!
//! Upstream failure details are logged, never returned to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lease_engine::{AnalysisError, ExtractionError, GenerationError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Analysis failed: {0}")]
    Generation(#[from] GenerationError),
}

impl From<AnalysisError> for ServerError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Extraction(e) => ServerError::Extraction(e),
            AnalysisError::Generation(e) => ServerError::Generation(e),
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::Extraction(e) => {
                error!("Document extraction failed: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    "EXTRACTION_FAILED",
                    "Could not extract text from document".to_string(),
                )
            }
            ServerError::Generation(e) => {
                error!("Error analyzing lease: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "ANALYSIS_FAILED",
                    "Failed to analyze lease agreement".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
