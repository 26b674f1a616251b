//! Error types for the lease analysis pipeline
//!
//! Only infrastructure failures (document extraction, generation service
//! unavailability) escape [`crate::LeaseAnalyzer::analyze`]. Unknown
//! jurisdictions and malformed model output are absorbed by the schema
//! registry and the recoverer.

use shared_types::SchemaError;
use thiserror::Error;

/// Failure to obtain text from a source document
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to fetch document: {0}")]
    Fetch(String),

    #[error("Document exceeds maximum size of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("Document contains no extractable text")]
    Empty,
}

/// Failure of the external text-generation service
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation service unreachable: {0}")]
    Unreachable(String),

    #[error("Generation request timed out")]
    Timeout,

    #[error("Generation service returned no content")]
    EmptyResponse,

    #[error("Generation service error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Generation client misconfigured: {0}")]
    Configuration(String),
}

/// Raw model output could not be turned into an assessment
#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("no JSON object found in response")]
    NoObject,

    #[error("response is not a valid assessment: {0}")]
    InvalidShape(#[from] serde_json::Error),
}

/// Failure loading a jurisdiction catalog record
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse schema for '{code}': {source}")]
    Parse {
        code: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid schema for '{code}': {source}")]
    Invalid {
        code: String,
        #[source]
        source: SchemaError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the analysis pipeline
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
