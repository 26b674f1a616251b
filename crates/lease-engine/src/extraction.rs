//! Document retrieval and text extraction
//!
//! Uploaded leases are fetched from their storage address and converted
//! from PDF to plain text before analysis. An empty result is an error: the
//! pipeline is never invoked without text.

use pdf_extract::extract_text_from_mem;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::ExtractionError;

/// Upload size limit for lease documents (4 MiB)
pub const MAX_DOCUMENT_BYTES: usize = 4 * 1024 * 1024;

/// Extract plain text from PDF bytes
pub fn extract_pdf_text(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let raw_text = extract_text_from_mem(pdf_bytes).map_err(|e| {
        let msg = e.to_string();
        if msg.to_lowercase().contains("encrypt") {
            ExtractionError::InvalidPdf("document is password protected".to_string())
        } else {
            ExtractionError::InvalidPdf(msg)
        }
    })?;

    ensure_text(raw_text)
}

/// Run PDF extraction off the async executor.
///
/// A panic inside the PDF parser is reported as an invalid document.
pub async fn extract_pdf_text_blocking(pdf_bytes: Vec<u8>) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_pdf_text(&pdf_bytes))
        .await
        .map_err(|e| ExtractionError::InvalidPdf(format!("extraction aborted: {}", e)))?
}

/// Reject text that is empty once whitespace is removed
pub fn ensure_text(text: String) -> Result<String, ExtractionError> {
    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(text)
}

/// Download a document, refusing bodies larger than `max_bytes`
#[instrument(skip(client))]
pub async fn fetch_document(
    client: &Client,
    url: &str,
    max_bytes: usize,
) -> Result<Vec<u8>, ExtractionError> {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ExtractionError::Fetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ExtractionError::Fetch(format!(
            "server responded with {}",
            response.status()
        )));
    }

    if let Some(len) = response.content_length() {
        if len > max_bytes as u64 {
            return Err(ExtractionError::TooLarge { limit: max_bytes });
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ExtractionError::Fetch(e.to_string()))?
    {
        if body.len() + chunk.len() > max_bytes {
            return Err(ExtractionError::TooLarge { limit: max_bytes });
        }
        body.extend_from_slice(&chunk);
    }

    debug!("Fetched {} bytes", body.len());
    Ok(body)
}
