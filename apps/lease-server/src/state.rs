//! Application state for the lease server

use std::time::Duration;

use anyhow::Result;
use lease_engine::extraction::MAX_DOCUMENT_BYTES;
use lease_engine::LeaseAnalyzer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: LeaseAnalyzer,
    /// Client for fetching uploaded documents
    pub http: reqwest::Client,
    pub max_document_bytes: usize,
}

impl AppState {
    pub fn new(analyzer: LeaseAnalyzer, fetch_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(fetch_timeout).build()?;

        Ok(Self {
            analyzer,
            http,
            max_document_bytes: MAX_DOCUMENT_BYTES,
        })
    }
}
