//! Lease analysis engine
//!
//! Analyzes residential lease text against the legal requirements of a
//! jurisdiction. A request flows through five stages:
//!
//! 1. [`SchemaRegistry`] resolves the country code to a legal schema,
//!    falling back to a generic schema for unknown countries
//! 2. [`prompts::compose`] builds the message list for the generation service
//! 3. A [`GenerationClient`] produces raw model output
//! 4. [`recovery::recover`] turns that output into a [`LeaseAnalysisResponse`]
//! 5. [`ResultCache`] keeps the result for repeat requests
//!
//! [`LeaseAnalyzer`] drives the stages.

pub mod cache;
pub mod config;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod jurisdiction;
pub mod pipeline;
pub mod prompts;
pub mod recovery;
pub mod schemas;

pub use cache::{ResultCache, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
pub use config::EngineConfig;
pub use error::{
    AnalysisError, CatalogError, ExtractionError, GenerationError, RecoveryError, Result,
};
pub use generation::{
    CompletionParams, GenerationClient, OpenAiClient, OpenAiConfig, MAX_TEMPERATURE,
};
pub use jurisdiction::Jurisdiction;
pub use pipeline::LeaseAnalyzer;
pub use prompts::{Message, MessageRole, PromptPayload};
pub use schemas::{ResolvedSchema, SchemaRegistry};

pub use shared_types::LeaseAnalysisResponse;
