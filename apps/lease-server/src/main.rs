//! Lease analysis server
//!
//! REST front end for the lease-engine pipeline. Provides endpoints for:
//!
//! - Lease text analysis against a jurisdiction's legal schema
//! - Uploaded PDF analysis (fetched by URL, text extracted server-side)
//! - Jurisdiction listing
//!
//! Configuration comes from the environment (see `EngineConfig::from_env`),
//! with command-line flags taking precedence.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use lease_engine::{EngineConfig, LeaseAnalyzer, SchemaRegistry};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod state;

use api::{handle_analyze, handle_analyze_document, handle_health, handle_list_jurisdictions};
use state::AppState;

/// Command-line arguments for the lease analysis server
#[derive(Parser, Debug)]
#[command(name = "lease-server")]
#[command(about = "Jurisdiction-aware lease analysis server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Result cache TTL in seconds
    #[arg(long)]
    cache_ttl_secs: Option<u64>,

    /// Maximum number of cached assessments
    #[arg(long)]
    cache_max_entries: Option<u64>,

    /// Generation request timeout in seconds
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Generation model name
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Directory of additional jurisdiction schema files
    #[arg(long)]
    schema_dir: Option<PathBuf>,

    /// Timeout for fetching uploaded documents, in seconds
    #[arg(long, default_value = "30")]
    fetch_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Layer CLI overrides on top of the environment configuration
    fn apply(&self, config: &mut EngineConfig) {
        if let Some(ttl) = self.cache_ttl_secs {
            config.cache_ttl = Duration::from_secs(ttl);
        }
        if let Some(max_entries) = self.cache_max_entries.filter(|n| *n > 0) {
            config.cache_max_entries = max_entries;
        }
        if let Some(timeout) = self.request_timeout_secs {
            config.openai.timeout_secs = timeout;
        }
        if let Some(model) = &self.model {
            config.openai.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.openai.base_url = base_url.clone();
        }
        if let Some(dir) = &self.schema_dir {
            config.schema_dir = Some(dir.clone());
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/jurisdictions", get(handle_list_jurisdictions))
        .route("/api/analyze", post(handle_analyze))
        .route("/api/analyze-document", post(handle_analyze_document))
        // Apply middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = EngineConfig::from_env();
    args.apply(&mut config);

    let registry = Arc::new(SchemaRegistry::load(config.schema_dir.as_deref())?);
    let analyzer = LeaseAnalyzer::from_config(&config, registry)?;
    let state = AppState::new(analyzer, Duration::from_secs(args.fetch_timeout_secs))?;

    let app = build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Model: {}", config.openai.model);
    info!(
        "Cache TTL: {}s, capacity: {} entries",
        config.cache_ttl.as_secs(),
        config.cache_max_entries
    );

    axum::serve(listener, app).await?;

    Ok(())
}
