// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stempel server — render HTML to PDF and stamp every page.
//
// Entry point. Parses flags, loads configuration, initialises logging, wires
// the Chromium renderer into the job orchestrator and serves the API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use clap::Parser;
use stempel_core::config::AppConfig;
use stempel_job::{ChromiumRenderer, DocumentRenderer, JobOrchestrator};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod error;

use api::{handle_generate_pdf, handle_health, handle_method_not_allowed};

/// Command-line arguments for the Stempel server
#[derive(Parser, Debug)]
#[command(name = "stempel-server")]
#[command(about = "Render HTML to PDF and stamp every page with a watermark, QR code and caption")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the configuration file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host address to bind to (overrides the configuration file)
    #[arg(long)]
    host: Option<String>,

    /// Base URL of the Chromium rendering service
    #[arg(long)]
    renderer_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
pub struct AppState<R> {
    pub orchestrator: Arc<JobOrchestrator<R>>,
}

impl<R> AppState<R> {
    pub fn new(orchestrator: JobOrchestrator<R>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

// Manual impl: `R` itself need not be `Clone`.
impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

/// Build the router with all routes and middleware.
pub fn app<R: DocumentRenderer + 'static>(state: AppState<R>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/generate-pdf",
            post(handle_generate_pdf::<R>).fallback(handle_method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(host) = &args.host {
        config.server_host = host.clone();
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(url) = &args.renderer_url {
        config.renderer_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(&args)?;

    let renderer = ChromiumRenderer::new(&config.renderer_url, config.render_timeout())?
        .with_max_bytes(config.max_document_bytes);
    info!(endpoint = renderer.endpoint(), "Using Chromium renderer");
    let orchestrator = JobOrchestrator::new(&config, renderer)?;

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app(AppState::new(orchestrator))).await?;

    Ok(())
}
