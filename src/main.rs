//! # Word-Frequency Operator - Main Application Entry Point
//!
//! HTTP host for the transcript word-frequency operator. The workflow
//! orchestrator posts an operator event; the service fetches the transcript,
//! counts its words, stores the distribution in the dataplane and answers with
//! the updated output object.
//!
//! ## Application Architecture:
//! - **config**: Application configuration (TOML files + environment variables)
//! - **operator**: The word-frequency step, its event model and tokenizer
//! - **storage**: Object store backends the transcript is read from
//! - **dataplane**: Metadata store client the results are written to
//! - **state**: Shared application state and metrics
//! - **health**: Health and metrics endpoints
//! - **handlers**: HTTP request handlers for API endpoints
//! - **error**: Custom error types and HTTP error responses

mod config;
mod dataplane;
mod error;
mod handlers;
mod health;
mod operator;
mod state;
mod storage;

use actix_cors::Cors;
use actix_web::dev::Service;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use crate::config::{AppConfig, ClientConfig};
use dataplane::DataplaneClient;
use operator::{StepSettings, WordFrequencyStep};
use state::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Global shutdown signal, set by the signal handler task.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

/// The main application entry point.
///
/// ## What this function does:
/// 1. **Loads configuration** from files and environment variables
/// 2. **Sets up logging**
/// 3. **Builds the operator** with its object store and dataplane clients
/// 4. **Configures the HTTP server** with middleware and routes
/// 5. **Handles graceful shutdown** when receiving system signals
#[actix_web::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;
    let client_config = ClientConfig::from_env()?;

    info!("Starting word-frequency-operator v{}", env!("CARGO_PKG_VERSION"));
    info!(
        object_store = ?config.object_store.backend,
        dataplane = %config.dataplane.endpoint,
        "Configuration loaded: {}:{}",
        config.server.host,
        config.server.port
    );

    let step = build_step(&config, &client_config)?;
    let app_state = AppState::new(config.clone(), step);
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    setup_signal_handlers();

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            // Middleware executes in reverse order of registration for responses
            .wrap_fn(|req, srv| {
                let started = Instant::now();
                let endpoint = format!(
                    "{} {}",
                    req.method(),
                    req.match_pattern().unwrap_or_else(|| req.path().to_string())
                );
                let state = req.app_data::<web::Data<AppState>>().cloned();
                let fut = srv.call(req);

                async move {
                    let result = fut.await;
                    if let Some(state) = state {
                        let is_error = match &result {
                            Ok(res) => res.status().is_client_error() || res.status().is_server_error(),
                            Err(_) => true,
                        };
                        state.record_request(&endpoint, started.elapsed().as_millis() as u64, is_error);
                    }
                    result
                }
            })
            .wrap(TracingLogger::default())
            .wrap(cors)
            .configure(handlers::configure)
    })
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}", bind_addr))?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(Err(e)) => error!("Server error: {}", e),
                Err(e) => error!("Server task error: {}", e),
                Ok(Ok(())) => {}
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Wire the operator to the configured object store and dataplane.
fn build_step(config: &AppConfig, client_config: &ClientConfig) -> Result<WordFrequencyStep> {
    let object_store = storage::from_config(config, client_config)?;
    let metadata_store = Arc::new(DataplaneClient::from_config(
        &config.dataplane.endpoint,
        client_config,
    )?);

    Ok(WordFrequencyStep::new(
        object_store,
        metadata_store,
        StepSettings {
            default_operator_name: config.operator.default_name.clone(),
            error_metadata_key: config.operator.error_metadata_key.clone(),
        },
    ))
}

/// Initialize the tracing (logging) system for the application.
///
/// ## Environment Variables:
/// - `RUST_LOG`: Controls what gets logged (e.g., "debug", "word_frequency_operator=debug")
/// - If not set, defaults to "word_frequency_operator=debug,actix_web=info"
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "word_frequency_operator=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("failed to initialize tracing")?;

    Ok(())
}

/// Listen for SIGTERM / SIGINT and raise the global shutdown flag.
fn setup_signal_handlers() {
    tokio::spawn(async {
        let (mut sigterm, mut sigint) = match (
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()),
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()),
        ) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to install signal handlers: {}", e);
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }

        SHUTDOWN_SIGNAL.store(true, Ordering::SeqCst);
    });
}

/// Wait for the shutdown signal to be set, polling every 100ms.
async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
