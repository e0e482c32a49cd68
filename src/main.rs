//! # Speech Relay Backend - Main Entry Point
//!
//! Boots the relay: configuration, logging, the shared recognition model, and
//! the actix-web server carrying the websocket audio endpoint plus the
//! health/metrics surface.
//!
//! ## Startup Order:
//! 1. Load and validate configuration
//! 2. Load the recognition model; a missing or unreadable model exits the
//!    process non-zero before the listener ever binds
//! 3. Bind the listener and serve until a shutdown signal arrives
//!
//! One independent session actor runs per accepted connection; a failing
//! session never affects the listener or any other session.

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use speech_relay_backend::config::AppConfig;
use speech_relay_backend::recognition::VoskEngine;
use speech_relay_backend::state::AppState;
use speech_relay_backend::{health, middleware, websocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Global shutdown flag set by the signal handlers.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!("Starting speech-relay-backend v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: {}:{}, model '{}' at {} Hz",
        config.server.host, config.server.port, config.model.path, config.model.sample_rate
    );

    // The model is process-wide read-only state: loaded exactly once, shared
    // by every session, never mutated. Load it before binding so a missing
    // model fails the process instead of every connection.
    let engine = VoskEngine::load(&config.model.path)?;
    info!("Recognition model loaded from '{}'", config.model.path);

    let app_state = AppState::new(config.clone(), Arc::new(engine));
    let bind_addr = config.bind_addr();

    setup_signal_handlers();

    info!("Speech relay listening on ws://{}", bind_addr);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::RequestTelemetry)
            // The relay accepts websocket upgrades at the root (reference
            // client behavior) and at the named audio route
            .route("/", web::get().to(websocket::audio_websocket))
            .route("/ws/audio", web::get().to(websocket::audio_websocket))
            .service(
                web::scope("/api/v1")
                    .route("/health", web::get().to(health::health_check))
                    .route("/metrics", web::get().to(health::relay_metrics)),
            )
            .route("/health", web::get().to(health::health_check))
    })
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(server_result) => {
                    if let Err(e) = server_result {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Server task error: {}", e);
                }
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

fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "speech_relay_backend=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

fn setup_signal_handlers() {
    tokio::spawn(async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to install SIGINT handler");

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

async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
