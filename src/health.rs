use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let metrics = state.metrics_snapshot();
    let config = state.config().clone();

    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
        "service": {
            "name": "speech-relay-backend",
            "version": env!("CARGO_PKG_VERSION"),
            "host": config.server.host,
            "port": config.server.port
        },
        "model": {
            "path": config.model.path,
            "sample_rate": config.model.sample_rate
        },
        "sessions": {
            "active": metrics.active_sessions,
            "opened": metrics.connections_opened,
            "closed": metrics.connections_closed
        }
    }))
}

pub async fn relay_metrics(state: web::Data<AppState>) -> HttpResponse {
    let metrics = state.metrics_snapshot();
    let uptime_seconds = state.uptime_seconds();

    HttpResponse::Ok().json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds,
        "connections": {
            "opened": metrics.connections_opened,
            "closed": metrics.connections_closed,
            "active": metrics.active_sessions
        },
        "audio": {
            "chunks_received": metrics.chunks_received,
            "silent_chunks": metrics.silent_chunks,
            "silent_ratio": if metrics.chunks_received > 0 {
                metrics.silent_chunks as f64 / metrics.chunks_received as f64
            } else {
                0.0
            }
        },
        "transcription": {
            "partials_emitted": metrics.partials_emitted,
            "finals_emitted": metrics.finals_emitted
        },
        "errors": {
            "session_errors": metrics.session_errors
        },
        "http_requests": metrics.http_requests
    }))
}
