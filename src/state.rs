//! # Application State Management
//!
//! Shared state handed to every HTTP handler and websocket session. Two
//! pieces live here:
//!
//! - the recognition engine, loaded once at startup and shared read-only by
//!   all sessions (no lock needed; all per-stream mutable state lives in the
//!   per-connection decoder sessions)
//! - relay metrics, updated concurrently by sessions and the HTTP telemetry
//!   middleware behind an `RwLock`

use crate::config::AppConfig;
use crate::recognition::RecognitionEngine;
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// State shared across all connections and handlers.
#[derive(Clone)]
pub struct AppState {
    /// Configuration, fixed for the process lifetime.
    config: AppConfig,

    /// The process-wide recognition engine.
    engine: Arc<dyn RecognitionEngine>,

    /// Counters updated by sessions and middleware.
    pub metrics: Arc<RwLock<RelayMetrics>>,

    /// When the server started.
    start_time: Instant,
}

/// Counters describing relay activity since startup.
#[derive(Debug, Default, Clone)]
pub struct RelayMetrics {
    /// Websocket connections accepted.
    pub connections_opened: u64,

    /// Websocket connections fully torn down.
    pub connections_closed: u64,

    /// Connections currently streaming.
    pub active_sessions: u32,

    /// Binary audio chunks received across all sessions.
    pub chunks_received: u64,

    /// Chunks classified as pure digital silence.
    pub silent_chunks: u64,

    /// Partial transcription messages emitted.
    pub partials_emitted: u64,

    /// Final transcription messages emitted.
    pub finals_emitted: u64,

    /// Session errors of any kind (protocol violations included).
    pub session_errors: u64,

    /// Plain HTTP requests served (health, metrics, upgrade requests).
    pub http_requests: u64,
}

impl AppState {
    pub fn new(config: AppConfig, engine: Arc<dyn RecognitionEngine>) -> Self {
        Self {
            config,
            engine,
            metrics: Arc::new(RwLock::new(RelayMetrics::default())),
            start_time: Instant::now(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<dyn RecognitionEngine> {
        &self.engine
    }

    pub fn session_opened(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.connections_opened += 1;
        metrics.active_sessions += 1;
    }

    pub fn session_closed(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.connections_closed += 1;
        if metrics.active_sessions > 0 {
            metrics.active_sessions -= 1;
        }
    }

    pub fn record_chunk(&self, silent: bool) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.chunks_received += 1;
        if silent {
            metrics.silent_chunks += 1;
        }
    }

    pub fn record_partial(&self) {
        self.metrics.write().unwrap().partials_emitted += 1;
    }

    pub fn record_final(&self) {
        self.metrics.write().unwrap().finals_emitted += 1;
    }

    pub fn record_session_error(&self) {
        self.metrics.write().unwrap().session_errors += 1;
    }

    pub fn record_http_request(&self) {
        self.metrics.write().unwrap().http_requests += 1;
    }

    /// Consistent copy of the counters for the health/metrics endpoints.
    pub fn metrics_snapshot(&self) -> RelayMetrics {
        self.metrics.read().unwrap().clone()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::{DecoderSession, EngineError};

    struct NullEngine;

    impl RecognitionEngine for NullEngine {
        fn open_session(
            &self,
            _sample_rate: u32,
        ) -> Result<Box<dyn DecoderSession>, EngineError> {
            Err(EngineError::Session("null engine".to_string()))
        }
    }

    fn test_state() -> AppState {
        AppState::new(AppConfig::default(), Arc::new(NullEngine))
    }

    #[test]
    fn test_session_counters() {
        let state = test_state();
        state.session_opened();
        state.session_opened();
        state.session_closed();

        let snapshot = state.metrics_snapshot();
        assert_eq!(snapshot.connections_opened, 2);
        assert_eq!(snapshot.connections_closed, 1);
        assert_eq!(snapshot.active_sessions, 1);
    }

    #[test]
    fn test_active_sessions_never_underflows() {
        let state = test_state();
        state.session_closed();
        assert_eq!(state.metrics_snapshot().active_sessions, 0);
    }

    #[test]
    fn test_chunk_counters() {
        let state = test_state();
        state.record_chunk(true);
        state.record_chunk(false);
        state.record_chunk(false);

        let snapshot = state.metrics_snapshot();
        assert_eq!(snapshot.chunks_received, 3);
        assert_eq!(snapshot.silent_chunks, 1);
    }
}
