//! # Speech Relay Backend
//!
//! Real-time speech-to-text relay. Each client opens one websocket
//! connection, streams raw 16-bit mono PCM audio in binary frames, and
//! receives partial and final transcriptions as JSON text frames while the
//! audio is still arriving.
//!
//! ## Architecture:
//! - **recognition**: adapter around the opaque Vosk engine (one shared
//!   read-only model, one decoding session per connection)
//! - **audio**: silence classification and PCM sample decoding
//! - **websocket**: the per-connection session actor and wire protocol
//! - **config / state / health / middleware / error**: configuration
//!   layering, shared metrics, HTTP observability, and the session error
//!   taxonomy

pub mod audio;
pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod recognition;
pub mod state;
pub mod websocket;
