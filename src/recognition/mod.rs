//! # Recognition Engine Adapter
//!
//! Wraps the opaque speech-recognition engine behind a narrow contract so the
//! rest of the relay never touches decoder internals.
//!
//! ## Key Components:
//! - **Adapter contract**: `RecognitionEngine` opens per-connection decoding
//!   sessions; `DecoderSession` feeds chunks and reads partial/final text
//! - **Vosk backing**: process-wide `vosk::Model` loaded once at startup,
//!   one `vosk::Recognizer` per connection
//!
//! ## Ownership Model:
//! The model is read-only shared state (safe for unsynchronized concurrent
//! reads). Each decoding session is owned by exactly one connection and is
//! driven serially; dropping it releases the underlying recognizer, which
//! makes exactly-once release structural rather than a calling convention.

pub mod engine;   // Adapter contract and error type
pub mod model;    // Vosk-backed engine and decoder sessions

pub use engine::{DecoderSession, DecodingState, EngineError, RecognitionEngine};
pub use model::VoskEngine;
