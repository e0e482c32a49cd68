//! # Adapter Contract
//!
//! The engine is an external collaborator: it accepts waveform chunks and
//! reports decoding state. These traits are the seam between the connection
//! sessions and whichever decoder backs them (libvosk in production, scripted
//! fakes in tests).

use std::fmt;

/// Failures raised by the recognition engine.
///
/// ## Error Categories:
/// - **Init**: the shared model could not be loaded; startup-fatal, surfaced
///   before the listener binds
/// - **Session**: a per-connection decoder could not be allocated
/// - **Decode**: the decoder rejected a chunk mid-stream, ending that session
#[derive(Debug)]
pub enum EngineError {
    Init(String),
    Session(String),
    Decode(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Init(msg) => write!(f, "engine initialization failed: {}", msg),
            EngineError::Session(msg) => write!(f, "decoder session unavailable: {}", msg),
            EngineError::Decode(msg) => write!(f, "decoding failed: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

/// Outcome of feeding one chunk to a decoding session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingState {
    /// The chunk extended the current utterance; a partial result is ready.
    Running,
    /// The chunk completed an utterance boundary; a final result is ready.
    Finalized,
}

/// One decoding session, owned by exactly one connection.
///
/// ## Contract:
/// Chunks must be fed in arrival order by a single owner; the session is
/// never shared or reset mid-stream. After a `Finalized` chunk the decoder
/// starts a fresh partial-accumulation window internally. Dropping the
/// session releases its resources exactly once.
pub trait DecoderSession: Send {
    /// Feed one chunk of 16-bit mono samples in arrival order.
    fn accept_chunk(&mut self, samples: &[i16]) -> Result<DecodingState, EngineError>;

    /// Tentative transcription of the utterance in progress. Valid after a
    /// chunk returned `Running`; may be empty between utterances.
    fn partial_text(&mut self) -> Result<String, EngineError>;

    /// Transcription of the utterance segment just completed. Valid after a
    /// chunk returned `Finalized`.
    fn final_text(&mut self) -> Result<String, EngineError>;

    /// Drain any in-progress utterance at session teardown. Called exactly
    /// once; returns empty text when nothing is pending.
    fn flush(&mut self) -> Result<String, EngineError>;
}

/// Factory for decoding sessions over the process-wide model.
pub trait RecognitionEngine: Send + Sync {
    /// Allocate one decoding session bound to a fixed sample rate.
    fn open_session(&self, sample_rate: u32) -> Result<Box<dyn DecoderSession>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Init("model not found at 'model'".to_string());
        assert_eq!(
            err.to_string(),
            "engine initialization failed: model not found at 'model'"
        );

        let err = EngineError::Decode("bad waveform".to_string());
        assert!(err.to_string().contains("decoding failed"));
    }

    #[test]
    fn test_decoding_state_equality() {
        assert_eq!(DecodingState::Running, DecodingState::Running);
        assert_ne!(DecodingState::Running, DecodingState::Finalized);
    }
}
