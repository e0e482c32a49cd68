//! # Vosk Model Management
//!
//! Binds the relay to libvosk through the `vosk` crate. The model is loaded
//! once at process start and shared read-only by every connection; each
//! connection gets its own `Recognizer`, which carries all mutable decoding
//! state for that stream.
//!
//! ## Model Loading Process:
//! 1. Open the model directory given by configuration
//! 2. Fail fast with `EngineError::Init` if the directory is missing or the
//!    model cannot be loaded (the process must exit before the listener binds)
//! 3. Hand out per-connection recognizers at the configured sample rate

use crate::recognition::engine::{DecoderSession, DecodingState, EngineError, RecognitionEngine};
use std::sync::Arc;
use vosk::{CompleteResult, Model, Recognizer};

/// Process-wide recognition engine backed by one loaded Vosk model.
///
/// ## Thread Safety:
/// `vosk::Model` is immutable after load and safe for concurrent reads; the
/// `Arc` lets every worker thread open sessions against the same weights.
pub struct VoskEngine {
    model: Arc<Model>,
}

impl VoskEngine {
    /// Load the model from a directory on disk.
    ///
    /// This is the only place `EngineError::Init` originates; callers treat
    /// it as startup-fatal.
    pub fn load(model_path: &str) -> Result<Self, EngineError> {
        let model = Model::new(model_path).ok_or_else(|| {
            EngineError::Init(format!(
                "recognition model not found or unreadable at '{}'",
                model_path
            ))
        })?;

        Ok(Self {
            model: Arc::new(model),
        })
    }
}

impl RecognitionEngine for VoskEngine {
    fn open_session(&self, sample_rate: u32) -> Result<Box<dyn DecoderSession>, EngineError> {
        let recognizer = Recognizer::new(&self.model, sample_rate as f32).ok_or_else(|| {
            EngineError::Session(format!(
                "failed to allocate a recognizer at {} Hz",
                sample_rate
            ))
        })?;

        Ok(Box::new(VoskDecoderSession { recognizer }))
    }
}

/// One connection's decoding session over a `vosk::Recognizer`.
///
/// Dropping this releases the recognizer; there is no separate close call.
struct VoskDecoderSession {
    recognizer: Recognizer,
}

impl DecoderSession for VoskDecoderSession {
    fn accept_chunk(&mut self, samples: &[i16]) -> Result<DecodingState, EngineError> {
        match self.recognizer.accept_waveform(samples) {
            Ok(vosk::DecodingState::Finalized) => Ok(DecodingState::Finalized),
            Ok(vosk::DecodingState::Running) => Ok(DecodingState::Running),
            Ok(vosk::DecodingState::Failed) => {
                Err(EngineError::Decode("decoder rejected audio chunk".to_string()))
            }
            Err(err) => Err(EngineError::Decode(err.to_string())),
        }
    }

    fn partial_text(&mut self) -> Result<String, EngineError> {
        Ok(self.recognizer.partial_result().partial.to_string())
    }

    fn final_text(&mut self) -> Result<String, EngineError> {
        Ok(complete_text(self.recognizer.result()))
    }

    fn flush(&mut self) -> Result<String, EngineError> {
        Ok(complete_text(self.recognizer.final_result()))
    }
}

/// Extract plain text from a complete result, regardless of whether the
/// recognizer was configured with alternatives.
fn complete_text(result: CompleteResult) -> String {
    match result {
        CompleteResult::Single(single) => single.text.to_string(),
        CompleteResult::Multiple(multiple) => multiple
            .alternatives
            .first()
            .map(|alternative| alternative.text.to_string())
            .unwrap_or_default(),
    }
}
