//! # Audio Frame Handling
//!
//! Inbound binary frames carry raw PCM audio; this module inspects and decodes
//! them before they reach the recognition engine.
//!
//! ## Key Components:
//! - **Silence Classifier**: flags chunks of pure digital silence for
//!   logging/metrics; recognition still runs on them
//! - **PCM Decode**: little-endian 16-bit sample extraction
//!
//! ## Audio Format Requirements:
//! - **Sample Rate**: fixed per deployment (default 16 kHz, matching the model)
//! - **Bit Depth**: 16-bit PCM
//! - **Channels**: Mono (1 channel)
//! - **Encoding**: Little-endian signed integers

pub mod pcm;       // Little-endian sample decoding
pub mod silence;   // Digital-silence classification
