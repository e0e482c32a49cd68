//! # Error Handling
//!
//! The per-connection taxonomy for the relay. Every failure inside a session
//! is classified into one of three kinds, and the session loop dispatches on
//! the kind instead of catching everything in one place:
//!
//! - **ProtocolViolation**: the client sent something that is not binary
//!   audio; reported back, and the session keeps streaming
//! - **Engine**: the decoder failed mid-stream; reported best-effort, then the
//!   session closes
//! - **TransportClosed**: the peer went away; not an error, just silent teardown
//!
//! Startup failures (model load, bind) never reach this type; they are
//! propagated out of `main` via `anyhow` and end the process with a non-zero
//! exit before any connection is accepted.

use crate::recognition::EngineError;
use std::fmt;

/// Classified failure inside one connection session.
#[derive(Debug)]
pub enum SessionError {
    /// Non-binary frame, or a binary frame that is not whole 16-bit samples.
    ProtocolViolation(String),

    /// The recognition engine failed while processing this session's audio.
    Engine(EngineError),

    /// The transport closed, normally or abruptly.
    TransportClosed,
}

impl SessionError {
    /// Whether the session can keep streaming after reporting this error.
    ///
    /// Only protocol violations are recoverable; an engine failure ends the
    /// session, and a closed transport already has.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::ProtocolViolation(_))
    }

    /// The message sent to the client, if this kind is reported at all.
    pub fn client_message(&self) -> Option<String> {
        match self {
            SessionError::ProtocolViolation(msg) => Some(msg.clone()),
            SessionError::Engine(err) => Some(err.to_string()),
            SessionError::TransportClosed => None,
        }
    }

    /// Stable kind label for structured logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::ProtocolViolation(_) => "protocol_violation",
            SessionError::Engine(_) => "session_failure",
            SessionError::TransportClosed => "transport_closed",
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::ProtocolViolation(msg) => write!(f, "protocol violation: {}", msg),
            SessionError::Engine(err) => write!(f, "session failure: {}", err),
            SessionError::TransportClosed => write!(f, "transport closed"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<EngineError> for SessionError {
    fn from(err: EngineError) -> Self {
        SessionError::Engine(err)
    }
}

/// Shorthand for per-step results inside the session loop.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_violation_is_recoverable() {
        let err = SessionError::ProtocolViolation("Expected binary audio data.".to_string());
        assert!(err.is_recoverable());
        assert_eq!(
            err.client_message().as_deref(),
            Some("Expected binary audio data.")
        );
        assert_eq!(err.kind(), "protocol_violation");
    }

    #[test]
    fn test_engine_failure_closes_session() {
        let err = SessionError::from(EngineError::Decode("bad chunk".to_string()));
        assert!(!err.is_recoverable());
        assert!(err.client_message().unwrap().contains("bad chunk"));
        assert_eq!(err.kind(), "session_failure");
    }

    #[test]
    fn test_transport_closed_is_silent() {
        let err = SessionError::TransportClosed;
        assert!(!err.is_recoverable());
        assert!(err.client_message().is_none());
        assert_eq!(err.kind(), "transport_closed");
    }
}
