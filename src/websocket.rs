//! # WebSocket Audio Relay Session
//!
//! One actor per websocket connection. The client streams binary frames of
//! raw little-endian 16-bit mono PCM; the session feeds each chunk to its own
//! decoding session and answers with JSON text frames carrying partial and
//! final transcriptions.
//!
//! ## Wire Protocol:
//! - **Client → Server**: binary PCM audio frames only
//! - **Server → Client**: `{"type":"partial","text":…}`,
//!   `{"type":"final","text":…}`, `{"type":"error","message":…}`
//!
//! ## Session State Machine:
//! `OPEN → STREAMING → CLOSING → CLOSED`. Frames are processed inline on the
//! actor, so outbound messages leave in exactly the order their triggering
//! frames were processed. Teardown runs on every exit path: the decoder is
//! flushed once (a trimmed non-empty result is sent best-effort) and its
//! handle is dropped exactly once.

use crate::audio::{pcm, silence};
use crate::error::{SessionError, SessionResult};
use crate::recognition::{DecoderSession, DecodingState};
use crate::state::AppState;

use actix::prelude::*;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use actix_web_actors::ws;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Error text returned for any non-binary client frame.
pub const NON_BINARY_FRAME_MESSAGE: &str = "Expected binary audio data.";

/// Messages the relay sends to the client.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// Tentative transcription of the utterance in progress; text may be
    /// empty between utterances and is sent anyway.
    #[serde(rename = "partial")]
    Partial { text: String },

    /// Transcription of a completed utterance segment.
    #[serde(rename = "final")]
    Final { text: String },

    /// Protocol or session error report.
    #[serde(rename = "error")]
    Error { message: String },
}

/// Lifecycle of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionPhase {
    /// Decoder allocated, actor not yet started.
    Open,
    /// Receiving frames.
    Streaming,
    /// Teardown in progress: flush, best-effort final.
    Closing,
    /// Decoder released; terminal.
    Closed,
}

/// WebSocket actor owning one decoding session.
///
/// The decoder handle is owned exclusively by this actor and driven serially;
/// `close_session` takes it out of the `Option` so it can only ever be
/// flushed and released once, no matter which exit path runs first.
pub struct RelaySession {
    session_id: Uuid,
    decoder: Option<Box<dyn DecoderSession>>,
    received_messages: u64,
    phase: SessionPhase,
    state: AppState,
}

impl RelaySession {
    pub fn new(decoder: Box<dyn DecoderSession>, state: AppState) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            decoder: Some(decoder),
            received_messages: 0,
            phase: SessionPhase::Open,
            state,
        }
    }

    /// Serialize and queue one outbound message. The write is buffered by the
    /// websocket context; if the transport is already gone the frame is
    /// silently discarded, which is exactly the best-effort send the teardown
    /// path needs.
    fn send_message(&self, ctx: &mut ws::WebsocketContext<Self>, message: &OutboundMessage) {
        match serde_json::to_string(message) {
            Ok(json) => {
                match message {
                    OutboundMessage::Partial { .. } => self.state.record_partial(),
                    OutboundMessage::Final { .. } => self.state.record_final(),
                    OutboundMessage::Error { .. } => {}
                }
                ctx.text(json);
            }
            Err(err) => {
                warn!(session = %self.session_id, error = %err, "Failed to serialize outbound message");
            }
        }
    }

    /// Dispatch one inbound frame through the typed error boundary.
    fn handle_frame(
        &mut self,
        msg: ws::Message,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> SessionResult<()> {
        match msg {
            ws::Message::Binary(data) => self.process_chunk(&data, ctx),
            ws::Message::Text(_) => {
                self.received_messages += 1;
                Err(SessionError::ProtocolViolation(
                    NON_BINARY_FRAME_MESSAGE.to_string(),
                ))
            }
            ws::Message::Ping(data) => {
                ctx.pong(&data);
                Ok(())
            }
            ws::Message::Pong(_) => Ok(()),
            ws::Message::Continuation(_) => {
                // Fragmented frames are a transport artifact, not client payload
                warn!(session = %self.session_id, "Ignoring unexpected continuation frame");
                Ok(())
            }
            ws::Message::Nop => Ok(()),
            // Close frames are handled before dispatch in StreamHandler
            ws::Message::Close(_) => Ok(()),
        }
    }

    /// Feed one binary chunk to the decoder and emit the resulting message.
    fn process_chunk(
        &mut self,
        data: &[u8],
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> SessionResult<()> {
        if self.phase != SessionPhase::Streaming {
            return Ok(());
        }

        self.received_messages += 1;

        let silent = silence::is_silent(data);
        self.state.record_chunk(silent);
        if silent {
            debug!(
                session = %self.session_id,
                chunk = self.received_messages,
                size = data.len(),
                "Received silent audio chunk"
            );
        } else {
            debug!(
                session = %self.session_id,
                chunk = self.received_messages,
                size = data.len(),
                "Received audio chunk"
            );
        }

        let samples = pcm::decode_chunk(data).map_err(SessionError::ProtocolViolation)?;

        let decoder = match self.decoder.as_mut() {
            Some(decoder) => decoder,
            None => return Ok(()),
        };

        // Silence is an observability signal only; silent chunks still reach
        // the decoder so the partial stream stays identical either way.
        match decoder.accept_chunk(&samples)? {
            DecodingState::Finalized => {
                let text = decoder.final_text()?;
                info!(session = %self.session_id, %text, "Final result recognized");
                self.send_message(ctx, &OutboundMessage::Final { text });
            }
            DecodingState::Running => {
                let text = decoder.partial_text()?;
                if !text.is_empty() {
                    debug!(session = %self.session_id, %text, "Partial result recognized");
                }
                self.send_message(ctx, &OutboundMessage::Partial { text });
            }
        }

        Ok(())
    }

    /// Classify a session error, report it to the client where the taxonomy
    /// says so, and end the session unless it is recoverable.
    fn handle_session_error(&mut self, err: SessionError, ctx: &mut ws::WebsocketContext<Self>) {
        match &err {
            SessionError::ProtocolViolation(_) => {
                warn!(session = %self.session_id, error = %err, "Protocol violation, session continues");
                self.state.record_session_error();
            }
            SessionError::Engine(_) => {
                error!(session = %self.session_id, error = %err, "Session failure, closing");
                self.state.record_session_error();
            }
            SessionError::TransportClosed => {
                info!(session = %self.session_id, "Transport closed");
            }
        }

        if let Some(message) = err.client_message() {
            self.send_message(ctx, &OutboundMessage::Error { message });
        }

        if !err.is_recoverable() {
            self.close_session(ctx);
            ctx.stop();
        }
    }

    /// CLOSING → CLOSED: flush the decoder exactly once, attempt one final
    /// message when the trimmed flush text is non-empty, release the handle.
    fn close_session(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        if matches!(self.phase, SessionPhase::Closing | SessionPhase::Closed) {
            return;
        }
        self.phase = SessionPhase::Closing;

        if let Some(mut decoder) = self.decoder.take() {
            match decoder.flush() {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        info!(session = %self.session_id, %text, "Sending final result on close");
                        self.send_message(
                            ctx,
                            &OutboundMessage::Final {
                                text: text.to_string(),
                            },
                        );
                    }
                }
                Err(err) => {
                    warn!(session = %self.session_id, error = %err, "Flush failed during teardown");
                }
            }
            // Decoder drops here: the handle is released exactly once
        }

        self.phase = SessionPhase::Closed;
    }
}

impl Actor for RelaySession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.phase = SessionPhase::Streaming;
        self.state.session_opened();
        info!(session = %self.session_id, "WebSocket connection established, ready for audio stream");
    }

    fn stopped(&mut self, ctx: &mut Self::Context) {
        // Last-resort teardown for exit paths that never reached CLOSING
        self.close_session(ctx);
        self.state.session_closed();
        info!(
            session = %self.session_id,
            messages = self.received_messages,
            "Recognition stopped for this connection"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for RelaySession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(err) => {
                error!(session = %self.session_id, error = %err, "WebSocket protocol error");
                self.handle_session_error(SessionError::TransportClosed, ctx);
                return;
            }
        };

        match msg {
            ws::Message::Close(reason) => {
                info!(session = %self.session_id, ?reason, "WebSocket closed by client");
                self.close_session(ctx);
                ctx.close(reason);
                ctx.stop();
            }
            other => {
                if let Err(err) = self.handle_frame(other, ctx) {
                    self.handle_session_error(err, ctx);
                }
            }
        }
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        // Abrupt disconnect: the inbound stream ended without a close frame
        self.close_session(ctx);
        ctx.stop();
    }
}

/// WebSocket endpoint handler.
///
/// Allocates this connection's decoding session before the upgrade; if the
/// engine cannot hand one out the request is answered with a plain HTTP error
/// and no session actor is started.
pub async fn audio_websocket(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    info!(
        "New WebSocket connection request from: {:?}",
        req.connection_info().peer_addr()
    );

    let sample_rate = app_state.config().model.sample_rate;
    let decoder = app_state.engine().open_session(sample_rate).map_err(|err| {
        error!(error = %err, "Failed to open a decoding session");
        actix_web::error::ErrorInternalServerError("recognition engine unavailable")
    })?;

    let session = RelaySession::new(decoder, app_state.get_ref().clone());
    ws::start(session, &req, stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outbound_message_wire_shapes() {
        let partial = OutboundMessage::Partial {
            text: "hel".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&partial).unwrap(),
            json!({"type": "partial", "text": "hel"})
        );

        let fin = OutboundMessage::Final {
            text: "hello world".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&fin).unwrap(),
            json!({"type": "final", "text": "hello world"})
        );

        let err = OutboundMessage::Error {
            message: NON_BINARY_FRAME_MESSAGE.to_string(),
        };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"type": "error", "message": "Expected binary audio data."})
        );
    }

    #[test]
    fn test_empty_partial_is_representable() {
        // Empty partial text is valid between utterances and must serialize
        let partial = OutboundMessage::Partial {
            text: String::new(),
        };
        let json = serde_json::to_string(&partial).unwrap();
        assert_eq!(json, r#"{"type":"partial","text":""}"#);
    }
}
