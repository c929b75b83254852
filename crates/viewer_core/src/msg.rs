use crate::StatusEnvelope;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Page configuration was missing or invalid; nothing else will start.
    ConfigInvalid(String),
    /// A poll tick produced a parsed status envelope.
    StatusReceived { seq: u64, envelope: StatusEnvelope },
    /// A poll tick failed (transport, HTTP status or body parse).
    StatusFailed { seq: u64, error: String },
    /// User asked to finish the session.
    FinishClicked,
    /// Finish endpoint answered `{"status": "ok"}`.
    FinishAccepted,
    /// Finish request failed; carries the server-provided message if any.
    FinishRejected { message: Option<String> },
    /// Event stream handshake completed.
    StreamOpened,
    /// Raw text frame received on the event stream.
    StreamFrame(String),
    /// Event stream closed by either side.
    StreamClosed { code: Option<u16> },
    /// Event stream transport error.
    StreamFailed(String),
}
