use std::path::PathBuf;
use std::sync::mpsc;

use thiserror::Error;
use viewer_core::StatusEnvelope;

/// Everything the engine reports back to the owner of the view state.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Result of poll tick number `seq` (1-based, monotonically increasing).
    Status {
        seq: u64,
        result: Result<StatusEnvelope, PollError>,
    },
    Finish(Result<(), FinishError>),
    Stream(StreamEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Opened,
    Frame(String),
    Closed { code: Option<u16> },
    Failed(String),
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Failure of a single poll tick. All variants are transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("status request failed: {0}")]
    Transport(String),
    #[error("status request timed out")]
    Timeout,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("status body too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("malformed status body: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinishError {
    #[error("finish request failed: {0}")]
    Transport(String),
    #[error("finish rejected with http status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("unexpected finish response: {0}")]
    MalformedBody(String),
}

impl FinishError {
    /// Message supplied by the server, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            FinishError::Rejected { message, .. } => message.as_deref(),
            FinishError::Transport(_) | FinishError::MalformedBody(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read page config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse page config: {0}")]
    Parse(String),
    #[error("missing session id")]
    MissingSessionId,
    #[error("missing status url")]
    MissingStatusUrl,
    #[error("invalid {field} url {value:?}: {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("poll interval must be positive")]
    InvalidPollInterval,
}
