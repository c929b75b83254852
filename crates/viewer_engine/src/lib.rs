//! Session viewer engine: polling, termination and event-stream IO.
mod config;
mod engine;
mod http;
mod poller;
mod stream;
mod types;

pub use config::{csrf_token_from_cookies, ClientSettings, LogTarget, PageConfig, SessionEndpoints};
pub use engine::EngineHandle;
pub use http::{FinishRequester, ReqwestSessionClient, StatusSource};
pub use poller::{PollerHandle, StatusPoller};
pub use stream::{EventStreamClient, StreamHandle};
pub use types::{
    ChannelEventSink, ConfigError, EngineEvent, EventSink, FinishError, PollError, StreamEvent,
};
