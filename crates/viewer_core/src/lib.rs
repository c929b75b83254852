//! Session viewer core: pure state machine and view-model helpers.
//!
//! Polling results and event-stream frames are both fed through [`update`],
//! which reconciles them into a single [`ViewState`] and returns the side
//! effects the IO layer has to carry out.
mod effect;
mod envelope;
mod labels;
mod msg;
mod reconcile;
mod router;
mod state;
mod stream;
mod update;
mod view_model;

pub use effect::Effect;
pub use envelope::{StatusCode, StatusEnvelope};
pub use labels::*;
pub use msg::Msg;
pub use state::{FinishControl, PollingState, StreamState, TerminationState, ViewState};
pub use stream::{parse_frame, ClientCommand, FrameError, StreamMessage};
pub use update::update;
pub use view_model::SessionViewModel;
