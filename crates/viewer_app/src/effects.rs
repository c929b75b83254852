use std::time::Duration;

use viewer_core::{Effect, Msg};
use viewer_engine::{EngineEvent, EngineHandle, StreamEvent};
use viewer_logging::{viewer_info, viewer_warn};

use crate::render;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Starts both subsystems: the status poller and the event stream.
    pub fn start(&self) {
        self.engine.start_polling();
        self.engine.connect_stream();
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StopPolling => self.engine.stop_polling(),
                Effect::SendFinishRequest => {
                    viewer_info!("Requesting session finish");
                    self.engine.request_finish();
                }
                Effect::SendStreamCommand(command) => self.engine.send_stream_command(command),
                Effect::NotifyUser { message } => render::notify(&message),
            }
        }
    }

    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Status {
            seq,
            result: Ok(envelope),
        } => Msg::StatusReceived { seq, envelope },
        EngineEvent::Status {
            seq,
            result: Err(err),
        } => Msg::StatusFailed {
            seq,
            error: err.to_string(),
        },
        EngineEvent::Finish(Ok(())) => Msg::FinishAccepted,
        EngineEvent::Finish(Err(err)) => {
            viewer_warn!("Finish request failed: {}", err);
            Msg::FinishRejected {
                message: err.server_message().map(ToOwned::to_owned),
            }
        }
        EngineEvent::Stream(StreamEvent::Opened) => Msg::StreamOpened,
        EngineEvent::Stream(StreamEvent::Frame(text)) => Msg::StreamFrame(text),
        EngineEvent::Stream(StreamEvent::Closed { code }) => Msg::StreamClosed { code },
        EngineEvent::Stream(StreamEvent::Failed(error)) => Msg::StreamFailed(error),
    }
}

#[cfg(test)]
mod tests {
    use viewer_core::{Msg, StatusEnvelope};
    use viewer_engine::{EngineEvent, FinishError, PollError, StreamEvent};

    use super::map_event;

    #[test]
    fn poll_results_keep_their_sequence() {
        let envelope = StatusEnvelope::new("Procesando", "processing");
        assert_eq!(
            map_event(EngineEvent::Status {
                seq: 7,
                result: Ok(envelope.clone())
            }),
            Msg::StatusReceived { seq: 7, envelope }
        );
        assert_eq!(
            map_event(EngineEvent::Status {
                seq: 8,
                result: Err(PollError::HttpStatus(502))
            }),
            Msg::StatusFailed {
                seq: 8,
                error: "http status 502".to_string()
            }
        );
    }

    #[test]
    fn finish_failures_forward_only_server_messages() {
        assert_eq!(
            map_event(EngineEvent::Finish(Err(FinishError::Rejected {
                status: 403,
                message: Some("CSRF verification failed".to_string()),
            }))),
            Msg::FinishRejected {
                message: Some("CSRF verification failed".to_string())
            }
        );
        assert_eq!(
            map_event(EngineEvent::Finish(Err(FinishError::Transport(
                "connection refused".to_string()
            )))),
            Msg::FinishRejected { message: None }
        );
    }

    #[test]
    fn stream_events_map_one_to_one() {
        assert_eq!(
            map_event(EngineEvent::Stream(StreamEvent::Closed { code: Some(1006) })),
            Msg::StreamClosed { code: Some(1006) }
        );
        assert_eq!(
            map_event(EngineEvent::Stream(StreamEvent::Opened)),
            Msg::StreamOpened
        );
    }
}
