use viewer_logging::{viewer_error, viewer_info, viewer_warn};

use crate::reconcile::reconcile;
use crate::router::route_frame;
use crate::{
    disconnected_label, finish_failed_label, ClientCommand, Effect, FinishControl, Msg,
    StreamState, TerminationState, ViewState, LABEL_CONFIG_ERROR, LABEL_CONNECTION_ERROR,
    LABEL_FINISH_FAILED, LABEL_FINISH_PROCESSING, LABEL_FINISH_REQUESTED,
    LABEL_STATUS_QUERY_ERROR,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ViewState, msg: Msg) -> (ViewState, Vec<Effect>) {
    if state.is_halted() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::ConfigInvalid(reason) => {
            viewer_error!("Configuration error: {}", reason);
            state.set_status_label(LABEL_CONFIG_ERROR);
            state.halt();
            Vec::new()
        }
        Msg::StatusReceived { seq, envelope } => {
            if !state.accept_status_seq(seq) {
                viewer_info!("Dropping stale or late status response #{}", seq);
                return (state, Vec::new());
            }
            reconcile(&mut state, &envelope)
        }
        Msg::StatusFailed { seq, error } => {
            if !state.accept_status_seq(seq) {
                return (state, Vec::new());
            }
            viewer_warn!("Status poll #{} failed: {}", seq, error);
            state.set_status_label(LABEL_STATUS_QUERY_ERROR);
            Vec::new()
        }
        Msg::FinishClicked => {
            if !state.finish_control().enabled {
                return (state, Vec::new());
            }
            state.set_finish_control(FinishControl::DISABLED);
            state.set_termination(TerminationState::Pending);
            state.set_status_label(LABEL_FINISH_REQUESTED);
            let mut effects = Vec::with_capacity(2);
            if state.stop_polling() {
                effects.push(Effect::StopPolling);
            }
            effects.push(Effect::SendFinishRequest);
            effects
        }
        Msg::FinishAccepted => {
            if *state.termination() != TerminationState::Pending {
                return (state, Vec::new());
            }
            state.set_termination(TerminationState::Accepted);
            state.set_status_label(LABEL_FINISH_PROCESSING);
            Vec::new()
        }
        Msg::FinishRejected { message } => {
            if *state.termination() != TerminationState::Pending {
                return (state, Vec::new());
            }
            let message = message
                .filter(|message| !message.trim().is_empty())
                .map(|message| finish_failed_label(&message))
                .unwrap_or_else(|| LABEL_FINISH_FAILED.to_string());
            viewer_warn!("Finish request failed: {}", message);
            state.set_status_label(message.clone());
            state.set_termination(TerminationState::Failed {
                message: message.clone(),
            });
            vec![Effect::NotifyUser { message }]
        }
        Msg::StreamOpened => {
            state.set_stream_state(StreamState::Open);
            if state.take_init_slot() {
                vec![Effect::SendStreamCommand(ClientCommand::InitBrowser)]
            } else {
                Vec::new()
            }
        }
        Msg::StreamFrame(text) => route_frame(&mut state, &text),
        Msg::StreamClosed { code } => {
            viewer_info!("Event stream closed, code={:?}", code);
            state.set_stream_state(StreamState::Closed { code });
            state.set_status_label(disconnected_label(code));
            Vec::new()
        }
        Msg::StreamFailed(error) => {
            viewer_warn!("Event stream error: {}", error);
            state.set_stream_state(StreamState::Failed);
            state.set_status_label(LABEL_CONNECTION_ERROR);
            Vec::new()
        }
    };

    (state, effects)
}
