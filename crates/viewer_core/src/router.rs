use viewer_logging::{viewer_debug, viewer_info, viewer_warn};

use crate::{
    navigation_error_label, parse_frame, server_error_label, Effect, StreamMessage, ViewState,
    LABEL_BROWSER_READY, LABEL_UNKNOWN_STATUS,
};

/// Routes one inbound event-stream frame. Malformed frames and unknown actions
/// are logged and dropped.
pub(crate) fn route_frame(state: &mut ViewState, text: &str) -> Vec<Effect> {
    let (action, message) = match parse_frame(text) {
        Ok(parsed) => parsed,
        Err(err) => {
            viewer_warn!("Discarding event-stream frame: {}", err);
            return Vec::new();
        }
    };
    viewer_debug!("Event-stream action={}", action);

    match message {
        StreamMessage::BrowserState { state: browser_state } => {
            let label = browser_state
                .as_deref()
                .filter(|label| !label.is_empty())
                .unwrap_or(LABEL_UNKNOWN_STATUS);
            state.set_status_label(label);
        }
        StreamMessage::BrowserReady {
            session_id,
            vnc_info,
            cdp_url,
        } => {
            viewer_debug!(
                "Browser ready session_id={:?} vnc_info={:?} cdp_url={:?}",
                session_id,
                vnc_info,
                cdp_url
            );
            state.set_status_label(LABEL_BROWSER_READY);
        }
        StreamMessage::NavigationComplete { url } => {
            state.set_current_url(url);
            state.set_status_label(LABEL_BROWSER_READY);
        }
        StreamMessage::NavigationError { error } => {
            let error = error.unwrap_or_default();
            state.set_status_label(navigation_error_label(&error));
        }
        StreamMessage::Error { message } => {
            let message = message.unwrap_or_default();
            state.set_status_label(server_error_label(&message));
        }
        StreamMessage::NewDatalayer { payload } => {
            if state.push_datalayer(payload) {
                viewer_debug!("First data-layer entry received; placeholder removed");
            }
        }
        StreamMessage::Unknown => {
            viewer_info!("Ignoring unknown event-stream action {}", action);
        }
    }
    Vec::new()
}
