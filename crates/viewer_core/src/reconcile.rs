use viewer_logging::{viewer_debug, viewer_info};

use crate::{Effect, FinishControl, StatusCode, StatusEnvelope, ViewState, LABEL_UNKNOWN_STATUS};

/// Applies one status envelope. Every envelope fully replaces the link and
/// finish-control decision; only the polling flag carries over so that
/// `StopPolling` is emitted once.
pub(crate) fn reconcile(state: &mut ViewState, envelope: &StatusEnvelope) -> Vec<Effect> {
    let code = &envelope.status_code;
    viewer_debug!(
        "Reconciling status_code={} vnc_url={} report_url={}",
        code.as_str(),
        envelope.vnc_url().is_some(),
        envelope.report_url().is_some()
    );

    state.set_status_label(envelope.label().unwrap_or(LABEL_UNKNOWN_STATUS));

    match (code, envelope.vnc_url()) {
        (StatusCode::WaitingUser, Some(vnc_url)) => {
            state.set_remote_display(Some(vnc_url));
            state.set_finish_control(FinishControl::ENABLED);
        }
        (StatusCode::WaitingUser, None) => {
            state.set_remote_display(None);
            state.set_finish_control(FinishControl::HIDDEN);
        }
        (code, _) if code.hides_finish_control() => {
            state.set_remote_display(None);
            state.set_finish_control(FinishControl::HIDDEN);
        }
        _ => {
            state.set_remote_display(None);
            state.set_finish_control(FinishControl::DISABLED);
        }
    }

    let report = match code {
        StatusCode::Completed => envelope.report_url(),
        _ => None,
    };
    state.set_report_link(report);

    if code.is_terminal() && state.stop_polling() {
        viewer_info!("Terminal status {} reached; stopping polling", code.as_str());
        vec![Effect::StopPolling]
    } else {
        Vec::new()
    }
}
