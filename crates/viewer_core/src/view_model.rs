use crate::{FinishControl, PollingState, StreamState, TerminationState};

/// Read-only snapshot handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionViewModel {
    pub status_label: String,
    /// Remote-display link; visible iff `Some`.
    pub remote_display_href: Option<String>,
    pub finish: FinishControl,
    /// Report link; visible iff `Some`.
    pub report_href: Option<String>,
    pub current_url: Option<String>,
    /// Pretty-printed data-layer entries, most recent first.
    pub datalayer_entries: Vec<String>,
    pub datalayer_placeholder: bool,
    pub polling: PollingState,
    pub stream: StreamState,
    pub termination: TerminationState,
    pub halted: bool,
    pub dirty: bool,
}
