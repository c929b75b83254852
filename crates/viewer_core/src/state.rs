use std::collections::VecDeque;

use serde_json::Value;

use crate::view_model::SessionViewModel;
use crate::LABEL_LOADING;

/// Visibility and enablement of the finish control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinishControl {
    pub visible: bool,
    pub enabled: bool,
}

impl FinishControl {
    pub const HIDDEN: Self = Self {
        visible: false,
        enabled: false,
    };
    pub const ENABLED: Self = Self {
        visible: true,
        enabled: true,
    };
    pub const DISABLED: Self = Self {
        visible: true,
        enabled: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollingState {
    #[default]
    Active,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Connecting,
    Open,
    Closed {
        code: Option<u16>,
    },
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TerminationState {
    #[default]
    Idle,
    Pending,
    Accepted,
    Failed {
        message: String,
    },
}

/// Client-owned visible state of one session page.
///
/// Only [`crate::update`] mutates it; setters mark the state dirty only when a
/// value actually changes, so the renderer redraws on real changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    status_label: String,
    remote_display_href: Option<String>,
    finish: FinishControl,
    report_href: Option<String>,
    current_url: Option<String>,
    datalayer: VecDeque<Value>,
    datalayer_placeholder: bool,
    datalayer_limit: Option<usize>,
    polling: PollingState,
    last_status_seq: Option<u64>,
    stream: StreamState,
    init_sent: bool,
    termination: TerminationState,
    halted: bool,
    dirty: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            status_label: LABEL_LOADING.to_string(),
            remote_display_href: None,
            finish: FinishControl::HIDDEN,
            report_href: None,
            current_url: None,
            datalayer: VecDeque::new(),
            datalayer_placeholder: true,
            datalayer_limit: None,
            polling: PollingState::Active,
            last_status_seq: None,
            stream: StreamState::Connecting,
            init_sent: false,
            termination: TerminationState::Idle,
            halted: false,
            dirty: false,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of retained data-layer entries; oldest are evicted.
    pub fn with_datalayer_limit(mut self, limit: Option<usize>) -> Self {
        self.datalayer_limit = limit;
        self
    }

    pub fn view(&self) -> SessionViewModel {
        SessionViewModel {
            status_label: self.status_label.clone(),
            remote_display_href: self.remote_display_href.clone(),
            finish: self.finish,
            report_href: self.report_href.clone(),
            current_url: self.current_url.clone(),
            datalayer_entries: self.datalayer.iter().map(pretty_entry).collect(),
            datalayer_placeholder: self.datalayer_placeholder,
            polling: self.polling,
            stream: self.stream,
            termination: self.termination.clone(),
            halted: self.halted,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn polling(&self) -> PollingState {
        self.polling
    }

    pub fn stream(&self) -> StreamState {
        self.stream
    }

    pub fn finish_control(&self) -> FinishControl {
        self.finish
    }

    pub fn termination(&self) -> &TerminationState {
        &self.termination
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn halt(&mut self) {
        self.halted = true;
        self.polling = PollingState::Stopped;
        self.mark_dirty();
    }

    pub(crate) fn set_status_label(&mut self, label: impl Into<String>) {
        let changed = replace_if_changed(&mut self.status_label, label.into());
        self.dirty |= changed;
    }

    pub(crate) fn set_remote_display(&mut self, href: Option<&str>) {
        let changed = replace_if_changed(&mut self.remote_display_href, href.map(ToOwned::to_owned));
        self.dirty |= changed;
    }

    pub(crate) fn set_finish_control(&mut self, finish: FinishControl) {
        let changed = replace_if_changed(&mut self.finish, finish);
        self.dirty |= changed;
    }

    pub(crate) fn set_report_link(&mut self, href: Option<&str>) {
        let changed = replace_if_changed(&mut self.report_href, href.map(ToOwned::to_owned));
        self.dirty |= changed;
    }

    pub(crate) fn set_current_url(&mut self, url: Option<String>) {
        let changed = replace_if_changed(&mut self.current_url, url);
        self.dirty |= changed;
    }

    /// Accepts a poll result only while polling is active and only if it is
    /// newer than every result applied so far.
    pub(crate) fn accept_status_seq(&mut self, seq: u64) -> bool {
        if self.polling == PollingState::Stopped {
            return false;
        }
        if self.last_status_seq.is_some_and(|last| seq <= last) {
            return false;
        }
        self.last_status_seq = Some(seq);
        true
    }

    /// Returns `true` only on the transition from active to stopped.
    pub(crate) fn stop_polling(&mut self) -> bool {
        if self.polling == PollingState::Stopped {
            return false;
        }
        self.polling = PollingState::Stopped;
        self.mark_dirty();
        true
    }

    pub(crate) fn set_termination(&mut self, termination: TerminationState) {
        let changed = replace_if_changed(&mut self.termination, termination);
        self.dirty |= changed;
    }

    pub(crate) fn set_stream_state(&mut self, stream: StreamState) {
        let changed = replace_if_changed(&mut self.stream, stream);
        self.dirty |= changed;
    }

    /// Returns `true` the first time it is called.
    pub(crate) fn take_init_slot(&mut self) -> bool {
        !std::mem::replace(&mut self.init_sent, true)
    }

    /// Prepends a data-layer entry. Returns `true` when this entry replaced the
    /// initial placeholder.
    pub(crate) fn push_datalayer(&mut self, payload: Value) -> bool {
        self.datalayer.push_front(payload);
        if let Some(limit) = self.datalayer_limit {
            self.datalayer.truncate(limit);
        }
        self.mark_dirty();
        std::mem::replace(&mut self.datalayer_placeholder, false)
    }
}

/// Writes `value` into `slot` and reports whether it differed.
fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn pretty_entry(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
