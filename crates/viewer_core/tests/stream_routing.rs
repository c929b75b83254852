use std::sync::Once;

use pretty_assertions::assert_eq;
use serde_json::json;
use viewer_core::{
    update, ClientCommand, Effect, Msg, PollingState, StatusEnvelope, StreamState, ViewState,
    LABEL_BROWSER_READY, LABEL_CONFIG_ERROR, LABEL_CONNECTION_ERROR,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(viewer_logging::initialize_for_tests);
}

fn frame(state: ViewState, text: &str) -> (ViewState, Vec<Effect>) {
    update(state, Msg::StreamFrame(text.to_string()))
}

fn datalayer_frame(payload: serde_json::Value) -> String {
    json!({"action": "new_datalayer", "payload": payload}).to_string()
}

#[test]
fn open_sends_init_browser_exactly_once() {
    init_logging();
    let (state, effects) = update(ViewState::new(), Msg::StreamOpened);
    assert_eq!(
        effects,
        vec![Effect::SendStreamCommand(ClientCommand::InitBrowser)]
    );
    assert_eq!(state.view().stream, StreamState::Open);

    let (_state, effects) = update(state, Msg::StreamOpened);
    assert!(effects.is_empty());
}

#[test]
fn navigation_complete_updates_url_and_resets_label() {
    init_logging();
    let (state, _) = frame(
        ViewState::new(),
        r#"{"action":"browser_state","state":"Navigating..."}"#,
    );
    assert_eq!(state.view().status_label, "Navigating...");

    let (state, effects) = frame(
        state,
        r#"{"action":"navigation_complete","url":"https://example.com"}"#,
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.view().current_url.as_deref(),
        Some("https://example.com")
    );
    assert_eq!(state.view().status_label, LABEL_BROWSER_READY);
}

#[test]
fn browser_ready_and_error_frames_update_label() {
    init_logging();
    let (state, _) = frame(
        ViewState::new(),
        r#"{"action":"browser_ready","session_id":"abc","vnc_info":null,"cdp_url":"ws://cdp"}"#,
    );
    assert_eq!(state.view().status_label, LABEL_BROWSER_READY);

    let (state, _) = frame(
        state,
        r#"{"action":"navigation_error","error":"net::ERR_NAME_NOT_RESOLVED"}"#,
    );
    assert_eq!(
        state.view().status_label,
        "Navigation error: net::ERR_NAME_NOT_RESOLVED"
    );

    let (state, _) = frame(state, r#"{"action":"error","message":"Unknown action."}"#);
    assert_eq!(state.view().status_label, "Error: Unknown action.");
}

#[test]
fn datalayer_entries_are_prepended_and_placeholder_removed_once() {
    init_logging();
    let payload = json!({"event": "click", "id": 42});
    let mut state = ViewState::new();
    assert!(state.view().datalayer_placeholder);

    for _ in 0..3 {
        let (next, effects) = frame(state, &datalayer_frame(payload.clone()));
        assert!(effects.is_empty());
        assert!(!next.view().datalayer_placeholder);
        state = next;
    }

    let (state, _) = frame(state, &datalayer_frame(json!({"event": "scroll"})));
    let view = state.view();
    assert_eq!(view.datalayer_entries.len(), 4);
    assert_eq!(
        view.datalayer_entries[0],
        serde_json::to_string_pretty(&json!({"event": "scroll"})).unwrap()
    );
    assert_eq!(
        view.datalayer_entries[1],
        serde_json::to_string_pretty(&payload).unwrap()
    );
}

#[test]
fn first_datalayer_entry_is_the_pretty_payload() {
    init_logging();
    let (state, _) = frame(
        ViewState::new(),
        r#"{"action":"new_datalayer","payload":{"event":"click","id":42}}"#,
    );
    assert_eq!(
        state.view().datalayer_entries,
        vec!["{\n  \"event\": \"click\",\n  \"id\": 42\n}".to_string()]
    );
}

#[test]
fn datalayer_limit_evicts_oldest_entries() {
    init_logging();
    let mut state = ViewState::new().with_datalayer_limit(Some(2));
    for id in 0..5 {
        let (next, _) = frame(state, &datalayer_frame(json!({ "id": id })));
        state = next;
    }
    let entries = state.view().datalayer_entries;
    assert_eq!(entries.len(), 2);
    assert!(entries[0].contains('4'));
    assert!(entries[1].contains('3'));
}

#[test]
fn malformed_and_unknown_frames_leave_state_untouched() {
    init_logging();
    let mut state = ViewState::new();
    state.consume_dirty();

    let (mut state, effects) = frame(state, "{definitely not json");
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());

    let (mut state, effects) = frame(state, r#"{"action":"screenshot","data":"AAAA"}"#);
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());

    let (mut state, _) = frame(state, r#"{"payload":{}}"#);
    assert!(!state.consume_dirty());
    assert_eq!(state.view(), ViewState::new().view());
}

#[test]
fn close_and_transport_error_update_label() {
    init_logging();
    let (state, _) = update(ViewState::new(), Msg::StreamOpened);
    let (state, _) = update(state, Msg::StreamClosed { code: Some(1006) });
    assert_eq!(state.view().status_label, "Disconnected (code 1006)");
    assert_eq!(
        state.view().stream,
        StreamState::Closed { code: Some(1006) }
    );

    let (state, _) = update(ViewState::new(), Msg::StreamFailed("reset".to_string()));
    assert_eq!(state.view().status_label, LABEL_CONNECTION_ERROR);
    assert_eq!(state.view().stream, StreamState::Failed);
}

#[test]
fn stream_and_polling_paths_merge_into_one_view() {
    init_logging();
    let (state, _) = update(
        ViewState::new(),
        Msg::StatusReceived {
            seq: 1,
            envelope: StatusEnvelope::new("Esperando", "waiting_user")
                .with_vnc_url("https://x/vnc"),
        },
    );
    let (state, _) = frame(
        state,
        r#"{"action":"navigation_complete","url":"https://shop.example"}"#,
    );
    let view = state.view();

    assert_eq!(view.status_label, LABEL_BROWSER_READY);
    assert_eq!(view.remote_display_href.as_deref(), Some("https://x/vnc"));
    assert_eq!(view.current_url.as_deref(), Some("https://shop.example"));
}

#[test]
fn config_error_halts_everything() {
    init_logging();
    let (state, effects) = update(
        ViewState::new(),
        Msg::ConfigInvalid("missing session id".to_string()),
    );
    assert!(effects.is_empty());
    assert!(state.is_halted());
    assert_eq!(state.view().status_label, LABEL_CONFIG_ERROR);
    assert_eq!(state.view().polling, PollingState::Stopped);

    let (state, effects) = update(state, Msg::StreamOpened);
    assert!(effects.is_empty());
    assert_eq!(state.view().stream, StreamState::Connecting);
}
