use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Server-to-client frame on the event stream, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StreamMessage {
    BrowserState {
        #[serde(default)]
        state: Option<String>,
    },
    BrowserReady {
        #[serde(default)]
        session_id: Option<String>,
        #[serde(default)]
        vnc_info: Option<Value>,
        #[serde(default)]
        cdp_url: Option<String>,
    },
    NavigationComplete {
        #[serde(default)]
        url: Option<String>,
    },
    NavigationError {
        #[serde(default)]
        error: Option<String>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    NewDatalayer {
        #[serde(default)]
        payload: Value,
    },
    /// Any action this client does not know yet.
    #[serde(other)]
    Unknown,
}

/// Client-to-server command frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    InitBrowser,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("frame has no action")]
    MissingAction,
    #[error("malformed `{action}` frame: {source}")]
    Payload {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses one inbound frame, returning the raw action name alongside the
/// typed message so unknown actions can still be reported.
pub fn parse_frame(text: &str) -> Result<(String, StreamMessage), FrameError> {
    let value: Value = serde_json::from_str(text).map_err(FrameError::Json)?;
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or(FrameError::MissingAction)?
        .to_string();
    let message = serde_json::from_value(value).map_err(|source| FrameError::Payload {
        action: action.clone(),
        source,
    })?;
    Ok((action, message))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_frame, ClientCommand, FrameError, StreamMessage};

    #[test]
    fn init_browser_serializes_with_action_tag() {
        let encoded = serde_json::to_value(ClientCommand::InitBrowser).unwrap();
        assert_eq!(encoded, json!({"action": "init_browser"}));
    }

    #[test]
    fn parses_datalayer_payload() {
        let (action, message) =
            parse_frame(r#"{"action":"new_datalayer","payload":{"event":"click","id":42}}"#)
                .unwrap();
        assert_eq!(action, "new_datalayer");
        assert_eq!(
            message,
            StreamMessage::NewDatalayer {
                payload: json!({"event": "click", "id": 42})
            }
        );
    }

    #[test]
    fn unknown_action_is_not_an_error() {
        let (action, message) = parse_frame(r#"{"action":"screenshot","data":"..."}"#).unwrap();
        assert_eq!(action, "screenshot");
        assert_eq!(message, StreamMessage::Unknown);
    }

    #[test]
    fn rejects_garbage_and_actionless_frames() {
        assert!(matches!(parse_frame("{not json"), Err(FrameError::Json(_))));
        assert!(matches!(
            parse_frame(r#"{"url":"https://example.com"}"#),
            Err(FrameError::MissingAction)
        ));
        assert!(matches!(
            parse_frame(r#"{"action":"navigation_complete","url":7}"#),
            Err(FrameError::Payload { .. })
        ));
    }
}
