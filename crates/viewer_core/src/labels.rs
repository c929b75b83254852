//! Fixed status-label texts shown to the user.

pub const LABEL_LOADING: &str = "Loading...";
pub const LABEL_UNKNOWN_STATUS: &str = "Unknown";
pub const LABEL_STATUS_QUERY_ERROR: &str = "Error querying status...";
pub const LABEL_CONFIG_ERROR: &str = "Configuration error";
pub const LABEL_FINISH_REQUESTED: &str = "Finish requested...";
pub const LABEL_FINISH_PROCESSING: &str = "Processing session finish...";
pub const LABEL_FINISH_FAILED: &str = "Could not finish the session";
pub const LABEL_BROWSER_READY: &str = "Browser ready";
pub const LABEL_CONNECTION_ERROR: &str = "Connection error";

pub fn navigation_error_label(error: &str) -> String {
    format!("Navigation error: {error}")
}

pub fn server_error_label(message: &str) -> String {
    format!("Error: {message}")
}

pub fn finish_failed_label(message: &str) -> String {
    format!("{LABEL_FINISH_FAILED}: {message}")
}

pub fn disconnected_label(code: Option<u16>) -> String {
    match code {
        Some(code) => format!("Disconnected (code {code})"),
        None => "Disconnected".to_string(),
    }
}
