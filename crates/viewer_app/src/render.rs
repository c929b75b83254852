use chrono::Local;
use viewer_core::{PollingState, SessionViewModel, StreamState, TerminationState};
use viewer_logging::viewer_error;

/// Number of data-layer entries echoed per redraw.
const DATALAYER_PREVIEW: usize = 1;

pub fn render(view: &SessionViewModel) -> Vec<String> {
    let mut lines = vec![format!(
        "[{}] Status: {}",
        Local::now().format("%H:%M:%S"),
        view.status_label
    )];

    if let Some(href) = &view.remote_display_href {
        lines.push(format!("  Remote display: {href}"));
    }
    if view.finish.visible {
        let hint = if view.finish.enabled {
            "enabled (type `finish`)"
        } else {
            "disabled"
        };
        lines.push(format!("  Finish: {hint}"));
    }
    if let Some(href) = &view.report_href {
        lines.push(format!("  Report: {href}"));
    }
    if let Some(url) = &view.current_url {
        lines.push(format!("  Current URL: {url}"));
    }

    let polling = match view.polling {
        PollingState::Active => "active",
        PollingState::Stopped => "stopped",
    };
    let stream = match view.stream {
        StreamState::Connecting => "connecting".to_string(),
        StreamState::Open => "open".to_string(),
        StreamState::Closed { code: Some(code) } => format!("closed ({code})"),
        StreamState::Closed { code: None } => "closed".to_string(),
        StreamState::Failed => "failed".to_string(),
    };
    let termination = match &view.termination {
        TerminationState::Idle => "",
        TerminationState::Pending => " | finish: pending",
        TerminationState::Accepted => " | finish: accepted",
        TerminationState::Failed { .. } => " | finish: failed",
    };
    lines.push(format!(
        "  Polling: {polling} | Stream: {stream}{termination}"
    ));

    if view.datalayer_placeholder {
        lines.push("  Data layer: waiting for events...".to_string());
    } else {
        lines.push(format!(
            "  Data layer: {} entries, newest first",
            view.datalayer_entries.len()
        ));
        for entry in view.datalayer_entries.iter().take(DATALAYER_PREVIEW) {
            lines.extend(entry.lines().map(|line| format!("    {line}")));
        }
    }
    lines
}

pub fn print(view: &SessionViewModel) {
    for line in render(view) {
        println!("{line}");
    }
}

/// Terminal stand-in for a blocking alert.
pub fn notify(message: &str) {
    viewer_error!("{}", message);
    eprintln!();
    eprintln!("!!! {message}");
    eprintln!();
}
