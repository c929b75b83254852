use serde::{Deserialize, Serialize};

/// Machine state reported by the status endpoint.
///
/// Codes the client does not know about are kept verbatim in `Other` and are
/// treated as in-progress.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusCode {
    WaitingUser,
    Processing,
    Completed,
    Error,
    FinishRequested,
    Other(String),
}

impl StatusCode {
    pub fn as_str(&self) -> &str {
        match self {
            StatusCode::WaitingUser => "waiting_user",
            StatusCode::Processing => "processing",
            StatusCode::Completed => "completed",
            StatusCode::Error => "error",
            StatusCode::FinishRequested => "finish_requested",
            StatusCode::Other(code) => code,
        }
    }

    /// Terminal codes are exactly the ones that stop polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusCode::Completed | StatusCode::Error)
    }

    /// Known non-interactive codes hide the finish control entirely; unknown
    /// codes keep it visible but disabled.
    pub(crate) fn hides_finish_control(&self) -> bool {
        matches!(
            self,
            StatusCode::Processing
                | StatusCode::Completed
                | StatusCode::Error
                | StatusCode::FinishRequested
        )
    }
}

impl From<String> for StatusCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "waiting_user" => StatusCode::WaitingUser,
            "processing" => StatusCode::Processing,
            "completed" => StatusCode::Completed,
            "error" => StatusCode::Error,
            "finish_requested" => StatusCode::FinishRequested,
            _ => StatusCode::Other(code),
        }
    }
}

impl From<&str> for StatusCode {
    fn from(code: &str) -> Self {
        StatusCode::from(code.to_string())
    }
}

impl From<StatusCode> for String {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

/// JSON snapshot returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    pub status_code: StatusCode,
    #[serde(default)]
    pub vnc_url: Option<String>,
    #[serde(default)]
    pub report_url: Option<String>,
}

impl StatusEnvelope {
    pub fn new(status: impl Into<String>, status_code: impl Into<StatusCode>) -> Self {
        Self {
            status: Some(status.into()),
            status_code: status_code.into(),
            vnc_url: None,
            report_url: None,
        }
    }

    pub fn with_vnc_url(mut self, url: impl Into<String>) -> Self {
        self.vnc_url = Some(url.into());
        self
    }

    pub fn with_report_url(mut self, url: impl Into<String>) -> Self {
        self.report_url = Some(url.into());
        self
    }

    /// Display label, `None` when the server sent nothing usable.
    pub fn label(&self) -> Option<&str> {
        non_empty(self.status.as_deref())
    }

    pub fn vnc_url(&self) -> Option<&str> {
        non_empty(self.vnc_url.as_deref())
    }

    pub fn report_url(&self) -> Option<&str> {
        non_empty(self.report_url.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
