use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;
use viewer_logging::LogDestination;

use crate::ConfigError;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
const CSRF_COOKIE: &str = "csrftoken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum LogTarget {
    #[default]
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

/// Configuration injected by the page that hosts the viewer, read once at
/// startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub status_url: String,
    #[serde(default)]
    pub finish_url: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
    /// Raw `Cookie` header; the CSRF token is read from it.
    #[serde(default)]
    pub cookies: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub datalayer_limit: Option<usize>,
    #[serde(default)]
    pub log_destination: LogTarget,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Validated endpoints for one session page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEndpoints {
    pub session_id: String,
    pub status_url: Url,
    pub finish_url: Url,
    pub stream_url: Url,
    pub cookies: Option<String>,
    pub csrf_token: Option<String>,
    pub poll_interval: Duration,
}

impl PageConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Checks required fields and derives the finish and stream addresses
    /// when they were not given explicitly.
    pub fn resolve(&self) -> Result<SessionEndpoints, ConfigError> {
        let session_id = self.session_id.trim();
        if session_id.is_empty() {
            return Err(ConfigError::MissingSessionId);
        }
        let status_url = self.status_url.trim();
        if status_url.is_empty() {
            return Err(ConfigError::MissingStatusUrl);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }

        let status_url = parse_url("status", status_url)?;
        let finish_url = match self.finish_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => parse_url("finish", url)?,
            _ => sibling_finish_url(&status_url),
        };
        let stream_url = match self.stream_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => parse_url("stream", url)?,
            _ => derive_stream_url(&status_url, session_id)?,
        };

        Ok(SessionEndpoints {
            session_id: session_id.to_string(),
            status_url,
            finish_url,
            stream_url,
            cookies: self.cookies.clone(),
            csrf_token: self.cookies.as_deref().and_then(csrf_token_from_cookies),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        })
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|err| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason: err.to_string(),
    })
}

/// `.../session/<id>/status/` becomes `.../session/<id>/finish/`.
fn sibling_finish_url(status_url: &Url) -> Url {
    let mut url = status_url.clone();
    let path = status_url.path().trim_end_matches('/');
    let parent = path.rsplit_once('/').map_or("", |(parent, _)| parent);
    url.set_path(&format!("{parent}/finish/"));
    url.set_query(None);
    url.set_fragment(None);
    url
}

fn derive_stream_url(status_url: &Url, session_id: &str) -> Result<Url, ConfigError> {
    let scheme = if status_url.scheme() == "https" {
        "wss"
    } else {
        "ws"
    };
    let host = status_url.host_str().ok_or_else(|| ConfigError::InvalidUrl {
        field: "status",
        value: status_url.to_string(),
        reason: "url has no host".to_string(),
    })?;
    let port = status_url
        .port()
        .map(|port| format!(":{port}"))
        .unwrap_or_default();
    let address = format!(
        "{scheme}://{host}{port}/ws/session/{}/",
        urlencoding::encode(session_id)
    );
    parse_url("stream", &address)
}

/// Extracts and URL-decodes the `csrftoken` cookie from a `Cookie` header.
pub fn csrf_token_from_cookies(cookies: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == CSRF_COOKIE)
        .map(|(_, value)| {
            let value = value.trim();
            urlencoding::decode(value)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
        .filter(|token| !token.is_empty())
}

/// HTTP client knobs shared by the poller and the termination request.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 1024 * 1024,
        }
    }
}
