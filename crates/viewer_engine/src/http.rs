use futures_util::StreamExt;
use reqwest::header::{ACCEPT, COOKIE};
use serde::Deserialize;
use url::Url;
use viewer_core::StatusEnvelope;
use viewer_logging::{viewer_debug, viewer_warn};

use crate::{ClientSettings, FinishError, PollError};

const CSRF_HEADER: &str = "X-CSRFToken";

#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, url: &Url) -> Result<StatusEnvelope, PollError>;
}

#[async_trait::async_trait]
pub trait FinishRequester: Send + Sync {
    async fn request_finish(
        &self,
        url: &Url,
        csrf_token: Option<&str>,
    ) -> Result<(), FinishError>;
}

/// reqwest-backed client for the status and finish endpoints.
#[derive(Debug, Clone)]
pub struct ReqwestSessionClient {
    client: reqwest::Client,
    settings: ClientSettings,
    cookies: Option<String>,
}

impl ReqwestSessionClient {
    pub fn new(settings: ClientSettings, cookies: Option<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            settings,
            cookies,
        })
    }

    fn with_cookies(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.cookies.as_deref() {
            Some(cookies) => request.header(COOKIE, cookies),
            None => request,
        }
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, PollError> {
        let max_bytes = self.settings.max_bytes;
        if response
            .content_length()
            .is_some_and(|content_len| content_len > max_bytes)
        {
            return Err(PollError::TooLarge { max_bytes });
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_poll_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(PollError::TooLarge { max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl StatusSource for ReqwestSessionClient {
    async fn fetch_status(&self, url: &Url) -> Result<StatusEnvelope, PollError> {
        let request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json");
        let response = self
            .with_cookies(request)
            .send()
            .await
            .map_err(map_poll_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::HttpStatus(status.as_u16()));
        }

        let body = self.read_body(response).await?;
        serde_json::from_slice(&body).map_err(|err| PollError::Parse(err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct FinishBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait::async_trait]
impl FinishRequester for ReqwestSessionClient {
    async fn request_finish(
        &self,
        url: &Url,
        csrf_token: Option<&str>,
    ) -> Result<(), FinishError> {
        let mut request = self
            .client
            .post(url.clone())
            .header(ACCEPT, "application/json");
        match csrf_token {
            Some(token) => request = request.header(CSRF_HEADER, token),
            None => viewer_warn!("No csrftoken cookie configured; finish request may be rejected"),
        }

        let response = self
            .with_cookies(request)
            .send()
            .await
            .map_err(|err| FinishError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| FinishError::Transport(err.to_string()))?;
        let parsed = serde_json::from_slice::<FinishBody>(&body);
        viewer_debug!("Finish response status={} parsed={:?}", status, parsed);

        if !status.is_success() {
            return Err(FinishError::Rejected {
                status: status.as_u16(),
                message: parsed.ok().and_then(|body| body.error),
            });
        }

        match parsed {
            Ok(FinishBody {
                status: Some(ref ok),
                ..
            }) if ok == "ok" => Ok(()),
            Ok(FinishBody {
                error: Some(message),
                ..
            }) => Err(FinishError::Rejected {
                status: status.as_u16(),
                message: Some(message),
            }),
            Ok(other) => Err(FinishError::MalformedBody(format!("{other:?}"))),
            Err(err) => Err(FinishError::MalformedBody(err.to_string())),
        }
    }
}

fn map_poll_error(err: reqwest::Error) -> PollError {
    if err.is_timeout() {
        return PollError::Timeout;
    }
    PollError::Transport(err.to_string())
}
