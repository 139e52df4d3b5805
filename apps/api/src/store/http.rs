//! HTTP layer: request building, auth header, status mapping.
//!
//! Every store call goes through `HttpBackend::exchange`, which reads the
//! whole body as text before deciding how to interpret it.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::store::config::{BasicAuth, StoreConfig};
use crate::store::error::{StoreError, StoreResult};
use crate::store::query::StoreResponse;

/// Outcome of a container existence probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    Present,
    Absent,
}

#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) auth: BasicAuth,
    pub(crate) timeout: Duration,
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) debug: bool,
}

impl HttpBackend {
    pub(crate) fn new(config: &StoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth: BasicAuth::new(&config.username, &config.password),
            timeout: config.timeout,
            cancel: None,
            debug: config.debug,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `url(path)` with any userinfo stripped, for log output.
    pub(crate) fn log_url(&self, path: &str) -> String {
        redact_userinfo(&self.url(path))
    }

    /// Sends a JSON body and normalizes the success response.
    pub(crate) async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &T,
    ) -> StoreResult<StoreResponse> {
        let body = serde_json::to_vec(body)
            .map_err(|e| StoreError::validation(format!("failed to encode request body: {e}")))?;
        let (status, text) = self.exchange(method, path, Some(body)).await?;
        check_status(status, &text)?;
        Ok(StoreResponse::from_body(&text))
    }

    /// `GET` whose 404 means "absent" rather than failure.
    pub(crate) async fn probe(&self, path: &str) -> StoreResult<Probe> {
        let (status, text) = self.exchange(Method::GET, path, None).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(Probe::Absent);
        }
        check_status(status, &text)?;
        Ok(Probe::Present)
    }

    async fn exchange(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> StoreResult<(StatusCode, String)> {
        let url = self.url(path);
        if self.debug {
            debug!(
                method = %method,
                url = %redact_userinfo(&url),
                body_len = body.as_ref().map_or(0, Vec::len),
                "store request"
            );
        }

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(AUTHORIZATION, self.auth.header_value())
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout);
        if let Some(body) = body {
            request = request.body(body);
        }

        let call = async {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, StoreError>((status, text))
        };

        let (status, text) = match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(StoreError::Cancelled),
                    result = call => result?,
                }
            }
            None => call.await?,
        };

        if self.debug {
            debug!(
                method = %method,
                url = %redact_userinfo(&url),
                status = status.as_u16(),
                body_len = text.len(),
                "store response"
            );
        }
        Ok((status, text))
    }
}

/// Non-success statuses become `Transport`, carrying the body or, when the
/// body is empty, the status phrase.
fn check_status(status: StatusCode, text: &str) -> StoreResult<()> {
    if status.is_success() {
        return Ok(());
    }
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or("unknown status").to_string()
    } else {
        text.to_string()
    };
    Err(StoreError::Transport {
        status: status.as_u16(),
        message,
    })
}

/// Drops `user:password@` from a URL. Unparseable input is returned unchanged.
pub(crate) fn redact_userinfo(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            // Both setters only fail for cannot-be-a-base URLs, which carry no userinfo.
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.to_string()
        }
        Err(_) => raw.to_string(),
    }
}
