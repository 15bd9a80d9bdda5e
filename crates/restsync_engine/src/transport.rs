use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use sync_logging::{sync_debug, sync_trace};

use crate::{FailureKind, Method, SyncError, TransportResponse};

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Performs one HTTP exchange with a JSON body in either direction.
///
/// Implementations report a non-2xx status as a normal response; only
/// failures that produced no status at all are errors.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, SyncError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    settings: TransportSettings,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SyncError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    fn too_large(&self, actual: u64) -> SyncError {
        SyncError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Body, SyncError> {
        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Ok(Body::Oversized(content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Ok(Body::Oversized(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(Body::Complete(bytes))
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, SyncError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| SyncError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let mut builder = self
            .client
            .request(to_reqwest_method(method), parsed)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        sync_debug!("{} {}", method, url);
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();

        let body = match self.read_body(response).await? {
            Body::Complete(bytes) => {
                sync_trace!("{} {} -> {} ({} bytes)", method, url, status, bytes.len());
                parse_body(&bytes)
            }
            // Error replies are reported by status; their body is never used.
            Body::Oversized(_) if !(200..300).contains(&status) => {
                sync_trace!("{} {} -> {} (oversized body dropped)", method, url, status);
                None
            }
            Body::Oversized(actual) => return Err(self.too_large(actual)),
        };
        Ok(TransportResponse { status, body })
    }
}

enum Body {
    Complete(Vec<u8>),
    /// Reading stopped once the body passed `max_bytes`.
    Oversized(u64),
}

fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            sync_trace!("response body is not JSON: {}", err);
            None
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        return SyncError::new(FailureKind::Timeout, err.to_string());
    }
    SyncError::new(FailureKind::Network, err.to_string())
}
