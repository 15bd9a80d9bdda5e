use std::fmt;

use restsync_core::CandidateError;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and parsed body of one exchange. `body` is `None` when the server
/// sent nothing or something that is not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx status into an error and yields the body otherwise.
    pub fn into_success_body(self) -> Result<Option<Value>, SyncError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(SyncError::new(
                FailureKind::HttpStatus(self.status),
                format!("server answered {}", self.status),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct SyncError {
    pub kind: FailureKind,
    pub message: String,
}

impl SyncError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::new(FailureKind::MalformedResponse, message)
    }

    pub(crate) fn closed() -> Self {
        Self::new(FailureKind::Closed, "store was closed; result discarded")
    }

    /// True when the request never produced an HTTP status.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self.kind,
            FailureKind::InvalidUrl
                | FailureKind::Network
                | FailureKind::Timeout
                | FailureKind::TooLarge { .. }
        )
    }
}

impl From<CandidateError> for SyncError {
    fn from(err: CandidateError) -> Self {
        Self::new(FailureKind::InvalidCandidate, err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Network,
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    HttpStatus(u16),
    MalformedResponse,
    InvalidCandidate,
    Closed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::InvalidCandidate => write!(f, "invalid candidate"),
            FailureKind::Closed => write!(f, "closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_success_status_becomes_http_error() {
        let response = TransportResponse {
            status: 404,
            body: None,
        };
        let err = response.into_success_body().unwrap_err();
        assert_eq!(err.kind, FailureKind::HttpStatus(404));
        assert!(!err.is_transport_failure());
    }

    #[test]
    fn transport_failures_are_grouped() {
        for kind in [
            FailureKind::InvalidUrl,
            FailureKind::Network,
            FailureKind::Timeout,
            FailureKind::TooLarge {
                max_bytes: 1,
                actual: None,
            },
        ] {
            assert!(SyncError::new(kind, "x").is_transport_failure());
        }
        assert!(!SyncError::malformed("x").is_transport_failure());
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = SyncError::new(FailureKind::HttpStatus(500), "boom");
        assert_eq!(err.to_string(), "http status 500: boom");
    }
}
