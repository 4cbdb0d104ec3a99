//! HTTP transport contract.
//!
//! The query core never talks to sockets directly. It hands fully composed
//! URLs to an [`HttpTransport`]; the production implementation wraps
//! reqwest, tests substitute a scripted fake. Implementations must be safe
//! for concurrent use and must bound every call with a timeout.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Server-side failure (4xx/5xx).
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// True when the body is empty or only whitespace.
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(|b| b.is_ascii_whitespace())
    }
}

/// A failure below HTTP: no response was obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportFailure {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

/// Executes a single GET per call. No retries.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportFailure>;
}
