//! reqwest-backed HTTP transport.

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::trace;

use mr_common::{HttpResponse, HttpTransport, MrError, MrResult, ServiceConfig, TransportFailure};

/// Production transport: one pooled reqwest client, bounded by the
/// configured request and connect timeouts. A single attempt per call.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ServiceConfig) -> MrResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| MrError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportFailure> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // A timeout while reading the body is still a transport failure.
        let body = response.bytes().await.map_err(classify)?;
        trace!(url = %url, status, bytes = body.len(), "HTTP GET completed");

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportFailure::Connect(err.to_string())
    } else {
        TransportFailure::Other(err.to_string())
    }
}
