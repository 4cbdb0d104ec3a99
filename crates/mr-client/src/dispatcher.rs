//! Request dispatch: compose the final URL, gate on the probe, execute once.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use metrics::{counter, histogram};
use tracing::{debug, info, instrument, warn};

use mr_common::{HttpTransport, MrError, MrResult};
use mr_ogc::{Protocol, ProbeState, QueryRequest, ResponseFormat};

use crate::exception::exception_text;
use crate::normalize::{normalize, NormalizedResult};
use crate::prober::CapabilityProber;

/// Undecoded response of a substantive request.
#[derive(Debug, Clone)]
pub struct RawPayload {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub declared_format: ResponseFormat,
    pub body: Bytes,
}

impl RawPayload {
    /// True for 204 responses and bodies that are empty or whitespace.
    pub fn is_empty(&self) -> bool {
        self.status == 204 || self.body.iter().all(|b| b.is_ascii_whitespace())
    }

    /// Normalize using the format the request declared.
    pub fn normalize(self) -> MrResult<NormalizedResult> {
        normalize(&self.body, self.declared_format)
    }
}

/// Executes [`QueryRequest`]s. A single attempt per call; no retries.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn HttpTransport>,
    prober: CapabilityProber,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        let prober = CapabilityProber::new(transport.clone());
        Self { transport, prober }
    }

    pub fn prober(&self) -> &CapabilityProber {
        &self.prober
    }

    /// Dispatch a request.
    ///
    /// URL composition errors surface before any network activity. Unless
    /// the request carries a probe result for its own endpoint, the endpoint
    /// is probed first and probe errors propagate unchanged; the substantive
    /// request is not sent in that case.
    #[instrument(skip(self, request), fields(protocol = %request.endpoint.protocol, format = %request.response_format))]
    pub async fn dispatch(&self, request: QueryRequest) -> MrResult<RawPayload> {
        let url = request.to_url()?;

        match &request.probe {
            ProbeState::Done(healthy) if healthy.covers(&request.endpoint) => {}
            _ => {
                self.prober.probe(&request.endpoint).await?;
            }
        }

        let protocol = request.endpoint.protocol.as_str();
        let started = Instant::now();

        let response = match self.transport.get(&url).await {
            Ok(response) => response,
            Err(failure) => {
                counter!("mr_requests_total", "protocol" => protocol, "outcome" => "transport_error")
                    .increment(1);
                warn!(url = %url, error = %failure, "Request failed below HTTP");
                return Err(MrError::Transport {
                    url,
                    message: failure.to_string(),
                });
            }
        };

        let elapsed = started.elapsed();
        histogram!("mr_request_duration_seconds", "protocol" => protocol).record(elapsed.as_secs_f64());

        // Exception reports only come from the OGC services.
        let detail = match request.endpoint.protocol {
            Protocol::Wms | Protocol::Wfs => exception_text(&response.body),
            Protocol::Rest => None,
        };
        if response.is_error() || detail.is_some() {
            counter!("mr_requests_total", "protocol" => protocol, "outcome" => "error_status")
                .increment(1);
            debug!(url = %url, status = response.status, detail = ?detail, "Request returned an error");
            return Err(MrError::RequestErrorStatus {
                url,
                status: response.status,
                detail,
            });
        }

        counter!("mr_requests_total", "protocol" => protocol, "outcome" => "ok").increment(1);
        info!(
            url = %url,
            status = response.status,
            bytes = response.body.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        Ok(RawPayload {
            url,
            status: response.status,
            content_type: response.content_type,
            declared_format: request.response_format,
            body: response.body,
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("prober", &self.prober)
            .finish_non_exhaustive()
    }
}
