//! Capability probing: a fast-fail gate before substantive requests.

use std::sync::Arc;
use std::time::Instant;

use metrics::counter;
use tracing::{debug, instrument, warn};

use mr_common::{HttpTransport, MrError, MrResult};
use mr_ogc::{Endpoint, Healthy};

use crate::exception::exception_text;

/// Checks that an endpoint is reachable and answers without an error status.
///
/// The probe only ever requests the endpoint's capabilities document; it
/// never carries the substantive request's filter or pagination.
#[derive(Clone)]
pub struct CapabilityProber {
    transport: Arc<dyn HttpTransport>,
}

impl CapabilityProber {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    #[instrument(skip(self), fields(protocol = %endpoint.protocol, base_url = %endpoint.base_url))]
    pub async fn probe(&self, endpoint: &Endpoint) -> MrResult<Healthy> {
        let url = endpoint.capabilities_url();
        let started = Instant::now();

        let response = match self.transport.get(&url).await {
            Ok(response) => response,
            Err(failure) => {
                counter!("mr_probes_total", "protocol" => endpoint.protocol.as_str(), "outcome" => "unreachable")
                    .increment(1);
                warn!(url = %url, error = %failure, "Capability probe could not reach endpoint");
                return Err(MrError::EndpointUnreachable {
                    url,
                    cause: failure.to_string(),
                });
            }
        };

        let detail = exception_text(&response.body);
        if response.is_error() || detail.is_some() {
            counter!("mr_probes_total", "protocol" => endpoint.protocol.as_str(), "outcome" => "error_status")
                .increment(1);
            warn!(url = %url, status = response.status, detail = ?detail, "Capability probe returned an error");
            return Err(MrError::EndpointErrorStatus {
                url,
                status: response.status,
                detail,
            });
        }

        counter!("mr_probes_total", "protocol" => endpoint.protocol.as_str(), "outcome" => "healthy")
            .increment(1);
        debug!(
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Endpoint healthy"
        );

        Ok(Healthy::new(endpoint.clone(), response.status))
    }
}

impl std::fmt::Debug for CapabilityProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityProber").finish_non_exhaustive()
    }
}
