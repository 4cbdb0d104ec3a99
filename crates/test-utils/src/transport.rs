//! Scripted transport for exercising the pipeline without a network.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use mr_common::{HttpResponse, HttpTransport, TransportFailure};

#[derive(Debug, Clone)]
enum Reply {
    Response(HttpResponse),
    Failure(TransportFailure),
}

#[derive(Debug, Clone)]
struct Route {
    pattern: String,
    reply: Reply,
}

/// Answers GETs from a list of routes.
///
/// A route matches when its pattern is a substring of the URL; the first
/// matching route in insertion order wins. Unrouted URLs fail with a
/// connect error naming the URL. Every URL requested is logged.
#[derive(Debug, Default)]
pub struct FakeTransport {
    routes: Vec<Route>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer matching URLs with `response`.
    pub fn route(mut self, pattern: impl Into<String>, response: HttpResponse) -> Self {
        self.routes.push(Route {
            pattern: pattern.into(),
            reply: Reply::Response(response),
        });
        self
    }

    /// Answer matching URLs with 200 and `body`.
    pub fn ok(self, pattern: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.route(pattern, HttpResponse::new(200, body))
    }

    /// Answer matching URLs with `status` and `body`.
    pub fn status(self, pattern: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        self.route(pattern, HttpResponse::new(status, body))
    }

    /// Fail matching URLs below HTTP.
    pub fn fail(mut self, pattern: impl Into<String>, failure: TransportFailure) -> Self {
        self.routes.push(Route {
            pattern: pattern.into(),
            reply: Reply::Failure(failure),
        });
        self
    }

    /// Every URL requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// Number of requests whose URL contains `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .expect("call log poisoned")
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportFailure> {
        self.calls.lock().expect("call log poisoned").push(url.to_string());

        let route = self.routes.iter().find(|route| url.contains(&route.pattern));
        match route.map(|route| &route.reply) {
            Some(Reply::Response(response)) => Ok(response.clone()),
            Some(Reply::Failure(failure)) => Err(failure.clone()),
            None => Err(TransportFailure::Connect(format!("no route for {}", url))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_route_wins() {
        let transport = FakeTransport::new()
            .status("request=GetCapabilities", 500, "boom")
            .ok("wfs?", "[]");

        let response = tokio_test::block_on(
            transport.get("https://geo.test/MarineRegions/wfs?service=WFS&request=GetCapabilities"),
        )
        .unwrap();
        assert_eq!(response.status, 500);

        let response =
            tokio_test::block_on(transport.get("https://geo.test/MarineRegions/wfs?request=GetFeature")).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(transport.calls().len(), 2);
        assert_eq!(transport.calls_matching("GetFeature"), 1);
    }

    #[test]
    fn test_unrouted_and_failing_urls() {
        let transport = FakeTransport::new().fail("slow", TransportFailure::Timeout("30s".to_string()));

        let err = tokio_test::block_on(transport.get("https://slow.test/")).unwrap_err();
        assert_eq!(err, TransportFailure::Timeout("30s".to_string()));

        let err = tokio_test::block_on(transport.get("https://elsewhere.test/")).unwrap_err();
        assert!(matches!(err, TransportFailure::Connect(_)));
    }
}
