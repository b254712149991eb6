//! HTTP mocking utilities using wiremock.

use serde::Serialize;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer, Request, ResponseTemplate};

/// Mock OMDb server.
///
/// OMDb serves everything from `GET /` and selects the operation through
/// query parameters, so mocks are keyed by query parameter pairs.
pub struct TestHttpServer {
    server: MockServer,
}

impl TestHttpServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure the OMDb client with.
    pub fn url(&self) -> String {
        format!("{}/", self.server.uri())
    }

    /// Access the underlying MockServer
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    fn matching(params: &[(&str, &str)]) -> MockBuilder {
        params
            .iter()
            .fold(Mock::given(method("GET")).and(path("/")), |mock, (k, v)| {
                mock.and(query_param(*k, *v))
            })
    }

    /// Respond with JSON to requests carrying all of `params`.
    pub async fn get_json<T: Serialize>(&self, params: &[(&str, &str)], response: &T) {
        Self::matching(params)
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Like [`get_json`](Self::get_json), but fail the test on drop unless the
    /// mock was hit exactly `times` times.
    pub async fn get_json_expect<T: Serialize>(
        &self,
        params: &[(&str, &str)],
        response: &T,
        times: u64,
    ) {
        Self::matching(params)
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Respond with an error status and an OMDb-style error body.
    pub async fn error(&self, params: &[(&str, &str)], status: u16, message: &str) {
        Self::matching(params)
            .respond_with(
                ResponseTemplate::new(status).set_body_json(serde_json::json!({
                    "Response": "False",
                    "Error": message,
                })),
            )
            .mount(&self.server)
            .await;
    }

    /// Respond with JSON after a delay.
    pub async fn with_latency<T: Serialize>(
        &self,
        params: &[(&str, &str)],
        response: &T,
        latency: Duration,
    ) {
        Self::matching(params)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(response)
                    .set_delay(latency),
            )
            .mount(&self.server)
            .await;
    }

    /// Get all received requests
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Number of requests received so far.
    pub async fn request_count(&self) -> usize {
        self.received_requests().await.len()
    }
}
