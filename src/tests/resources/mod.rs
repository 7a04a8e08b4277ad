mod inventory_tests;
mod metrics_tests;
mod plugin_tests;
mod process_tests;

use crate::NcpaClient;
use serde_json::Value;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub(super) fn create_test_client(mock_server: &MockServer) -> NcpaClient {
    NcpaClient::builder()
        .host(mock_server.address().ip().to_string())
        .port(mock_server.address().port())
        .token("secret")
        .secure(false)
        .build()
        .unwrap()
}

/// Mounts a GET responder for an endpoint below `/api/`, already percent-encoded.
pub(super) async fn mount_endpoint(mock_server: &MockServer, api_path: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{}", api_path)))
        .and(query_param("token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}
