#![allow(dead_code)]

use portal_loadtest::client::{ApiClient, LOGIN_PATH};
use portal_loadtest::config::TargetConfig;
use portal_loadtest::stats::Stats;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn client_for(server: &MockServer) -> ApiClient {
    let target = TargetConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
    };
    ApiClient::new(&target, Stats::new()).expect("client builds")
}

/// Respond to a login for `email` with `token`.
pub async fn mount_login(server: &MockServer, email: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_json(json!({ "email": email, "password": "test1234" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .mount(server)
        .await;
}

pub fn authorization(req: &wiremock::Request) -> Option<String> {
    req.headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
