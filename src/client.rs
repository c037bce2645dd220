//! HTTP access to the portal API.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::TargetConfig;
use crate::credentials::Credentials;
use crate::error::LoadTestError;
use crate::stats::Stats;

pub const LOGIN_PATH: &str = "/app/api/v1/auth/login";
pub const APPLICATIONS_PATH: &str = "/app/api/v1/application";
/// Stats name shared by every per-application detail request
pub const APPLICATION_DETAIL_NAME: &str = "/app/api/v1/application/[id]";

/// Opaque token returned by the login endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Status and fully read body of a recorded request
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// Thin wrapper over `reqwest::Client` bound to one base URL.
///
/// Requests made through the workload methods are timed and recorded in
/// [`Stats`]; [`ApiClient::authenticate`] is not, since startup logins are
/// not part of the measured traffic.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    stats: Stats,
}

impl ApiClient {
    pub fn new(cfg: &TargetConfig, stats: Stats) -> Result<Self, LoadTestError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("portal-loadtest/", env!("CARGO_PKG_VERSION"))),
        );
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            stats,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in and return the token. Any non-2xx status, non-JSON body, or
    /// missing `token` field is an error.
    pub async fn authenticate(&self, creds: &Credentials) -> Result<BearerToken, LoadTestError> {
        let resp = self.http.post(self.url(LOGIN_PATH)).json(creds).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LoadTestError::LoginRejected {
                account: creds.email.clone(),
                status,
            });
        }

        let body = resp.bytes().await?;
        let parsed: LoginResponse =
            serde_json::from_slice(&body).map_err(|source| LoadTestError::Decode {
                endpoint: LOGIN_PATH,
                source,
            })?;

        parsed
            .token
            .map(BearerToken::new)
            .ok_or_else(|| LoadTestError::MissingToken {
                account: creds.email.clone(),
            })
    }

    pub async fn login(&self, creds: &Credentials) -> Result<ApiResponse, LoadTestError> {
        let req = self.http.post(self.url(LOGIN_PATH)).json(creds);
        self.send(Method::POST, LOGIN_PATH, req).await
    }

    pub async fn list_applications(
        &self,
        token: &BearerToken,
    ) -> Result<ApiResponse, LoadTestError> {
        let req = self
            .http
            .get(self.url(APPLICATIONS_PATH))
            .header(AUTHORIZATION, token.header_value());
        self.send(Method::GET, APPLICATIONS_PATH, req).await
    }

    pub async fn get_application(
        &self,
        token: &BearerToken,
        id: &str,
    ) -> Result<ApiResponse, LoadTestError> {
        let req = self
            .http
            .get(self.url(&format!("{APPLICATIONS_PATH}/{id}")))
            .header(AUTHORIZATION, token.header_value());
        self.send(Method::GET, APPLICATION_DETAIL_NAME, req).await
    }

    /// Send, read the body to the end, and record the whole exchange.
    ///
    /// Reading the body keeps the connection reusable and makes the recorded
    /// latency cover the full response. A body that fails to arrive counts
    /// as a failed request.
    async fn send(
        &self,
        method: Method,
        name: &str,
        req: RequestBuilder,
    ) -> Result<ApiResponse, LoadTestError> {
        let start = Instant::now();
        let result = match req.send().await {
            Ok(resp) => {
                let status = resp.status();
                resp.bytes().await.map(|body| ApiResponse {
                    status,
                    body: body.to_vec(),
                })
            }
            Err(e) => Err(e),
        };
        let elapsed = start.elapsed();

        match result {
            Ok(resp) => {
                debug!(
                    %method,
                    endpoint = name,
                    status = %resp.status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "request complete"
                );
                self.stats
                    .record_request(&method, name, elapsed, Some(resp.status));
                Ok(resp)
            }
            Err(e) => {
                debug!(%method, endpoint = name, error = %e, "request failed");
                self.stats.record_request(&method, name, elapsed, None);
                Err(e.into())
            }
        }
    }
}
