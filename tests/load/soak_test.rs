#![cfg(test)]
//! Soak test for the simulated-user driver.
//!
//! Runs many users with short waits against a mock portal and checks that:
//! - no request fails when the server is healthy
//! - every user contributes traffic
//! - the report's request counts never exceed what the server saw

use std::time::{Duration, Instant};

use portal_loadtest::client::{APPLICATIONS_PATH, APPLICATION_DETAIL_NAME};
use portal_loadtest::config::{Config, RunConfig, WorkloadConfig};
use portal_loadtest::{bootstrap, LoadTest};
use reqwest::Method;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, mount_login};

const USERS: usize = 50;

/// Test: 50 users for 10 seconds with 50-150ms think time
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Ignore by default as this is a slow test
async fn test_fifty_users_sustained() {
    let server = MockServer::start().await;
    mount_login(&server, "normal@ucla.edu", "abc123").await;
    mount_login(&server, "admin@ucla.edu", "admin456").await;

    let applications: Vec<_> = (0..10).map(|i| json!({ "id": i })).collect();
    Mock::given(method("GET"))
        .and(path(APPLICATIONS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "applications": applications }))
                .set_delay(Duration::from_millis(5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/app/api/v1/application/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "application": {} })))
        .mount(&server)
        .await;

    let mut cfg = Config::default();
    cfg.target.base_url = server.uri();
    cfg.workload = WorkloadConfig {
        min_wait_ms: 50,
        max_wait_ms: 150,
        ..Default::default()
    };
    cfg.run = RunConfig {
        users: USERS,
        spawn_rate: 25.0,
        duration_seconds: Some(10),
        seed: Some(2024),
    };

    let client = client_for(&server);
    let session = bootstrap(&client, &cfg.credentials).await.unwrap();

    let start = Instant::now();
    let report = LoadTest::new(client, session, &cfg)
        .unwrap()
        .run(CancellationToken::new())
        .await;
    let elapsed = start.elapsed();

    println!("Soak run finished in {:?}", elapsed);
    println!("{}", serde_json::to_string_pretty(&report).unwrap());

    assert!(elapsed < Duration::from_secs(15), "run overshot its duration");
    assert_eq!(report.total_failures, 0);

    let task_runs: u64 = report.tasks.iter().map(|t| t.runs).sum();
    assert!(task_runs >= USERS as u64);

    let received = server.received_requests().await.unwrap().len() as u64;
    assert!(report.total_requests <= received - 2);

    let detail = report.endpoint(&Method::GET, APPLICATION_DETAIL_NAME).unwrap();
    let list = report.endpoint(&Method::GET, APPLICATIONS_PATH).unwrap();
    assert!(detail.requests <= list.requests * 10);
    assert!(detail.mean_ms < 1_000.0);
}
