//! Request and task statistics collected during a run.
//!
//! Every request issued by the workload is recorded under a `(method, name)`
//! key. Detail requests share one name so the report does not grow with the
//! number of applications on the server. A request counts as failed when it
//! never got a response or the response status was not 2xx.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::LoadTestError;
use crate::workload::Task;

#[derive(Debug, Default, Clone)]
struct EndpointStats {
    requests: u64,
    failures: u64,
    total_ms: u64,
    min_ms: Option<u64>,
    max_ms: u64,
    statuses: BTreeMap<u16, u64>,
}

#[derive(Debug, Default, Clone)]
struct TaskStats {
    runs: u64,
    failures: u64,
    last_error: Option<String>,
}

#[derive(Debug)]
struct StatsInner {
    started_at: DateTime<Utc>,
    endpoints: BTreeMap<(String, String), EndpointStats>,
    tasks: BTreeMap<String, TaskStats>,
}

/// Shared, cloneable statistics sink
#[derive(Debug, Clone)]
pub struct Stats {
    inner: Arc<Mutex<StatsInner>>,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StatsInner {
                started_at: Utc::now(),
                endpoints: BTreeMap::new(),
                tasks: BTreeMap::new(),
            })),
        }
    }

    /// Start the elapsed-time clock over, e.g. once startup logins are done.
    pub fn restart_clock(&self) {
        self.inner.lock().started_at = Utc::now();
    }

    /// Record one request. `status` is `None` when no response arrived.
    pub fn record_request(
        &self,
        method: &Method,
        name: &str,
        elapsed: Duration,
        status: Option<StatusCode>,
    ) {
        let ms = elapsed.as_millis() as u64;
        let mut inner = self.inner.lock();
        let entry = inner
            .endpoints
            .entry((method.to_string(), name.to_string()))
            .or_default();

        entry.requests += 1;
        entry.total_ms += ms;
        entry.min_ms = Some(entry.min_ms.map_or(ms, |m| m.min(ms)));
        entry.max_ms = entry.max_ms.max(ms);

        match status {
            Some(code) => {
                *entry.statuses.entry(code.as_u16()).or_default() += 1;
                if !code.is_success() {
                    entry.failures += 1;
                }
            }
            None => entry.failures += 1,
        }
    }

    pub fn record_task(&self, task: Task, result: &Result<(), LoadTestError>) {
        let mut inner = self.inner.lock();
        let entry = inner.tasks.entry(task.to_string()).or_default();
        entry.runs += 1;
        if let Err(e) = result {
            entry.failures += 1;
            entry.last_error = Some(e.to_string());
        }
    }

    pub fn report(&self) -> StatsReport {
        let inner = self.inner.lock();
        let elapsed = Utc::now() - inner.started_at;

        let endpoints: Vec<EndpointReport> = inner
            .endpoints
            .iter()
            .map(|((method, name), s)| EndpointReport {
                method: method.clone(),
                name: name.clone(),
                requests: s.requests,
                failures: s.failures,
                min_ms: s.min_ms.unwrap_or(0),
                max_ms: s.max_ms,
                mean_ms: if s.requests == 0 {
                    0.0
                } else {
                    s.total_ms as f64 / s.requests as f64
                },
                statuses: s.statuses.clone(),
            })
            .collect();

        let tasks = inner
            .tasks
            .iter()
            .map(|(task, s)| TaskReport {
                task: task.clone(),
                runs: s.runs,
                failures: s.failures,
                last_error: s.last_error.clone(),
            })
            .collect();

        StatsReport {
            started_at: inner.started_at,
            elapsed_seconds: elapsed.num_milliseconds() as f64 / 1000.0,
            total_requests: endpoints.iter().map(|e| e.requests).sum(),
            total_failures: endpoints.iter().map(|e| e.failures).sum(),
            endpoints,
            tasks,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport {
    pub method: String,
    pub name: String,
    pub requests: u64,
    pub failures: u64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub mean_ms: f64,
    pub statuses: BTreeMap<u16, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub task: String,
    pub runs: u64,
    pub failures: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Snapshot of a run's statistics
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_seconds: f64,
    pub total_requests: u64,
    pub total_failures: u64,
    pub endpoints: Vec<EndpointReport>,
    pub tasks: Vec<TaskReport>,
}

impl StatsReport {
    pub fn endpoint(&self, method: &Method, name: &str) -> Option<&EndpointReport> {
        self.endpoints
            .iter()
            .find(|e| e.method == method.as_str() && e.name == name)
    }

    pub fn task(&self, task: Task) -> Option<&TaskReport> {
        let name = task.to_string();
        self.tasks.iter().find(|t| t.task == name)
    }

    pub fn log(&self) {
        for e in &self.endpoints {
            info!(
                method = %e.method,
                endpoint = %e.name,
                requests = e.requests,
                failures = e.failures,
                min_ms = e.min_ms,
                max_ms = e.max_ms,
                mean_ms = e.mean_ms,
                "endpoint summary"
            );
        }
        for t in &self.tasks {
            if t.failures > 0 {
                warn!(
                    task = %t.task,
                    runs = t.runs,
                    failures = t.failures,
                    last_error = ?t.last_error,
                    "task summary"
                );
            } else {
                info!(task = %t.task, runs = t.runs, "task summary");
            }
        }
        info!(
            requests = self.total_requests,
            failures = self.total_failures,
            elapsed_seconds = self.elapsed_seconds,
            "run summary"
        );
    }
}
