//! Spawns simulated users and drives them until the run ends.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::config::{Config, RunConfig};
use crate::error::LoadTestError;
use crate::pacing::WaitTime;
use crate::session::SessionContext;
use crate::stats::StatsReport;
use crate::user::SimulatedUser;
use crate::workload::{TaskSet, Workload};

pub struct LoadTest {
    workload: Workload,
    tasks: Arc<TaskSet>,
    wait: WaitTime,
    spawn_interval: Duration,
    run: RunConfig,
}

impl LoadTest {
    /// Requires an established session, so no user can start without tokens.
    pub fn new(
        client: ApiClient,
        session: SessionContext,
        cfg: &Config,
    ) -> Result<Self, LoadTestError> {
        let workload = Workload::new(
            client,
            Arc::new(session),
            cfg.credentials.user.clone(),
        );
        Ok(Self {
            workload,
            tasks: Arc::new(cfg.workload.task_set()?),
            wait: cfg.workload.wait_time()?,
            spawn_interval: cfg.run.spawn_interval()?,
            run: cfg.run.clone(),
        })
    }

    /// Spawn users at the configured rate and wait for them to stop.
    ///
    /// The run ends when `cancel` fires or the configured duration elapses,
    /// whichever comes first.
    pub async fn run(self, cancel: CancellationToken) -> StatsReport {
        self.workload.client().stats().restart_clock();

        if let Some(duration) = self.run.duration() {
            let timer = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {
                        info!(seconds = duration.as_secs(), "run duration reached");
                        timer.cancel();
                    }
                    _ = timer.cancelled() => {}
                }
            });
        }

        info!(
            users = self.run.users,
            spawn_rate = self.run.spawn_rate,
            min_wait_ms = self.wait.min_ms(),
            max_wait_ms = self.wait.max_ms(),
            seed = ?self.run.seed,
            "starting load test"
        );

        let interval = self.spawn_interval;
        let mut users = JoinSet::new();
        for id in 0..self.run.users {
            if id > 0 {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            if cancel.is_cancelled() {
                break;
            }
            let user = SimulatedUser::new(
                id,
                self.workload.clone(),
                Arc::clone(&self.tasks),
                self.wait,
                self.run.seed,
            );
            users.spawn(user.run(cancel.child_token()));
        }
        info!(spawned = users.len(), "users spawned");

        let mut iterations = 0u64;
        while let Some(joined) = users.join_next().await {
            match joined {
                Ok(n) => iterations += n,
                Err(e) => warn!(error = %e, "user task aborted"),
            }
        }
        info!(iterations, "load test finished");

        self.workload.client().stats().report()
    }
}
