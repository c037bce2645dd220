use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::pacing::WaitTime;
use crate::workload::{TaskSet, Workload};

/// One independently scheduled user: pick a task, run it, wait, repeat.
pub struct SimulatedUser {
    id: usize,
    workload: Workload,
    tasks: Arc<TaskSet>,
    wait: WaitTime,
    rng: StdRng,
}

impl SimulatedUser {
    /// `seed` is the run seed; each user offsets it by its id so users do
    /// not share a sequence.
    pub fn new(
        id: usize,
        workload: Workload,
        tasks: Arc<TaskSet>,
        wait: WaitTime,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => StdRng::from_entropy(),
        };
        Self {
            id,
            workload,
            tasks,
            wait,
            rng,
        }
    }

    /// Run until `cancel` fires. Returns the number of completed iterations.
    pub async fn run(mut self, cancel: CancellationToken) -> u64 {
        debug!(user = self.id, "user started");
        let mut iterations = 0;

        loop {
            let task = self.tasks.pick(&mut self.rng);
            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                r = self.workload.execute(task) => r,
            };
            if let Err(e) = &result {
                warn!(user = self.id, %task, error = %e, "task failed");
            }
            self.workload.client().stats().record_task(task, &result);
            iterations += 1;

            let pause = self.wait.sample(&mut self.rng);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        debug!(user = self.id, iterations, "user stopped");
        iterations
    }
}
