//! Think time between a simulated user's tasks.

use rand::Rng;
use std::time::Duration;

use crate::error::LoadTestError;

pub const DEFAULT_MIN_WAIT_MS: u64 = 5_000;
pub const DEFAULT_MAX_WAIT_MS: u64 = 15_000;

/// Inclusive millisecond bound the pause between tasks is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTime {
    min_ms: u64,
    max_ms: u64,
}

impl WaitTime {
    pub fn new(min_ms: u64, max_ms: u64) -> Result<Self, LoadTestError> {
        if min_ms > max_ms {
            return Err(LoadTestError::InvalidConfig(format!(
                "min wait {min_ms}ms exceeds max wait {max_ms}ms"
            )));
        }
        Ok(Self { min_ms, max_ms })
    }

    pub fn min_ms(&self) -> u64 {
        self.min_ms
    }

    pub fn max_ms(&self) -> u64 {
        self.max_ms
    }

    /// Uniform sample over `[min_ms, max_ms]`
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

impl Default for WaitTime {
    fn default() -> Self {
        Self {
            min_ms: DEFAULT_MIN_WAIT_MS,
            max_ms: DEFAULT_MAX_WAIT_MS,
        }
    }
}
