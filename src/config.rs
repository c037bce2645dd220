use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::credentials::AccountSet;
use crate::error::LoadTestError;
use crate::pacing::{WaitTime, DEFAULT_MAX_WAIT_MS, DEFAULT_MIN_WAIT_MS};
use crate::workload::{Task, TaskSet};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "LOADTEST__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub target: TargetConfig,
    pub credentials: AccountSet,
    pub workload: WorkloadConfig,
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    pub min_wait_ms: u64,
    pub max_wait_ms: u64,
    pub login_weight: u32,
    pub get_applications_weight: u32,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            min_wait_ms: DEFAULT_MIN_WAIT_MS,
            max_wait_ms: DEFAULT_MAX_WAIT_MS,
            login_weight: 1,
            get_applications_weight: 1,
        }
    }
}

impl WorkloadConfig {
    pub fn wait_time(&self) -> Result<WaitTime, LoadTestError> {
        WaitTime::new(self.min_wait_ms, self.max_wait_ms)
    }

    pub fn task_set(&self) -> Result<TaskSet, LoadTestError> {
        TaskSet::new(&[
            (Task::Login, self.login_weight),
            (Task::GetApplications, self.get_applications_weight),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of simulated users
    pub users: usize,
    /// Users started per second
    pub spawn_rate: f64,
    /// Stop after this long; `None` runs until a shutdown signal
    pub duration_seconds: Option<u64>,
    /// Fixed seed for task selection and wait sampling
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            users: 10,
            spawn_rate: 1.0,
            duration_seconds: None,
            seed: None,
        }
    }
}

impl RunConfig {
    /// Pause between user spawns. Rates whose interval does not fit a
    /// `Duration` are rejected.
    pub fn spawn_interval(&self) -> Result<Duration, LoadTestError> {
        Duration::try_from_secs_f64(1.0 / self.spawn_rate).map_err(|e| {
            LoadTestError::InvalidConfig(format!(
                "run.spawn_rate {} gives no usable spawn interval: {e}",
                self.spawn_rate
            ))
        })
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_seconds.map(Duration::from_secs)
    }
}

impl Config {
    pub fn load() -> Result<Self, LoadTestError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Defaults, then the TOML file (if present), then `LOADTEST__*` env vars.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, LoadTestError> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), LoadTestError> {
        let invalid = |msg: &str| Err(LoadTestError::InvalidConfig(msg.to_string()));

        let url = &self.target.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return invalid("target.base_url must be an http(s) URL");
        }
        if self.target.timeout_seconds == 0 {
            return invalid("target.timeout_seconds must be positive");
        }
        if !self.credentials.user.is_complete() || !self.credentials.admin.is_complete() {
            return invalid("credentials need a non-empty email and password");
        }
        if self.run.users == 0 {
            return invalid("run.users must be at least 1");
        }
        if !(self.run.spawn_rate.is_finite() && self.run.spawn_rate > 0.0) {
            return invalid("run.spawn_rate must be a positive number");
        }
        self.run.spawn_interval()?;
        if self.run.duration_seconds == Some(0) {
            return invalid("run.duration_seconds must be positive when set");
        }
        self.workload.wait_time()?;
        self.workload.task_set()?;
        Ok(())
    }
}
