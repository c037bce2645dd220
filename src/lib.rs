//! Load-test workload for the application portal.
//!
//! Two fixed accounts log in once at startup; simulated users then
//! alternate at random between re-posting the login and walking the
//! application list, pausing 5–15 seconds between tasks.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod pacing;
pub mod runner;
pub mod session;
pub mod stats;
pub mod telemetry;
pub mod user;
pub mod workload;

pub use client::{ApiClient, BearerToken};
pub use config::Config;
pub use credentials::{AccountSet, Credentials};
pub use error::LoadTestError;
pub use runner::LoadTest;
pub use session::{bootstrap, SessionContext};
pub use stats::{Stats, StatsReport};
pub use workload::{Task, TaskSet, Workload};
