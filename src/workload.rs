//! The workload each simulated user runs: two tasks, picked at random.
//!
//! * `login` posts the normal user's credentials and ignores the outcome.
//! * `get_applications` lists applications with the startup user token and
//!   then fetches every listed application by id with the same token.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use strum::{Display, EnumIter};
use tracing::debug;

use crate::client::{ApiClient, APPLICATIONS_PATH};
use crate::credentials::Credentials;
use crate::error::LoadTestError;
use crate::session::SessionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Task {
    Login,
    GetApplications,
}

/// Weighted task table sampled once per iteration
#[derive(Debug, Clone)]
pub struct TaskSet {
    tasks: Vec<Task>,
    index: WeightedIndex<u32>,
}

impl TaskSet {
    pub fn new(weighted: &[(Task, u32)]) -> Result<Self, LoadTestError> {
        let index = WeightedIndex::new(weighted.iter().map(|(_, w)| *w))
            .map_err(|e| LoadTestError::InvalidConfig(format!("task weights: {e}")))?;
        Ok(Self {
            tasks: weighted.iter().map(|(t, _)| *t).collect(),
            index,
        })
    }

    pub fn pick<R: Rng>(&self, rng: &mut R) -> Task {
        self.tasks[self.index.sample(rng)]
    }
}

impl Default for TaskSet {
    fn default() -> Self {
        Self {
            tasks: vec![Task::Login, Task::GetApplications],
            index: WeightedIndex::new([1u32, 1]).expect("two positive weights"),
        }
    }
}

/// Render an application record's `id` for use in a URL path.
///
/// Strings are used verbatim; numbers, `null` and other values use their
/// JSON text. Only a record without an `id` key yields `None`.
pub fn application_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Task bodies bound to a client and an established session
#[derive(Debug, Clone)]
pub struct Workload {
    client: ApiClient,
    session: Arc<SessionContext>,
    credentials: Credentials,
}

impl Workload {
    pub fn new(client: ApiClient, session: Arc<SessionContext>, credentials: Credentials) -> Self {
        Self {
            client,
            session,
            credentials,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn execute(&self, task: Task) -> Result<(), LoadTestError> {
        match task {
            Task::Login => self.login().await,
            Task::GetApplications => self.get_applications().await.map(|_| ()),
        }
    }

    /// Fire-and-forget login. The response is only visible in the stats.
    pub async fn login(&self) -> Result<(), LoadTestError> {
        if let Err(e) = self.client.login(&self.credentials).await {
            debug!(error = %e, "login request failed");
        }
        Ok(())
    }

    /// List applications and fetch each one. Returns the number of detail
    /// requests issued.
    pub async fn get_applications(&self) -> Result<usize, LoadTestError> {
        let token = self.session.user_token();
        let resp = self.client.list_applications(token).await?;

        let json: Value =
            serde_json::from_slice(&resp.body).map_err(|source| LoadTestError::Decode {
                endpoint: APPLICATIONS_PATH,
                source,
            })?;
        let applications = json
            .get("applications")
            .and_then(Value::as_array)
            .ok_or(LoadTestError::MissingField {
                endpoint: APPLICATIONS_PATH,
                field: "applications",
            })?;

        let mut fetched = 0;
        for record in applications {
            let id = application_id(record).ok_or(LoadTestError::MissingField {
                endpoint: APPLICATIONS_PATH,
                field: "id",
            })?;
            if let Err(e) = self.client.get_application(token, &id).await {
                debug!(application = %id, error = %e, "detail request failed");
            }
            fetched += 1;
        }
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;
    use serde_json::json;
    use strum::IntoEnumIterator;

    #[test]
    fn test_task_names() {
        let names: Vec<String> = Task::iter().map(|t| t.to_string()).collect();
        assert_eq!(names, vec!["login", "get_applications"]);
    }

    #[test]
    fn test_default_task_set_is_uniform() {
        let set = TaskSet::default();
        let mut rng = StdRng::seed_from_u64(42);
        let logins = (0..10_000)
            .filter(|_| set.pick(&mut rng) == Task::Login)
            .count();
        // Expect roughly half; the bound is far outside sampling noise.
        assert!((4_500..=5_500).contains(&logins), "{logins} logins");
    }

    #[test]
    fn test_zero_weight_task_never_picked() {
        let set = TaskSet::new(&[(Task::Login, 0), (Task::GetApplications, 3)]).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        assert!((0..1_000).all(|_| set.pick(&mut rng) == Task::GetApplications));
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        let err = TaskSet::new(&[(Task::Login, 0), (Task::GetApplications, 0)]).unwrap_err();
        assert!(matches!(err, LoadTestError::InvalidConfig(_)));
    }

    #[test]
    fn test_same_seed_same_task_sequence() {
        let set = TaskSet::default();
        let mut a = StdRng::seed_from_u64(77);
        let mut b = StdRng::seed_from_u64(77);
        let left: Vec<Task> = (0..64).map(|_| set.pick(&mut a)).collect();
        let right: Vec<Task> = (0..64).map(|_| set.pick(&mut b)).collect();
        assert_eq!(left, right);
    }

    #[rstest]
    #[case(json!({"id": 1}), Some("1"))]
    #[case(json!({"id": "a1b2c3"}), Some("a1b2c3"))]
    #[case(json!({"id": null}), Some("null"))]
    #[case(json!({"name": "x"}), None)]
    fn test_application_id(#[case] record: Value, #[case] expected: Option<&str>) {
        assert_eq!(application_id(&record).as_deref(), expected);
    }
}
