//! Fixed accounts the workload authenticates as.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Login payload posted to the auth endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Seeded non-admin account
    pub fn normal_user() -> Self {
        Self::new("normal@ucla.edu", "test1234")
    }

    /// Seeded admin account
    pub fn admin() -> Self {
        Self::new("admin@ucla.edu", "test1234")
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

// Never print the password
impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Both credential pairs used by a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSet {
    pub user: Credentials,
    pub admin: Credentials,
}

impl Default for AccountSet {
    fn default() -> Self {
        Self {
            user: Credentials::normal_user(),
            admin: Credentials::admin(),
        }
    }
}
