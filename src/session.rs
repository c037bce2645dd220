//! Startup authentication.
//!
//! Both accounts log in exactly once, before any simulated user exists. The
//! resulting [`SessionContext`] is the only way to obtain tokens, so a run
//! that cannot authenticate never reaches the task loop.

use tracing::info;

use crate::client::{ApiClient, BearerToken};
use crate::credentials::AccountSet;
use crate::error::LoadTestError;

/// Tokens shared read-only by every simulated user
#[derive(Debug, Clone)]
pub struct SessionContext {
    user_token: BearerToken,
    admin_token: BearerToken,
}

impl SessionContext {
    pub fn new(user_token: BearerToken, admin_token: BearerToken) -> Self {
        Self {
            user_token,
            admin_token,
        }
    }

    pub fn user_token(&self) -> &BearerToken {
        &self.user_token
    }

    /// Fetched at startup but not used by any task yet.
    pub fn admin_token(&self) -> &BearerToken {
        &self.admin_token
    }
}

/// Log in once per account and collect the tokens.
pub async fn bootstrap(
    client: &ApiClient,
    accounts: &AccountSet,
) -> Result<SessionContext, LoadTestError> {
    let user_token = client.authenticate(&accounts.user).await?;
    info!(account = %accounts.user, "user session established");

    let admin_token = client.authenticate(&accounts.admin).await?;
    info!(account = %accounts.admin, "admin session established");

    Ok(SessionContext::new(user_token, admin_token))
}
