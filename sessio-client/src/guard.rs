//! Route guard
//!
//! Explicit guard interface for host routers: run the cache-aware refresh
//! before activating a protected route and report whether navigation should
//! proceed. Any refresh failure is treated as "not authenticated". The guard
//! never redirects; that policy belongs to the host application.

use crate::client::SessionClient;
use std::sync::Arc;
use tracing::debug;

/// Whether a guarded navigation should proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Deny,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Gate route transitions on known session state
pub struct SessionGuard {
    client: Arc<SessionClient>,
}

impl SessionGuard {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }

    /// Refresh the session (cache-aware) and allow navigation only when a
    /// user record is present afterwards.
    pub async fn authorize(&self) -> GuardDecision {
        if let Err(e) = self.client.resolve(None).await {
            debug!("Guard refresh failed, denying navigation: {}", e);
            return GuardDecision::Deny;
        }

        if self.client.store().read().await.is_authenticated() {
            GuardDecision::Allow
        } else {
            GuardDecision::Deny
        }
    }

    /// Like [`authorize`], additionally requiring role membership.
    ///
    /// [`authorize`]: SessionGuard::authorize
    pub async fn authorize_roles<S: AsRef<str>>(
        &self,
        roles: &[S],
        match_all: bool,
    ) -> GuardDecision {
        if !self.authorize().await.is_allowed() {
            return GuardDecision::Deny;
        }

        if self.client.has_role(roles, match_all).await {
            GuardDecision::Allow
        } else {
            GuardDecision::Deny
        }
    }
}
