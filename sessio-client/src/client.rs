//! Session client
//!
//! Issues the four session operations against the configured endpoints and
//! writes into the [`SessionStore`] on success. State only ever changes on an
//! explicit success response: a failed refresh of an authenticated session
//! does not sign the user out.

use crate::store::SessionStore;
use sessio_core::{
    HttpClient, HttpResponse, RequestOptions, SessioResult, SessionConfig, SessionConfigUpdate,
    User,
};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};

/// Outcome of a cache-aware refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh {
    /// The cache policy suppressed the network call; prior state stands.
    Cached,
    /// The session was re-fetched from the backend.
    Fetched(HttpResponse),
}

/// Stateful facade over the injected HTTP collaborator.
///
/// All operations take `&self`; the store sits behind a `tokio::sync::RwLock`
/// and refreshes are serialized internally, so the last successful response
/// always wins. Explicit calls to [`sign_in`], [`sign_out`], [`update`] and
/// [`reload`] always hit the network; only [`resolve`] consults the cache
/// policy.
///
/// [`sign_in`]: SessionClient::sign_in
/// [`sign_out`]: SessionClient::sign_out
/// [`update`]: SessionClient::update
/// [`reload`]: SessionClient::reload
/// [`resolve`]: SessionClient::resolve
pub struct SessionClient {
    store: Arc<RwLock<SessionStore>>,
    http: Arc<dyn HttpClient>,
    config: RwLock<SessionConfig>,
    last_update: RwLock<Option<Instant>>,
    // Serializes the update path so concurrent refreshes cannot interleave
    refresh_lock: Mutex<()>,
}

impl SessionClient {
    /// Create a session client with an empty session
    pub fn new(config: SessionConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            store: Arc::new(RwLock::new(SessionStore::new())),
            http,
            config: RwLock::new(config),
            last_update: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Shared handle to the underlying session store
    pub fn store(&self) -> Arc<RwLock<SessionStore>> {
        Arc::clone(&self.store)
    }

    /// Snapshot of the current configuration
    pub async fn config(&self) -> SessionConfig {
        self.config.read().await.clone()
    }

    /// Apply a partial reconfiguration; invalid URLs are rejected eagerly.
    pub async fn configure(&self, update: SessionConfigUpdate) -> SessioResult<()> {
        self.config.write().await.apply(update)
    }

    /// The current user record, if signed in
    pub async fn user(&self) -> Option<User> {
        self.store.read().await.user().cloned()
    }

    /// A single field of the current user record
    pub async fn user_field(&self, field: &str) -> Option<serde_json::Value> {
        self.store.read().await.user_field(field).cloned()
    }

    /// Role-membership check against the current user
    pub async fn has_role<S: AsRef<str>>(&self, roles: &[S], match_all: bool) -> bool {
        self.store.read().await.has_role(roles, match_all)
    }

    /// Sign a user in.
    ///
    /// Clears the current user eagerly, then POSTs the credentials to the
    /// sign-in endpoint. When the success response carries a body it is
    /// stored as the user record directly; a bodiless success (e.g. 204)
    /// falls back to one [`update`] so a successful sign-in always yields a
    /// user record. In the fallback case the returned response is the one
    /// from the follow-up GET. On failure the error propagates and the user
    /// stays absent.
    ///
    /// [`update`]: SessionClient::update
    pub async fn sign_in(
        &self,
        credentials: serde_json::Value,
        options: Option<RequestOptions>,
    ) -> SessioResult<HttpResponse> {
        self.store.write().await.clear_user();

        let url = self.config.read().await.sign_in_url.clone();
        debug!("Signing in via {}", url);

        let response = self
            .http
            .post(&url, Some(&credentials), &options.clone().unwrap_or_default())
            .await
            .inspect_err(|e| e.log())?;

        match response.data.clone().filter(|d| !d.is_null()) {
            Some(user) => {
                self.apply_user(user).await;
                info!("Signed in (status {})", response.status);
                Ok(response)
            }
            None => {
                // Backend did not echo the user record; fetch it
                debug!("Sign-in response had no body, fetching session");
                self.update(options).await
            }
        }
    }

    /// Sign the user out.
    ///
    /// POSTs to the sign-out endpoint; on success the user record is
    /// cleared. On failure state is left untouched and the error propagates.
    pub async fn sign_out(
        &self,
        data: Option<serde_json::Value>,
        options: Option<RequestOptions>,
    ) -> SessioResult<HttpResponse> {
        let url = self.config.read().await.sign_out_url.clone();
        debug!("Signing out via {}", url);

        let response = self
            .http
            .post(&url, data.as_ref(), &options.unwrap_or_default())
            .await
            .inspect_err(|e| e.log())?;

        self.store.write().await.clear_user();
        info!("Signed out (status {})", response.status);

        Ok(response)
    }

    /// Refresh the session user record from the backend.
    ///
    /// GETs the update endpoint; on success the response body replaces the
    /// user record and the last-update instant is recorded. A failed refresh
    /// leaves prior state untouched.
    pub async fn update(&self, options: Option<RequestOptions>) -> SessioResult<HttpResponse> {
        let _guard = self.refresh_lock.lock().await;
        self.update_inner(options).await
    }

    /// Ask the backend to recompute session data, then refresh.
    ///
    /// PUTs to the update endpoint and on success performs the same work as
    /// [`update`]. A failed PUT propagates without the follow-up GET.
    ///
    /// [`update`]: SessionClient::update
    pub async fn reload(
        &self,
        data: Option<serde_json::Value>,
        options: Option<RequestOptions>,
    ) -> SessioResult<HttpResponse> {
        let url = self.config.read().await.update_url.clone();
        debug!("Requesting session reload via {}", url);

        self.http
            .put(&url, data.as_ref(), &options.clone().unwrap_or_default())
            .await
            .inspect_err(|e| e.log())?;

        self.update(options).await
    }

    /// Cache-aware refresh for route entry.
    ///
    /// Skips the network call when the cache policy says the last successful
    /// update is still fresh; otherwise performs an [`update`]. Route guards
    /// should treat an error as "not authenticated".
    ///
    /// [`update`]: SessionClient::update
    pub async fn resolve(&self, options: Option<RequestOptions>) -> SessioResult<Refresh> {
        let _guard = self.refresh_lock.lock().await;

        let policy = self.config.read().await.cache_policy;
        let elapsed = self.last_update.read().await.map(|at| at.elapsed());

        if !policy.should_refresh(elapsed) {
            debug!("Session still fresh, skipping refresh");
            return Ok(Refresh::Cached);
        }

        self.update_inner(options).await.map(Refresh::Fetched)
    }

    async fn update_inner(&self, options: Option<RequestOptions>) -> SessioResult<HttpResponse> {
        let url = self.config.read().await.update_url.clone();
        debug!("Refreshing session from {}", url);

        let response = self
            .http
            .get(&url, &options.unwrap_or_default())
            .await
            .inspect_err(|e| e.log())?;

        let user = response.data.clone().unwrap_or(serde_json::Value::Null);
        self.apply_user(user).await;
        debug!("Session refreshed (status {})", response.status);

        Ok(response)
    }

    async fn apply_user(&self, user: User) {
        self.store.write().await.set_user(user);
        *self.last_update.write().await = Some(Instant::now());
    }
}
