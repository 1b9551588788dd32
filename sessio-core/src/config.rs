//! Session manager configuration
//!
//! Endpoint URLs plus the cache policy deciding whether a route-triggered
//! refresh may skip the network. The configuration surface accepts the
//! wire-level forms `false | true | millis` for the cache policy.

use crate::error::SessioResult;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rule deciding whether a cache-aware refresh may skip the network call.
///
/// Explicit calls to sign-in/sign-out/update/reload never consult this
/// policy; it only applies to resolve-style refreshes at route entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Always hit the network (wire form: `false`)
    #[default]
    Always,
    /// Refresh at most once, then cache forever (wire form: `true`)
    Once,
    /// Refresh only after the duration has elapsed since the last successful
    /// update (wire form: milliseconds)
    MaxAge(Duration),
}

impl CachePolicy {
    /// Whether a refresh is due given the time since the last successful
    /// update (`None` when the session has never been refreshed).
    pub fn should_refresh(&self, elapsed: Option<Duration>) -> bool {
        let Some(elapsed) = elapsed else {
            return true;
        };

        match self {
            CachePolicy::Always => true,
            CachePolicy::Once => false,
            CachePolicy::MaxAge(max_age) => elapsed >= *max_age,
        }
    }
}

impl Serialize for CachePolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CachePolicy::Always => serializer.serialize_bool(false),
            CachePolicy::Once => serializer.serialize_bool(true),
            CachePolicy::MaxAge(d) => {
                // Durations beyond u64 milliseconds saturate instead of wrapping
                let millis = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
                serializer.serialize_u64(millis)
            }
        }
    }
}

impl<'de> Deserialize<'de> for CachePolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Flag(bool),
            Millis(u64),
        }

        match Wire::deserialize(deserializer).map_err(|_| {
            de::Error::custom("cache policy must be a boolean or a duration in milliseconds")
        })? {
            Wire::Flag(false) => Ok(CachePolicy::Always),
            Wire::Flag(true) => Ok(CachePolicy::Once),
            Wire::Millis(ms) => Ok(CachePolicy::MaxAge(Duration::from_millis(ms))),
        }
    }
}

/// Endpoint URLs and cache policy for the session client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sign-in endpoint (POST)
    pub sign_in_url: String,
    /// Sign-out endpoint (POST)
    pub sign_out_url: String,
    /// Session read (GET) and reload-trigger (PUT) endpoint
    pub update_url: String,
    /// Cache suppression policy for route-triggered refreshes
    pub cache_policy: CachePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sign_in_url: "/api/users/sign-in".to_string(),
            sign_out_url: "/api/users/sign-out".to_string(),
            update_url: "/api/session".to_string(),
            cache_policy: CachePolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Apply a partial reconfiguration. Unset fields keep their prior value;
    /// an empty or malformed URL is rejected eagerly with a configuration
    /// error rather than silently ignored.
    pub fn apply(&mut self, update: SessionConfigUpdate) -> SessioResult<()> {
        if let Some(url) = update.sign_in_url {
            validate_url(&url, "sign_in_url")?;
            self.sign_in_url = url;
        }
        if let Some(url) = update.sign_out_url {
            validate_url(&url, "sign_out_url")?;
            self.sign_out_url = url;
        }
        if let Some(url) = update.update_url {
            validate_url(&url, "update_url")?;
            self.update_url = url;
        }
        if let Some(policy) = update.cache_policy {
            self.cache_policy = policy;
        }

        Ok(())
    }
}

/// Partial update for [`SessionConfig`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfigUpdate {
    pub sign_in_url: Option<String>,
    pub sign_out_url: Option<String>,
    pub update_url: Option<String>,
    pub cache_policy: Option<CachePolicy>,
}

impl SessionConfigUpdate {
    pub fn sign_in_url(mut self, url: &str) -> Self {
        self.sign_in_url = Some(url.to_string());
        self
    }

    pub fn sign_out_url(mut self, url: &str) -> Self {
        self.sign_out_url = Some(url.to_string());
        self
    }

    pub fn update_url(mut self, url: &str) -> Self {
        self.update_url = Some(url.to_string());
        self
    }

    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = Some(policy);
        self
    }
}

/// Endpoints may be absolute URLs or server-relative paths.
fn validate_url(value: &str, field: &str) -> SessioResult<()> {
    if value.is_empty() {
        return Err(crate::config_error!(
            format!("{} must not be empty", field),
            "session_config"
        ));
    }

    if value.starts_with('/') || url::Url::parse(value).is_ok() {
        return Ok(());
    }

    Err(crate::config_error!(
        format!("{} is not a valid URL or path: {}", field, value),
        "session_config"
    ))
}
