//! Session store
//!
//! In-memory key/value state for the current principal, including the
//! reserved `user` slot and the role-membership predicate. The store does no
//! I/O; the session client writes into it on successful backend responses.

use sessio_core::User;
use std::collections::HashMap;

/// Reserved session key holding the current user record.
pub const USER_KEY: &str = "user";

/// Mutable key/value session state with typed access to the user record.
///
/// The user slot is either absent or a complete record from the most recent
/// successful backend response; it is never partially overwritten. A stored
/// JSON `null` counts as absent.
#[derive(Debug, Default)]
pub struct SessionStore {
    values: HashMap<String, serde_json::Value>,
}

impl SessionStore {
    /// Create an empty session store
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a value from the session
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Set a value in the session
    pub fn set(&mut self, key: &str, value: serde_json::Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Delete a value from the session, returning it if present
    pub fn del(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    /// The current user record, if signed in
    pub fn user(&self) -> Option<&User> {
        self.values.get(USER_KEY).filter(|v| !v.is_null())
    }

    /// A single field of the current user record
    pub fn user_field(&self, field: &str) -> Option<&serde_json::Value> {
        self.user().and_then(|user| user.get(field))
    }

    /// Replace the user record wholesale
    pub fn set_user(&mut self, user: User) {
        self.values.insert(USER_KEY.to_string(), user);
    }

    /// Clear the user record (sign-out)
    pub fn clear_user(&mut self) {
        self.values.remove(USER_KEY);
    }

    /// Whether a user record is present
    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// Check role membership against the user's `roles` field.
    ///
    /// Both the stored and the queried roles may be a bare string or a list
    /// of strings. Returns false when the user has no roles. With `match_all`
    /// every queried role must be present; otherwise one match suffices.
    /// Matching is exact and case-sensitive, and order never matters. A
    /// duplicate queried role counts once per occurrence.
    pub fn has_role<S: AsRef<str>>(&self, roles: &[S], match_all: bool) -> bool {
        let stored = match self.user_field("roles").map(normalize_roles) {
            Some(stored) if !stored.is_empty() => stored,
            _ => return false,
        };

        let matched = roles
            .iter()
            .filter(|role| stored.iter().any(|s| s == role.as_ref()))
            .count();

        if match_all {
            matched == roles.len()
        } else {
            matched > 0
        }
    }
}

/// Normalize a roles value into a list: a bare string becomes a one-element
/// list, non-string entries are dropped.
fn normalize_roles(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::String(role) => vec![role.clone()],
        serde_json::Value::Array(roles) => roles
            .iter()
            .filter_map(|r| r.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}
