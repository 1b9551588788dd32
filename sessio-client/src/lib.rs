//! Sessio Client - client-side session manager
//!
//! A small stateful facade over an injected HTTP client: it tracks the
//! current user record, offers sign-in/sign-out/update/reload against
//! configurable REST endpoints, exposes role-based authorization checks and
//! can gate route transitions until session state is known.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sessio_client::{HttpConfig, ReqwestHttpClient, SessionClient};
//! use sessio_core::SessionConfig;
//!
//! # async fn example() -> sessio_core::SessioResult<()> {
//! let http = Arc::new(ReqwestHttpClient::new(HttpConfig::default())?);
//! let client = SessionClient::new(SessionConfig::default(), http);
//!
//! client
//!     .sign_in(serde_json::json!({"email": "a@b.com", "password": "secret"}), None)
//!     .await?;
//!
//! if client.has_role(&["admin"], false).await {
//!     // ...
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod guard;
pub mod http;
pub mod store;

pub use client::{Refresh, SessionClient};
pub use guard::{GuardDecision, SessionGuard};
pub use http::{HttpConfig, ReqwestHttpClient};
pub use store::SessionStore;
