//! Sessio Core - shared types, errors and the HTTP seam
//!
//! This crate defines the foundation the session manager is built on: the
//! structured error type, configuration surface, logging setup and the
//! `HttpClient` trait that transports implement.

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tracing;
