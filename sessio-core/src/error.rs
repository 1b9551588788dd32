//! Unified error handling
//!
//! Provides structured error types with context and proper error chaining.
//! The session manager never wraps a transport failure into something the
//! caller cannot inspect: HTTP status and response body survive unmodified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type SessioResult<T> = Result<T, SessioError>;

/// Error context providing additional information for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the session manager
#[derive(Error, Debug)]
pub enum SessioError {
    /// The backend answered with a non-success status. Status and body are
    /// kept exactly as received so callers can branch on them.
    #[error("Transport error: HTTP {status}: {message}")]
    Transport {
        status: u16,
        body: Option<serde_json::Value>,
        message: String,
        context: ErrorContext,
    },

    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl SessioError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            SessioError::Transport { context, .. } => Some(context),
            SessioError::Network { context, .. } => Some(context),
            SessioError::Config { context, .. } => Some(context),
            SessioError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// HTTP status carried by a transport error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SessioError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body carried by a transport error, if any
    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            SessioError::Transport { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Whether this failure came from the HTTP collaborator
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SessioError::Transport { .. } | SessioError::Network { .. }
        )
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            SessioError::Transport { .. } | SessioError::Network { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Transport failure"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macro for configuration errors
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::SessioError::Config {
            message: $msg.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the configured endpoint URLs"),
        }
    };
}
