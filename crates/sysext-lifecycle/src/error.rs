//! Error types for extension lifecycle operations

use thiserror::Error;

/// Failures reported by the extension management service
///
/// Only `ExtensionNotFound` is interpreted by orchestration logic; every
/// other variant is carried to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service has no extension with the requested identifier
    #[error("extension not found")]
    ExtensionNotFound,

    /// The user has not authorized the operation
    #[error("authorization required")]
    AuthorizationRequired,

    /// The request was canceled by the service
    #[error("request canceled")]
    RequestCanceled,

    /// Any other rejection, with the service's own description
    #[error("{message}")]
    Rejected { message: String },
}

impl ServiceError {
    /// Create a rejection with an opaque message
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Check if the service reported a missing extension
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::ExtensionNotFound)
    }
}

/// Errors surfaced by `LifecycleOrchestrator::perform`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The service rejected or failed the request
    #[error("{0}")]
    Submission(#[from] ServiceError),

    /// The orchestrator or service could not be built from configuration
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl LifecycleError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The service error behind a submission failure
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            LifecycleError::Submission(err) => Some(err),
            LifecycleError::Config { .. } => None,
        }
    }
}

impl From<sysext_core::Error> for LifecycleError {
    fn from(err: sysext_core::Error) -> Self {
        Self::config(err.to_string())
    }
}
