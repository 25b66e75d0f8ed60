//! Lifecycle vocabulary shared by the orchestrator and its collaborators

use crate::version::VersionToken;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle action requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Install the candidate, replacing only an older installed build
    Activate,
    /// Install the candidate, replacing any installed build of another version
    ForceActivate,
    /// Remove the installed extension
    Deactivate,
}

impl Operation {
    /// Kind of request submitted to the extension service for this operation
    pub fn request_kind(self) -> RequestKind {
        match self {
            Operation::Activate | Operation::ForceActivate => RequestKind::Activation,
            Operation::Deactivate => RequestKind::Deactivation,
        }
    }

    /// Command-line name of the operation
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Activate => "activate",
            Operation::ForceActivate => "forceActivate",
            Operation::Deactivate => "deactivate",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request kinds understood by the extension service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Activation,
    Deactivation,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Activation => f.write_str("activation"),
            RequestKind::Deactivation => f.write_str("deactivation"),
        }
    }
}

/// Terminal success reported by the extension service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The request took effect immediately
    Completed,
    /// The request takes effect after the next reboot
    RequiresReboot,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => f.write_str("completed"),
            Outcome::RequiresReboot => f.write_str("requires reboot"),
        }
    }
}

/// Answer to the service's replacement query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementVerdict {
    Replace,
    Cancel,
}

impl fmt::Display for ReplacementVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementVerdict::Replace => f.write_str("replace"),
            ReplacementVerdict::Cancel => f.write_str("cancel"),
        }
    }
}

/// Properties of an installed or candidate extension build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionProperties {
    /// Extension bundle identifier
    pub identifier: String,

    /// Build version used for replacement decisions
    pub bundle_version: VersionToken,
}

impl ExtensionProperties {
    pub fn new(identifier: impl Into<String>, bundle_version: VersionToken) -> Self {
        Self {
            identifier: identifier.into(),
            bundle_version,
        }
    }
}

/// One submission to the extension service
///
/// The identifier is only used for diagnostics; a request is never reused
/// across operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRequest {
    identifier: String,
    kind: RequestKind,
}

impl ExtensionRequest {
    /// Create an activation request for the given extension
    pub fn activation(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: RequestKind::Activation,
        }
    }

    /// Create a deactivation request for the given extension
    pub fn deactivation(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: RequestKind::Deactivation,
        }
    }

    /// Create the request an operation submits
    pub fn for_operation(identifier: impl Into<String>, operation: Operation) -> Self {
        match operation.request_kind() {
            RequestKind::Activation => Self::activation(identifier),
            RequestKind::Deactivation => Self::deactivation(identifier),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}
