use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysext_core::{Operation, Outcome, VersionToken};

use crate::policy::DecisionReason;

/// Extension lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// An activation request was submitted
    ActivationRequested { forced: bool },

    /// A deactivation request was submitted
    DeactivationRequested,

    /// The service is waiting for the user to approve the request
    UserApprovalRequired,

    /// The installed build will be replaced by the candidate
    WillReplace {
        from: VersionToken,
        to: VersionToken,
        forced: bool,
    },

    /// The installed build is kept
    ReplacingCanceled {
        installed: VersionToken,
        candidate: VersionToken,
        reason: DecisionReason,
    },

    /// The request finished successfully
    RequestFinished { outcome: Outcome },

    /// The finished request only takes effect after a reboot
    RebootRequired,

    /// The request failed; `suppressed` failures are reported as success
    RequestFailed { error: String, suppressed: bool },
}

impl LifecycleEvent {
    /// Human readable description of the event for the given extension
    pub fn message(&self, identifier: &str) -> String {
        match self {
            LifecycleEvent::ActivationRequested { forced: false } => {
                format!("activation of {} is requested", identifier)
            }
            LifecycleEvent::ActivationRequested { forced: true } => {
                format!("forced activation of {} is requested", identifier)
            }
            LifecycleEvent::DeactivationRequested => {
                format!("deactivation of {} is requested", identifier)
            }
            LifecycleEvent::UserApprovalRequired => {
                format!("request of {} requires user approval", identifier)
            }
            LifecycleEvent::WillReplace {
                from,
                to,
                forced: false,
            } => format!("{} will be replaced to {} from {}", identifier, to, from),
            LifecycleEvent::WillReplace {
                from,
                to,
                forced: true,
            } => format!(
                "{} will be force replaced to {} from {}",
                identifier, to, from
            ),
            LifecycleEvent::ReplacingCanceled {
                installed, reason, ..
            } => format!(
                "replacing {} is canceled: {} ({})",
                identifier, reason, installed
            ),
            LifecycleEvent::RequestFinished { outcome } => {
                format!("request of {} is finished ({})", identifier, outcome)
            }
            LifecycleEvent::RebootRequired => {
                format!("request of {} requires reboot", identifier)
            }
            LifecycleEvent::RequestFailed {
                error,
                suppressed: false,
            } => format!("request of {} is failed with error: {}", identifier, error),
            LifecycleEvent::RequestFailed {
                error,
                suppressed: true,
            } => format!(
                "request of {} is failed with ignorable error: {}",
                identifier, error
            ),
        }
    }
}

/// Event metadata envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID (UUID v4)
    pub event_id: String,

    /// Event timestamp (UTC)
    pub timestamp: DateTime<Utc>,

    /// Extension identifier of the request
    pub identifier: String,

    /// Operation being orchestrated
    pub operation: Operation,

    /// The actual event payload
    pub event: LifecycleEvent,
}

impl EventEnvelope {
    pub fn new(identifier: impl Into<String>, operation: Operation, event: LifecycleEvent) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            identifier: identifier.into(),
            operation,
            event,
        }
    }

    /// Human readable description of the wrapped event
    pub fn message(&self) -> String {
        self.event.message(&self.identifier)
    }
}
