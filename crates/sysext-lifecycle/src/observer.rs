//! Lifecycle observation and logging
//!
//! This module provides the `LifecycleObserver` trait for following an
//! orchestration as it progresses and a `TracingObserver` implementation that
//! logs using the `tracing` crate.

use crate::events::{EventEnvelope, LifecycleEvent};
use std::sync::{Arc, Mutex};

/// Observer trait for lifecycle events
///
/// Called synchronously from service callbacks, so implementations must not
/// block.
pub trait LifecycleObserver: Send + Sync {
    /// Called once per lifecycle event, in the order events occur
    fn on_event(&self, envelope: &EventEnvelope);
}

/// A no-op observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl LifecycleObserver for NoOpObserver {
    fn on_event(&self, _envelope: &EventEnvelope) {}
}

/// An observer that logs lifecycle events using the `tracing` crate
///
/// # Log Levels
///
/// - requests and successful completion: INFO
/// - approval, reboot and canceled replacement notices: WARN
/// - replacement: INFO
/// - surfaced failures: ERROR
/// - suppressed failures: DEBUG
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LifecycleObserver for TracingObserver {
    fn on_event(&self, envelope: &EventEnvelope) {
        let message = envelope.message();
        let identifier = envelope.identifier.as_str();
        let operation = envelope.operation.as_str();

        match &envelope.event {
            LifecycleEvent::ActivationRequested { .. }
            | LifecycleEvent::DeactivationRequested
            | LifecycleEvent::WillReplace { .. }
            | LifecycleEvent::RequestFinished { .. } => {
                tracing::info!(identifier, operation, "{}", message);
            }
            LifecycleEvent::UserApprovalRequired
            | LifecycleEvent::RebootRequired
            | LifecycleEvent::ReplacingCanceled { .. } => {
                tracing::warn!(identifier, operation, "{}", message);
            }
            LifecycleEvent::RequestFailed {
                suppressed: true, ..
            } => {
                tracing::debug!(identifier, operation, "{}", message);
            }
            LifecycleEvent::RequestFailed { .. } => {
                tracing::error!(identifier, operation, "{}", message);
            }
        }
    }
}

/// An observer that records every envelope it receives
///
/// Useful for front-ends that render a log and for tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    envelopes: Mutex<Vec<EventEnvelope>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded envelopes
    pub fn envelopes(&self) -> Vec<EventEnvelope> {
        self.envelopes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Snapshot of the recorded events without their envelopes
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.envelopes().into_iter().map(|e| e.event).collect()
    }
}

impl LifecycleObserver for RecordingObserver {
    fn on_event(&self, envelope: &EventEnvelope) {
        self.envelopes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(envelope.clone());
    }
}

/// Forwards every event to each observer in turn
impl LifecycleObserver for Vec<Arc<dyn LifecycleObserver>> {
    fn on_event(&self, envelope: &EventEnvelope) {
        for observer in self {
            observer.on_event(envelope);
        }
    }
}

impl<T: LifecycleObserver + ?Sized> LifecycleObserver for Arc<T> {
    fn on_event(&self, envelope: &EventEnvelope) {
        (**self).on_event(envelope)
    }
}

impl<T: LifecycleObserver + ?Sized> LifecycleObserver for Box<T> {
    fn on_event(&self, envelope: &EventEnvelope) {
        (**self).on_event(envelope)
    }
}
