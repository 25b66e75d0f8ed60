//! Lifecycle orchestration
//!
//! A `LifecycleOrchestrator` drives exactly one operation against an
//! extension service and turns the service's callbacks into a single awaited
//! result. `perform` consumes the orchestrator, so an instance can never run
//! two operations.
//!
//! Per request the handler moves `Submitted -> Finished | Failed`. Approval
//! notices and replacement queries keep it in `Submitted`. Terminal callbacks
//! after the first are logged and ignored.

use crate::error::{LifecycleError, ServiceError};
use crate::events::{EventEnvelope, LifecycleEvent};
use crate::observer::{LifecycleObserver, TracingObserver};
use crate::policy::ReplacementPolicy;
use crate::service::{ExtensionService, RequestDelegate};
use std::sync::{Arc, Mutex};
use sysext_core::{
    ExtensionProperties, ExtensionRequest, Operation, Outcome, ReplacementVerdict, ResultLatch,
    SysextConfig,
};

/// Map a terminal service failure to the result of `operation`
///
/// Deactivating an extension that is not installed leaves the system in the
/// requested state, so it counts as completed.
pub fn resolve_failure(
    operation: Operation,
    error: ServiceError,
) -> Result<Outcome, LifecycleError> {
    match (operation, &error) {
        (Operation::Deactivate, ServiceError::ExtensionNotFound) => Ok(Outcome::Completed),
        _ => Err(LifecycleError::Submission(error)),
    }
}

/// Drives one lifecycle operation to completion
pub struct LifecycleOrchestrator {
    service: Arc<dyn ExtensionService>,
    identifier: String,
    policy: ReplacementPolicy,
    observer: Arc<dyn LifecycleObserver>,
}

impl LifecycleOrchestrator {
    /// Create an orchestrator for the extension `identifier`
    ///
    /// Uses the default replacement policy and logs through `TracingObserver`.
    pub fn new(service: Arc<dyn ExtensionService>, identifier: impl Into<String>) -> Self {
        Self {
            service,
            identifier: identifier.into(),
            policy: ReplacementPolicy::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Create an orchestrator from loaded configuration
    pub fn from_config(service: Arc<dyn ExtensionService>, config: &SysextConfig) -> Self {
        Self::new(service, config.extension.identifier.clone())
            .with_policy(ReplacementPolicy::new(config.policy.replace_supported))
    }

    /// Set the replacement policy
    pub fn with_policy(mut self, policy: ReplacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the observer
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Extension identifier this orchestrator submits requests for
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Submit `operation` and wait for its terminal result
    ///
    /// No timeout is applied and the request cannot be revoked once
    /// submitted. Failures are not retried.
    pub async fn perform(self, operation: Operation) -> Result<Outcome, LifecycleError> {
        let request = ExtensionRequest::for_operation(self.identifier.clone(), operation);
        let handler = Arc::new(RequestHandler {
            operation,
            policy: self.policy,
            observer: self.observer,
            identifier: self.identifier,
            state: Mutex::new(RequestState::Submitted),
            latch: ResultLatch::new(),
        });

        handler.emit(match operation {
            Operation::Activate => LifecycleEvent::ActivationRequested { forced: false },
            Operation::ForceActivate => LifecycleEvent::ActivationRequested { forced: true },
            Operation::Deactivate => LifecycleEvent::DeactivationRequested,
        });

        let delegate: Arc<dyn RequestDelegate> = handler.clone();
        if let Err(err) = self.service.submit(request.clone(), delegate) {
            tracing::debug!(
                identifier = request.identifier(),
                "service rejected {} request on submission",
                request.kind()
            );
            handler.request_failed(&request, err);
        }

        handler.latch.wait().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestState {
    Submitted,
    Finished,
    Failed,
}

/// Receives service callbacks for one request and resolves its latch
struct RequestHandler {
    operation: Operation,
    identifier: String,
    policy: ReplacementPolicy,
    observer: Arc<dyn LifecycleObserver>,
    state: Mutex<RequestState>,
    latch: ResultLatch<Outcome, LifecycleError>,
}

impl RequestHandler {
    fn emit(&self, event: LifecycleEvent) {
        self.observer
            .on_event(&EventEnvelope::new(&self.identifier, self.operation, event));
    }

    /// Move from `Submitted` to a terminal state; false if already terminal
    fn transition(&self, next: RequestState) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state != RequestState::Submitted {
            tracing::warn!(
                identifier = %self.identifier,
                state = ?*state,
                "ignoring terminal callback for a request that already ended"
            );
            return false;
        }
        *state = next;
        true
    }

    fn is_terminal(&self) -> bool {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) != RequestState::Submitted
    }
}

impl RequestDelegate for RequestHandler {
    fn request_needs_user_approval(&self, _request: &ExtensionRequest) {
        self.emit(LifecycleEvent::UserApprovalRequired);
    }

    fn replacement_action(
        &self,
        _request: &ExtensionRequest,
        existing: &ExtensionProperties,
        candidate: &ExtensionProperties,
    ) -> ReplacementVerdict {
        if self.is_terminal() {
            tracing::warn!(
                identifier = %self.identifier,
                "replacement query received after the request ended"
            );
        }

        let decision = self.policy.evaluate(
            self.operation,
            &existing.bundle_version,
            &candidate.bundle_version,
        );

        match decision.verdict {
            ReplacementVerdict::Replace => self.emit(LifecycleEvent::WillReplace {
                from: existing.bundle_version.clone(),
                to: candidate.bundle_version.clone(),
                forced: self.operation == Operation::ForceActivate,
            }),
            ReplacementVerdict::Cancel => self.emit(LifecycleEvent::ReplacingCanceled {
                installed: existing.bundle_version.clone(),
                candidate: candidate.bundle_version.clone(),
                reason: decision.reason,
            }),
        }

        decision.verdict
    }

    fn request_finished(&self, _request: &ExtensionRequest, outcome: Outcome) {
        if !self.transition(RequestState::Finished) {
            return;
        }

        self.emit(LifecycleEvent::RequestFinished { outcome });
        if outcome == Outcome::RequiresReboot {
            self.emit(LifecycleEvent::RebootRequired);
        }

        self.latch.resume(Ok(outcome));
    }

    fn request_failed(&self, _request: &ExtensionRequest, error: ServiceError) {
        if !self.transition(RequestState::Failed) {
            return;
        }

        let result = resolve_failure(self.operation, error.clone());
        self.emit(LifecycleEvent::RequestFailed {
            error: error.to_string(),
            suppressed: result.is_ok(),
        });

        self.latch.resume(result);
    }
}
