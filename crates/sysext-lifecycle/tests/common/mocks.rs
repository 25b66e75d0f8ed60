//! Mock implementations for testing
//!
//! `ScriptedService` replays a fixed sequence of service callbacks, either
//! inside `submit` (before the orchestrator starts waiting) or from a spawned
//! task (after it has started waiting).

use std::sync::{Arc, Mutex};
use sysext_core::{
    ExtensionProperties, ExtensionRequest, Outcome, ReplacementVerdict, VersionToken,
};
use sysext_lifecycle::{ExtensionService, RequestDelegate, ServiceError};

/// When scripted callbacks are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// All callbacks run inside `submit`
    Synchronous,
    /// Callbacks run from a spawned task after `submit` returns
    Deferred,
}

/// One scripted callback
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Approval,
    Replacement { installed: String, candidate: String },
    Finish(Outcome),
    Fail(ServiceError),
}

/// Extension service that replays a script
pub struct ScriptedService {
    steps: Vec<ScriptStep>,
    delivery: Delivery,
    rejection: Option<ServiceError>,
    verdicts: Arc<Mutex<Vec<ReplacementVerdict>>>,
    submissions: Arc<Mutex<Vec<ExtensionRequest>>>,
}

impl ScriptedService {
    pub fn new(delivery: Delivery) -> Self {
        Self {
            steps: Vec::new(),
            delivery,
            rejection: None,
            verdicts: Arc::new(Mutex::new(Vec::new())),
            submissions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn then_approval(mut self) -> Self {
        self.steps.push(ScriptStep::Approval);
        self
    }

    pub fn then_replacement(mut self, installed: &str, candidate: &str) -> Self {
        self.steps.push(ScriptStep::Replacement {
            installed: installed.to_string(),
            candidate: candidate.to_string(),
        });
        self
    }

    pub fn then_finish(mut self, outcome: Outcome) -> Self {
        self.steps.push(ScriptStep::Finish(outcome));
        self
    }

    pub fn then_fail(mut self, error: ServiceError) -> Self {
        self.steps.push(ScriptStep::Fail(error));
        self
    }

    /// Reject the request in `submit` without any callbacks
    pub fn rejecting(mut self, error: ServiceError) -> Self {
        self.rejection = Some(error);
        self
    }

    /// Verdicts returned by the delegate, in order
    pub fn verdicts(&self) -> Vec<ReplacementVerdict> {
        self.verdicts.lock().unwrap().clone()
    }

    /// Requests submitted to this service
    pub fn submissions(&self) -> Vec<ExtensionRequest> {
        self.submissions.lock().unwrap().clone()
    }
}

fn play(
    step: &ScriptStep,
    request: &ExtensionRequest,
    delegate: &dyn RequestDelegate,
    verdicts: &Mutex<Vec<ReplacementVerdict>>,
) {
    match step {
        ScriptStep::Approval => delegate.request_needs_user_approval(request),
        ScriptStep::Replacement {
            installed,
            candidate,
        } => {
            let existing = ExtensionProperties::new(
                request.identifier(),
                VersionToken::parse(installed).unwrap(),
            );
            let candidate = ExtensionProperties::new(
                request.identifier(),
                VersionToken::parse(candidate).unwrap(),
            );
            let verdict = delegate.replacement_action(request, &existing, &candidate);
            verdicts.lock().unwrap().push(verdict);
        }
        ScriptStep::Finish(outcome) => delegate.request_finished(request, *outcome),
        ScriptStep::Fail(error) => delegate.request_failed(request, error.clone()),
    }
}

impl ExtensionService for ScriptedService {
    fn submit(
        &self,
        request: ExtensionRequest,
        delegate: Arc<dyn RequestDelegate>,
    ) -> Result<(), ServiceError> {
        self.submissions.lock().unwrap().push(request.clone());

        if let Some(error) = &self.rejection {
            return Err(error.clone());
        }

        match self.delivery {
            Delivery::Synchronous => {
                for step in &self.steps {
                    play(step, &request, delegate.as_ref(), &self.verdicts);
                }
            }
            Delivery::Deferred => {
                let steps = self.steps.clone();
                let verdicts = Arc::clone(&self.verdicts);
                tokio::spawn(async move {
                    for step in &steps {
                        tokio::task::yield_now().await;
                        play(step, &request, delegate.as_ref(), &verdicts);
                    }
                });
            }
        }

        Ok(())
    }
}
