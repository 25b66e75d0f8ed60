//! Collaborator contract of the extension management service
//!
//! A service accepts a request and reports back through a delegate:
//! zero or more approval notices and replacement queries, then exactly one
//! terminal `request_finished` or `request_failed`. Callbacks may run on any
//! thread, before or after `submit` returns.

use crate::error::ServiceError;
use std::sync::Arc;
use sysext_core::{ExtensionProperties, ExtensionRequest, Outcome, ReplacementVerdict};

/// Receiver of the service's callbacks for one request
pub trait RequestDelegate: Send + Sync {
    /// The request is waiting for the user to approve it
    fn request_needs_user_approval(&self, request: &ExtensionRequest);

    /// An installed build conflicts with the candidate; decide which one stays
    ///
    /// Runs on the service's critical path and must answer without blocking.
    fn replacement_action(
        &self,
        request: &ExtensionRequest,
        existing: &ExtensionProperties,
        candidate: &ExtensionProperties,
    ) -> ReplacementVerdict;

    /// Terminal success
    fn request_finished(&self, request: &ExtensionRequest, outcome: Outcome);

    /// Terminal failure
    fn request_failed(&self, request: &ExtensionRequest, error: ServiceError);
}

/// An extension management service
pub trait ExtensionService: Send + Sync {
    /// Submit a request whose progress is reported to `delegate`
    ///
    /// An `Err` means the request was rejected outright and no callbacks
    /// will follow.
    fn submit(
        &self,
        request: ExtensionRequest,
        delegate: Arc<dyn RequestDelegate>,
    ) -> Result<(), ServiceError>;
}

impl<T: ExtensionService + ?Sized> ExtensionService for Arc<T> {
    fn submit(
        &self,
        request: ExtensionRequest,
        delegate: Arc<dyn RequestDelegate>,
    ) -> Result<(), ServiceError> {
        (**self).submit(request, delegate)
    }
}

impl<T: ExtensionService + ?Sized> ExtensionService for Box<T> {
    fn submit(
        &self,
        request: ExtensionRequest,
        delegate: Arc<dyn RequestDelegate>,
    ) -> Result<(), ServiceError> {
        (**self).submit(request, delegate)
    }
}
