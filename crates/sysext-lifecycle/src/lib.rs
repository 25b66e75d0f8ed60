//! Extension lifecycle orchestration for sysext
//!
//! This crate handles:
//! - Replacement decisions between an installed and a candidate build
//! - The callback contract of the extension management service
//! - Driving one activation, forced activation, or deactivation to a single result
//! - Lifecycle events and observers
//! - A file-backed extension service for hosts without a system facility

pub mod error;
pub mod events;
pub mod local;
pub mod observer;
pub mod orchestrator;
pub mod policy;
pub mod service;

pub use error::{LifecycleError, ServiceError};
pub use events::{EventEnvelope, LifecycleEvent};
pub use local::LocalExtensionService;
pub use observer::{LifecycleObserver, NoOpObserver, RecordingObserver, TracingObserver};
pub use orchestrator::LifecycleOrchestrator;
pub use policy::{decide, evaluate, DecisionReason, ReplacementDecision, ReplacementPolicy};
pub use service::{ExtensionService, RequestDelegate};
