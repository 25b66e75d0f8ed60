//! Orchestration integration tests
//!
//! Drives `LifecycleOrchestrator` against scripted services covering:
//! - Replacement decisions for activate and forced activate
//! - Failure propagation and the deactivate/not-found suppression
//! - Callbacks delivered before and after the orchestrator starts waiting
//! - Duplicate terminal callbacks and outright submission rejection
//! - Lifecycle event order

mod common;

use common::*;
use std::sync::Arc;
use sysext_core::{Operation, Outcome, ReplacementVerdict, RequestKind};
use sysext_lifecycle::{
    DecisionReason, LifecycleError, LifecycleEvent, LifecycleOrchestrator, ReplacementPolicy,
    ServiceError,
};

#[cfg(test)]
mod scenarios {
    use super::*;
    use test_case::test_case;

    #[test_case(Delivery::Synchronous ; "synchronous")]
    #[test_case(Delivery::Deferred ; "deferred")]
    #[tokio::test]
    async fn test_activate_same_version_cancels_and_completes(delivery: Delivery) {
        let service = Arc::new(
            ScriptedService::new(delivery)
                .then_replacement("1.0.0", "1.0.0")
                .then_finish(Outcome::Completed),
        );
        let (orchestrator, observer) = recording_orchestrator(service.clone());

        let result = orchestrator.perform(Operation::Activate).await;

        assert_eq!(result, Ok(Outcome::Completed));
        assert_eq!(service.verdicts(), vec![ReplacementVerdict::Cancel]);
        assert!(observer.events().contains(&LifecycleEvent::ReplacingCanceled {
            installed: v("1.0.0"),
            candidate: v("1.0.0"),
            reason: DecisionReason::AlreadyCurrent,
        }));
    }

    #[test_case(Delivery::Synchronous ; "synchronous")]
    #[test_case(Delivery::Deferred ; "deferred")]
    #[tokio::test]
    async fn test_activate_newer_candidate_replaces(delivery: Delivery) {
        let service = Arc::new(
            ScriptedService::new(delivery)
                .then_replacement("1.0.0", "2.0.0")
                .then_finish(Outcome::Completed),
        );
        let (orchestrator, _) = recording_orchestrator(service.clone());

        let result = orchestrator.perform(Operation::Activate).await;

        assert_eq!(result, Ok(Outcome::Completed));
        assert_eq!(service.verdicts(), vec![ReplacementVerdict::Replace]);
    }

    #[test_case(Delivery::Synchronous ; "synchronous")]
    #[test_case(Delivery::Deferred ; "deferred")]
    #[tokio::test]
    async fn test_force_activate_replaces_despite_downgrade(delivery: Delivery) {
        let service = Arc::new(
            ScriptedService::new(delivery)
                .then_replacement("3.0.0", "1.0.0")
                .then_finish(Outcome::Completed),
        );
        let (orchestrator, observer) = recording_orchestrator(service.clone());

        let result = orchestrator.perform(Operation::ForceActivate).await;

        assert_eq!(result, Ok(Outcome::Completed));
        assert_eq!(service.verdicts(), vec![ReplacementVerdict::Replace]);
        assert!(observer.events().contains(&LifecycleEvent::WillReplace {
            from: v("3.0.0"),
            to: v("1.0.0"),
            forced: true,
        }));
    }

    #[test_case(Delivery::Synchronous ; "synchronous")]
    #[test_case(Delivery::Deferred ; "deferred")]
    #[tokio::test]
    async fn test_deactivate_not_found_is_completed(delivery: Delivery) {
        let service = Arc::new(
            ScriptedService::new(delivery).then_fail(ServiceError::ExtensionNotFound),
        );
        let (orchestrator, observer) = recording_orchestrator(service.clone());

        let result = orchestrator.perform(Operation::Deactivate).await;

        assert_eq!(result, Ok(Outcome::Completed));
        assert_eq!(service.submissions()[0].kind(), RequestKind::Deactivation);
        assert!(observer.events().contains(&LifecycleEvent::RequestFailed {
            error: "extension not found".to_string(),
            suppressed: true,
        }));
    }

    #[test_case(Delivery::Synchronous ; "synchronous")]
    #[test_case(Delivery::Deferred ; "deferred")]
    #[tokio::test]
    async fn test_activate_not_permitted_surfaces(delivery: Delivery) {
        let service = Arc::new(
            ScriptedService::new(delivery)
                .then_approval()
                .then_fail(ServiceError::rejected("operation not permitted")),
        );
        let (orchestrator, _) = recording_orchestrator(service);

        let result = orchestrator.perform(Operation::Activate).await;

        assert_eq!(
            result,
            Err(LifecycleError::Submission(ServiceError::rejected(
                "operation not permitted"
            )))
        );
        assert_eq!(result.unwrap_err().to_string(), "operation not permitted");
    }
}

#[cfg(test)]
mod failures {
    use super::*;
    use test_case::test_case;

    #[test_case(Operation::Activate, ServiceError::ExtensionNotFound ; "activate not found")]
    #[test_case(Operation::ForceActivate, ServiceError::ExtensionNotFound ; "force not found")]
    #[test_case(Operation::Activate, ServiceError::AuthorizationRequired ; "activate authorization")]
    #[test_case(Operation::ForceActivate, ServiceError::RequestCanceled ; "force canceled")]
    #[test_case(Operation::Deactivate, ServiceError::AuthorizationRequired ; "deactivate authorization")]
    #[tokio::test]
    async fn test_unsuppressed_failures_propagate(operation: Operation, error: ServiceError) {
        let service = Arc::new(ScriptedService::new(Delivery::Deferred).then_fail(error.clone()));
        let (orchestrator, _) = recording_orchestrator(service);

        let result = orchestrator.perform(operation).await;

        assert_eq!(result, Err(LifecycleError::Submission(error)));
    }

    #[tokio::test]
    async fn test_submission_rejection_surfaces() {
        let service = Arc::new(
            ScriptedService::new(Delivery::Synchronous)
                .rejecting(ServiceError::rejected("missing entitlement")),
        );
        let (orchestrator, observer) = recording_orchestrator(service);

        let result = orchestrator.perform(Operation::Activate).await;

        assert_eq!(
            result,
            Err(LifecycleError::Submission(ServiceError::rejected(
                "missing entitlement"
            )))
        );
        assert_eq!(observer.events().len(), 2);
    }

    #[tokio::test]
    async fn test_submission_rejection_not_found_on_deactivate_is_completed() {
        let service = Arc::new(
            ScriptedService::new(Delivery::Synchronous).rejecting(ServiceError::ExtensionNotFound),
        );
        let (orchestrator, _) = recording_orchestrator(service);

        assert_eq!(
            orchestrator.perform(Operation::Deactivate).await,
            Ok(Outcome::Completed)
        );
    }
}

#[cfg(test)]
mod callbacks {
    use super::*;
    use test_case::test_case;

    #[test_case(Delivery::Synchronous ; "synchronous")]
    #[test_case(Delivery::Deferred ; "deferred")]
    #[tokio::test]
    async fn test_first_terminal_callback_wins(delivery: Delivery) {
        let service = Arc::new(
            ScriptedService::new(delivery)
                .then_finish(Outcome::RequiresReboot)
                .then_fail(ServiceError::rejected("late failure"))
                .then_finish(Outcome::Completed),
        );
        let (orchestrator, observer) = recording_orchestrator(service);

        let result = orchestrator.perform(Operation::Activate).await;

        assert_eq!(result, Ok(Outcome::RequiresReboot));
        let finished = observer
            .events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    LifecycleEvent::RequestFinished { .. } | LifecycleEvent::RequestFailed { .. }
                )
            })
            .count();
        assert_eq!(finished, 1);
    }

    #[tokio::test]
    async fn test_event_order_for_reboot_activation() {
        let service = Arc::new(
            ScriptedService::new(Delivery::Deferred)
                .then_approval()
                .then_replacement("1.0.0", "1.1.0")
                .then_finish(Outcome::RequiresReboot),
        );
        let (orchestrator, observer) = recording_orchestrator(service);

        let result = orchestrator.perform(Operation::Activate).await;

        assert_eq!(result, Ok(Outcome::RequiresReboot));
        assert_eq!(
            observer.events(),
            vec![
                LifecycleEvent::ActivationRequested { forced: false },
                LifecycleEvent::UserApprovalRequired,
                LifecycleEvent::WillReplace {
                    from: v("1.0.0"),
                    to: v("1.1.0"),
                    forced: false,
                },
                LifecycleEvent::RequestFinished {
                    outcome: Outcome::RequiresReboot
                },
                LifecycleEvent::RebootRequired,
            ]
        );
    }

    #[tokio::test]
    async fn test_envelopes_carry_identifier_and_operation() {
        let service = Arc::new(
            ScriptedService::new(Delivery::Synchronous).then_finish(Outcome::Completed),
        );
        let (orchestrator, observer) = recording_orchestrator(service.clone());

        orchestrator.perform(Operation::Deactivate).await.unwrap();

        for envelope in observer.envelopes() {
            assert_eq!(envelope.identifier, TEST_IDENTIFIER);
            assert_eq!(envelope.operation, Operation::Deactivate);
        }
        assert_eq!(service.submissions()[0].identifier(), TEST_IDENTIFIER);
    }

    #[tokio::test]
    async fn test_replace_unsupported_policy_cancels_upgrade() {
        let service = Arc::new(
            ScriptedService::new(Delivery::Deferred)
                .then_replacement("1.0.0", "2.0.0")
                .then_finish(Outcome::Completed),
        );
        let orchestrator = LifecycleOrchestrator::new(service.clone(), TEST_IDENTIFIER)
            .with_policy(ReplacementPolicy::new(false));

        let result = orchestrator.perform(Operation::Activate).await;

        assert_eq!(result, Ok(Outcome::Completed));
        assert_eq!(service.verdicts(), vec![ReplacementVerdict::Cancel]);
    }
}
