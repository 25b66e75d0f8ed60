//! Test fixtures

use super::constants::TEST_IDENTIFIER;
use camino::Utf8PathBuf;
use std::sync::Arc;
use sysext_core::{ExtensionProperties, VersionToken};
use sysext_lifecycle::{
    ExtensionService, LifecycleOrchestrator, LocalExtensionService, RecordingObserver,
};
use tempfile::TempDir;

/// Orchestrator for `TEST_IDENTIFIER` that records its events
pub fn recording_orchestrator(
    service: Arc<dyn ExtensionService>,
) -> (LifecycleOrchestrator, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::new());
    let orchestrator =
        LifecycleOrchestrator::new(service, TEST_IDENTIFIER).with_observer(observer.clone());
    (orchestrator, observer)
}

/// Local service shipping `version` of `TEST_IDENTIFIER`, with state in `dir`
pub fn local_service(dir: &TempDir, version: &str) -> LocalExtensionService {
    let state_dir = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    LocalExtensionService::new(
        ExtensionProperties::new(TEST_IDENTIFIER, VersionToken::parse(version).unwrap()),
        state_dir,
    )
}

pub fn v(s: &str) -> VersionToken {
    VersionToken::parse(s).unwrap()
}
