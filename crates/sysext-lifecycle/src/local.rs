//! File-backed extension service
//!
//! Stands in for the system extension facility on hosts that have none. The
//! installed build of each extension is recorded in `installed.yaml` under a
//! state directory; every request reads and rewrites that file under an
//! exclusive lock. Requests are processed on the blocking pool, so callbacks
//! always arrive after `submit` has returned.

use crate::error::{LifecycleError, ServiceError};
use crate::service::{ExtensionService, RequestDelegate};
use camino::{Utf8Path, Utf8PathBuf};
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use sysext_core::{
    ExtensionProperties, ExtensionRequest, Outcome, ReplacementVerdict, RequestKind,
    SysextConfig, VersionToken,
};

/// State file name inside the state directory
const STATE_FILE_NAME: &str = "installed.yaml";

/// Contents of the state file
#[derive(Debug, Default, Serialize, Deserialize)]
struct InstalledState {
    #[serde(default)]
    extensions: BTreeMap<String, VersionToken>,
}

/// Extension service that keeps installed versions in a local state file
#[derive(Debug, Clone)]
pub struct LocalExtensionService {
    candidate: ExtensionProperties,
    state_path: Utf8PathBuf,
    require_approval: bool,
    reboot_required: bool,
}

impl LocalExtensionService {
    /// Create a service that installs `candidate` and stores state in `state_dir`
    pub fn new(candidate: ExtensionProperties, state_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            candidate,
            state_path: state_dir.into().join(STATE_FILE_NAME),
            require_approval: false,
            reboot_required: false,
        }
    }

    /// Create a service from loaded configuration
    pub fn from_config(config: &SysextConfig) -> Result<Self, LifecycleError> {
        let version = VersionToken::parse(&config.extension.bundle_version)?;
        let state_dir = config
            .local
            .state_dir
            .clone()
            .ok_or_else(|| LifecycleError::config("local.state-dir is not set"))?;

        Ok(Self::new(
            ExtensionProperties::new(config.extension.identifier.clone(), version),
            state_dir,
        )
        .with_require_approval(config.local.require_approval)
        .with_reboot_required(config.local.reboot_required))
    }

    /// Emit a user-approval notice before processing each request
    pub fn with_require_approval(mut self, require_approval: bool) -> Self {
        self.require_approval = require_approval;
        self
    }

    /// Report `RequiresReboot` when a request changes the installed state
    pub fn with_reboot_required(mut self, reboot_required: bool) -> Self {
        self.reboot_required = reboot_required;
        self
    }

    /// The build this service installs on activation
    pub fn candidate(&self) -> &ExtensionProperties {
        &self.candidate
    }

    /// Path of the state file
    pub fn state_path(&self) -> &Utf8Path {
        &self.state_path
    }

    /// Installed version of `identifier`, if any
    pub fn installed_version(
        &self,
        identifier: &str,
    ) -> Result<Option<VersionToken>, ServiceError> {
        self.with_state(|state| Ok((state.extensions.get(identifier).cloned(), false)))
    }

    /// Run `f` against the locked state, persisting it when `f` reports a change
    fn with_state<R>(
        &self,
        f: impl FnOnce(&mut InstalledState) -> Result<(R, bool), ServiceError>,
    ) -> Result<R, ServiceError> {
        if let Some(parent) = self.state_path.parent() {
            fs::create_dir_all(parent).map_err(|e| storage_error("create state directory", e))?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.state_path)
            .map_err(|e| storage_error("open state file", e))?;

        // Released when `file` is dropped
        file.lock_exclusive()
            .map_err(|e| storage_error("lock state file", e))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| storage_error("read state file", e))?;

        let mut state: InstalledState = if content.trim().is_empty() {
            InstalledState::default()
        } else {
            serde_yaml_ng::from_str(&content).map_err(|e| {
                ServiceError::rejected(format!("corrupt state file {}: {}", self.state_path, e))
            })?
        };

        let (result, changed) = f(&mut state)?;

        if changed {
            let yaml = serde_yaml_ng::to_string(&state)
                .map_err(|e| ServiceError::rejected(format!("failed to encode state: {}", e)))?;
            file.set_len(0)
                .and_then(|_| file.seek(SeekFrom::Start(0)))
                .and_then(|_| file.write_all(yaml.as_bytes()))
                .and_then(|_| file.sync_all())
                .map_err(|e| storage_error("write state file", e))?;
        }

        Ok(result)
    }

    fn outcome(&self, changed: bool) -> Outcome {
        if changed && self.reboot_required {
            Outcome::RequiresReboot
        } else {
            Outcome::Completed
        }
    }

    fn activate(
        &self,
        request: &ExtensionRequest,
        delegate: &dyn RequestDelegate,
    ) -> Result<Outcome, ServiceError> {
        let changed = self.with_state(|state| {
            let replace = match state.extensions.get(request.identifier()) {
                None => true,
                Some(installed) => {
                    let existing =
                        ExtensionProperties::new(request.identifier(), installed.clone());
                    delegate.replacement_action(request, &existing, &self.candidate)
                        == ReplacementVerdict::Replace
                }
            };

            if replace {
                state.extensions.insert(
                    request.identifier().to_string(),
                    self.candidate.bundle_version.clone(),
                );
            }
            Ok((replace, replace))
        })?;

        Ok(self.outcome(changed))
    }

    fn deactivate(&self, request: &ExtensionRequest) -> Result<Outcome, ServiceError> {
        self.with_state(|state| match state.extensions.remove(request.identifier()) {
            Some(_) => Ok(((), true)),
            None => Err(ServiceError::ExtensionNotFound),
        })?;

        Ok(self.outcome(true))
    }

    fn process(&self, request: ExtensionRequest, delegate: Arc<dyn RequestDelegate>) {
        if self.require_approval {
            delegate.request_needs_user_approval(&request);
        }

        let result = match request.kind() {
            RequestKind::Activation => self.activate(&request, delegate.as_ref()),
            RequestKind::Deactivation => self.deactivate(&request),
        };

        match result {
            Ok(outcome) => delegate.request_finished(&request, outcome),
            Err(err) => delegate.request_failed(&request, err),
        }
    }
}

impl ExtensionService for LocalExtensionService {
    fn submit(
        &self,
        request: ExtensionRequest,
        delegate: Arc<dyn RequestDelegate>,
    ) -> Result<(), ServiceError> {
        if request.identifier().trim().is_empty() {
            return Err(ServiceError::rejected("missing extension identifier"));
        }

        // Only the bundled candidate can be activated
        if request.kind() == RequestKind::Activation
            && request.identifier() != self.candidate.identifier
        {
            return Err(ServiceError::ExtensionNotFound);
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| ServiceError::rejected("no async runtime to process the request"))?;

        tracing::debug!(
            identifier = request.identifier(),
            state_file = %self.state_path,
            "processing {} request",
            request.kind()
        );

        let service = self.clone();
        runtime.spawn_blocking(move || service.process(request, delegate));
        Ok(())
    }
}

fn storage_error(action: &str, err: std::io::Error) -> ServiceError {
    ServiceError::rejected(format!("failed to {}: {}", action, err))
}
