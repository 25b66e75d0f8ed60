//! Configuration types for the extension manager
//!
//! Every field has a default so that a partial `config.yaml` is valid.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Default extension bundle identifier
pub const DEFAULT_IDENTIFIER: &str = "org.example.driverkit.VirtualHIDDevice";

/// Default candidate bundle version
pub const DEFAULT_BUNDLE_VERSION: &str = "1.0.0";

/// Complete sysext configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SysextConfig {
    /// The managed extension
    #[serde(default)]
    pub extension: ExtensionConfig,

    /// Replacement policy switches
    #[serde(default)]
    pub policy: PolicyConfig,

    /// File-backed extension service settings
    #[serde(default)]
    pub local: LocalServiceConfig,
}

/// The extension the manager activates and deactivates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionConfig {
    /// Bundle identifier submitted with every request
    #[serde(default = "default_identifier")]
    pub identifier: String,

    /// Version of the build shipped with this manager (the replacement candidate)
    #[serde(default = "default_bundle_version")]
    pub bundle_version: String,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            identifier: default_identifier(),
            bundle_version: default_bundle_version(),
        }
    }
}

/// Replacement policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyConfig {
    /// Whether the host can replace a running extension in place
    #[serde(default = "default_true")]
    pub replace_supported: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            replace_supported: true,
        }
    }
}

/// Settings for the file-backed extension service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocalServiceConfig {
    /// Directory holding the installed-extension state file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<Utf8PathBuf>,

    /// Emit a user-approval notice before processing each request
    #[serde(default)]
    pub require_approval: bool,

    /// Report `RequiresReboot` whenever the installed state changes
    #[serde(default)]
    pub reboot_required: bool,
}

fn default_identifier() -> String {
    DEFAULT_IDENTIFIER.to_string()
}

fn default_bundle_version() -> String {
    DEFAULT_BUNDLE_VERSION.to_string()
}

fn default_true() -> bool {
    true
}
