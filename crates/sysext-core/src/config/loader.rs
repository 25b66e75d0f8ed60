//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Built-in defaults
//! 2. Global config (~/.sysext/config.yaml)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables (SYSEXT_* prefix)
//! 5. CLI flags (handled by caller)
//!
//! File layers are deep-merged key by key, so a file only needs the keys it
//! changes.

use super::types::SysextConfig;
use crate::error::{Error, Result};
use crate::utils::get_home_dir;
use camino::{Utf8Path, Utf8PathBuf};
use serde_yaml_ng::{Mapping, Value};
use std::env;
use std::fs;

/// Global configuration file name inside the config directory
const CONFIG_FILE_NAME: &str = "config.yaml";

/// State directory name inside the config directory
const STATE_DIR_NAME: &str = "state";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at the standard config directory (~/.sysext)
    pub fn new() -> Result<Self> {
        let home = get_home_dir().map_err(|e| Error::invalid_config(e.to_string()))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|p| Error::invalid_config(format!("Non UTF-8 home directory: {:?}", p)))?;

        Ok(Self {
            config_dir: home.join(".sysext"),
        })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Directory searched for the global config file
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Load configuration with hierarchical precedence
    pub fn load(&self, explicit: Option<&Utf8Path>) -> Result<SysextConfig> {
        let mut merged = serde_yaml_ng::to_value(SysextConfig::default())?;

        let global_path = self.config_dir.join(CONFIG_FILE_NAME);
        if global_path.exists() {
            tracing::debug!("Loading global config from {}", global_path);
            merge_values(&mut merged, self.load_yaml_file(&global_path)?);
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::config_not_found(path.as_str()));
            }
            tracing::debug!("Loading config from {}", path);
            merge_values(&mut merged, self.load_yaml_file(path)?);
        }

        let mut config: SysextConfig = serde_yaml_ng::from_value(merged)
            .map_err(|e| Error::invalid_config(format!("Failed to apply config: {}", e)))?;

        config = self.apply_env_overrides(config)?;

        if config.local.state_dir.is_none() {
            config.local.state_dir = Some(self.config_dir.join(STATE_DIR_NAME));
        }

        Ok(config)
    }

    /// Load a YAML file as an untyped value
    fn load_yaml_file(&self, path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;

        match value {
            Value::Null => Ok(Value::Mapping(Mapping::new())),
            Value::Mapping(_) => Ok(value),
            _ => Err(Error::invalid_config(format!(
                "{} must contain a mapping at the top level",
                path
            ))),
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, mut config: SysextConfig) -> Result<SysextConfig> {
        if let Ok(val) = env::var("SYSEXT_IDENTIFIER") {
            config.extension.identifier = val;
        }

        if let Ok(val) = env::var("SYSEXT_BUNDLE_VERSION") {
            config.extension.bundle_version = val;
        }

        if let Ok(val) = env::var("SYSEXT_REPLACE_SUPPORTED") {
            config.policy.replace_supported = parse_bool("SYSEXT_REPLACE_SUPPORTED", &val)?;
        }

        if let Ok(val) = env::var("SYSEXT_STATE_DIR") {
            config.local.state_dir = Some(Utf8PathBuf::from(val));
        }

        if let Ok(val) = env::var("SYSEXT_REQUIRE_APPROVAL") {
            config.local.require_approval = parse_bool("SYSEXT_REQUIRE_APPROVAL", &val)?;
        }

        if let Ok(val) = env::var("SYSEXT_REBOOT_REQUIRED") {
            config.local.reboot_required = parse_bool("SYSEXT_REBOOT_REQUIRED", &val)?;
        }

        Ok(config)
    }
}

/// Deep-merge `overlay` into `base`; mappings merge, everything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::invalid_config(format!(
            "{} must be a boolean (true/false)",
            name
        ))),
    }
}
