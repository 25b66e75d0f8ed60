//! # sysext-core
//!
//! Core library for the sysext extension manager providing:
//! - Lifecycle vocabulary (operations, outcomes, verdicts, requests)
//! - Numeric version tokens used for replacement decisions
//! - `ResultLatch`, the one-shot bridge from callbacks to an awaited result
//! - Hierarchical configuration loading (sysext config.yaml)

pub mod config;
pub mod error;
pub mod latch;
pub mod types;
pub mod utils;
pub mod version;

pub use config::{HierarchicalConfigLoader, SysextConfig};
pub use error::{Error, Result};
pub use latch::ResultLatch;
pub use types::{
    ExtensionProperties, ExtensionRequest, Operation, Outcome, ReplacementVerdict, RequestKind,
};
pub use utils::get_home_dir;
pub use version::VersionToken;
