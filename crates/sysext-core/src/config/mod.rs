//! Configuration types and hierarchical loading

mod loader;
mod types;

pub use loader::HierarchicalConfigLoader;
pub use types::{ExtensionConfig, LocalServiceConfig, PolicyConfig, SysextConfig};
