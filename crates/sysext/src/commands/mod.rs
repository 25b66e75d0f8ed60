//! CLI command implementations

pub mod lifecycle;
