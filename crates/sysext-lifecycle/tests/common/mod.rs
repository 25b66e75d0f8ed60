//! Common test utilities for sysext-lifecycle
//!
//! This module provides shared test infrastructure including:
//! - Constants and configuration
//! - A scripted extension service that replays callback sequences
//! - Fixtures for orchestrators and local state directories

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod constants;
pub mod fixtures;
pub mod mocks;

pub use constants::*;
pub use fixtures::*;
pub use mocks::*;
