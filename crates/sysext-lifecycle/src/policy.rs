//! Replacement policy
//!
//! Decides what happens when the extension service finds an installed build
//! while activating a candidate. Checks run in a fixed priority:
//!
//! 1. Same version installed: cancel, nothing to do.
//! 2. Forced activation: replace, whatever the direction.
//! 3. Candidate is newer: replace.
//! 4. Installed is newer: cancel, no downgrades.

use serde::{Deserialize, Serialize};
use std::fmt;
use sysext_core::{Operation, ReplacementVerdict, VersionToken};

/// Why a verdict was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// The candidate is the installed version
    AlreadyCurrent,
    /// The caller asked for a forced activation
    Forced,
    /// The candidate is newer than the installed version
    Upgrade,
    /// A newer version is already installed
    NewerInstalled,
    /// The candidate is newer but the host cannot replace in place
    ReplaceUnsupported,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReason::AlreadyCurrent => f.write_str("already installed"),
            DecisionReason::Forced => f.write_str("forced replacement"),
            DecisionReason::Upgrade => f.write_str("newer candidate"),
            DecisionReason::NewerInstalled => f.write_str("newer version is already installed"),
            DecisionReason::ReplaceUnsupported => f.write_str("replacing is not supported"),
        }
    }
}

/// A verdict together with the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementDecision {
    pub verdict: ReplacementVerdict,
    pub reason: DecisionReason,
}

impl ReplacementDecision {
    fn replace(reason: DecisionReason) -> Self {
        Self {
            verdict: ReplacementVerdict::Replace,
            reason,
        }
    }

    fn cancel(reason: DecisionReason) -> Self {
        Self {
            verdict: ReplacementVerdict::Cancel,
            reason,
        }
    }
}

/// Host-dependent replacement policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplacementPolicy {
    /// Whether the host can replace a running extension in place.
    /// Only affects upgrades; forced activation always replaces.
    pub replace_supported: bool,
}

impl Default for ReplacementPolicy {
    fn default() -> Self {
        Self {
            replace_supported: true,
        }
    }
}

impl ReplacementPolicy {
    pub fn new(replace_supported: bool) -> Self {
        Self { replace_supported }
    }

    /// Evaluate the replacement rules for one query
    pub fn evaluate(
        &self,
        operation: Operation,
        installed: &VersionToken,
        candidate: &VersionToken,
    ) -> ReplacementDecision {
        if candidate == installed {
            return ReplacementDecision::cancel(DecisionReason::AlreadyCurrent);
        }

        if operation == Operation::ForceActivate {
            return ReplacementDecision::replace(DecisionReason::Forced);
        }

        if candidate > installed {
            if !self.replace_supported {
                return ReplacementDecision::cancel(DecisionReason::ReplaceUnsupported);
            }
            return ReplacementDecision::replace(DecisionReason::Upgrade);
        }

        ReplacementDecision::cancel(DecisionReason::NewerInstalled)
    }
}

/// Evaluate the replacement rules with the default policy
pub fn evaluate(
    operation: Operation,
    installed: &VersionToken,
    candidate: &VersionToken,
) -> ReplacementDecision {
    ReplacementPolicy::default().evaluate(operation, installed, candidate)
}

/// Decide whether `candidate` should replace `installed`
pub fn decide(
    operation: Operation,
    installed: &VersionToken,
    candidate: &VersionToken,
) -> ReplacementVerdict {
    evaluate(operation, installed, candidate).verdict
}
