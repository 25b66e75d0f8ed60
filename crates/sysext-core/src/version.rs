//! Numeric-dot-separated version tokens
//!
//! Extension builds are identified by bundle versions such as `1.8.0` or
//! `5.0.12`. Components compare numerically and missing trailing components
//! count as zero, so `1.0` and `1.0.0` name the same build.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Totally ordered build identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionToken {
    raw: String,
    components: Vec<u64>,
}

impl VersionToken {
    /// Parse a version token such as `1.2.3`
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(Error::invalid_version(s));
        }

        let components = raw
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Error::invalid_version(s));
                }
                part.parse::<u64>().map_err(|_| Error::invalid_version(s))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: raw.to_string(),
            components,
        })
    }

    /// The version as originally written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric components in order
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Components with trailing zeros removed, used for equality and hashing
    fn significant(&self) -> &[u64] {
        let len = self
            .components
            .iter()
            .rposition(|&c| c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..len]
    }
}

impl Ord for VersionToken {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for VersionToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionToken {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for VersionToken {}

impl Hash for VersionToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl FromStr for VersionToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionToken {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<VersionToken> for String {
    fn from(v: VersionToken) -> Self {
        v.raw
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
