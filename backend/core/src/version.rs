//! Chart version tags and the layout boundary.
//!
//! Chart versions are two-part `<major>.<minor>` tags ("8.7", "8.8"). Charts
//! from 8.8 onwards nest the orchestration components under a single
//! wrapper key; earlier charts keep them at the top level.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HelmKitError;

/// `<major>.<minor>`, with an optional leading `v`.
static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v?(\d+)\.(\d+)$").unwrap());

/// First major version that uses the unified layout.
pub const UNIFIED_LAYOUT_MAJOR: u32 = 8;

/// First minor version (within [`UNIFIED_LAYOUT_MAJOR`]) that uses the unified layout.
pub const UNIFIED_LAYOUT_MINOR: u32 = 8;

/// A chart version tag. Ordered by major, then minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChartVersion {
    pub major: u32,
    pub minor: u32,
}

impl ChartVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether this version nests the components under the wrapper key.
    pub fn uses_unified_layout(&self) -> bool {
        self.major > UNIFIED_LAYOUT_MAJOR
            || (self.major == UNIFIED_LAYOUT_MAJOR && self.minor >= UNIFIED_LAYOUT_MINOR)
    }
}

/// Free-function form of [`ChartVersion::uses_unified_layout`].
pub fn uses_unified_layout(version: &ChartVersion) -> bool {
    version.uses_unified_layout()
}

impl fmt::Display for ChartVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ChartVersion {
    type Err = HelmKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let caps = VERSION_PATTERN
            .captures(trimmed)
            .ok_or_else(|| HelmKitError::InvalidVersion(s.to_string()))?;
        let major = caps[1]
            .parse()
            .map_err(|_| HelmKitError::InvalidVersion(s.to_string()))?;
        let minor = caps[2]
            .parse()
            .map_err(|_| HelmKitError::InvalidVersion(s.to_string()))?;
        Ok(Self { major, minor })
    }
}

impl TryFrom<String> for ChartVersion {
    type Error = HelmKitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChartVersion> for String {
    fn from(version: ChartVersion) -> Self {
        version.to_string()
    }
}
