//! Semantic version with build stage, used for the library and file format.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::{JdxError, Result};

/// Release stage of a build.
///
/// Ordered `Dev < Alpha < Beta < Rc < Release`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStage {
    /// Development build
    Dev,
    /// Alpha pre-release
    Alpha,
    /// Beta pre-release
    Beta,
    /// Release candidate
    Rc,
    /// Final release
    Release,
}

impl BuildStage {
    /// Suffix appended to `vMAJOR.MINOR.PATCH` when displaying a version.
    pub fn suffix(&self) -> &'static str {
        match self {
            BuildStage::Dev => " (dev build)",
            BuildStage::Alpha => "-alpha",
            BuildStage::Beta => "-beta",
            BuildStage::Rc => "-rc",
            BuildStage::Release => "",
        }
    }

    /// On-disk tag for this stage.
    pub fn as_u8(&self) -> u8 {
        match self {
            BuildStage::Dev => 0,
            BuildStage::Alpha => 1,
            BuildStage::Beta => 2,
            BuildStage::Rc => 3,
            BuildStage::Release => 4,
        }
    }

    /// Decode an on-disk tag. Returns `None` for unknown tags.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(BuildStage::Dev),
            1 => Some(BuildStage::Alpha),
            2 => Some(BuildStage::Beta),
            3 => Some(BuildStage::Rc),
            4 => Some(BuildStage::Release),
            _ => None,
        }
    }

    /// True for every stage except `Release`.
    pub fn is_prerelease(&self) -> bool {
        !matches!(self, BuildStage::Release)
    }
}

/// A `major.minor.patch` version plus build stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major version number
    pub major: u8,
    /// Minor version number
    pub minor: u8,
    /// Patch version number
    pub patch: u8,
    /// Build stage
    pub build_stage: BuildStage,
}

impl Version {
    /// Version of this library, also written into new file headers.
    pub const CURRENT: Version = Version::new(1, 0, 0, BuildStage::Release);

    /// Create a version from its parts.
    pub const fn new(major: u8, minor: u8, patch: u8, build_stage: BuildStage) -> Self {
        Self {
            major,
            minor,
            patch,
            build_stage,
        }
    }

    /// The library's own build version.
    pub const fn current() -> Self {
        Self::CURRENT
    }

    /// The `(major, minor, patch)` triple, ignoring build stage.
    pub fn triple(&self) -> (u8, u8, u8) {
        (self.major, self.minor, self.patch)
    }

    /// Parse the display form back into a version.
    ///
    /// Accepts `v1.2.3`, `1.2.3-beta`, `v2.0.0 (dev build)` and so on.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: &str| JdxError::invalid_argument("version", reason.to_string());

        let trimmed = text.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let (numbers, build_stage) = if let Some(rest) = body.strip_suffix(BuildStage::Dev.suffix())
        {
            (rest, BuildStage::Dev)
        } else if let Some((rest, tag)) = body.split_once('-') {
            let stage = match tag {
                "alpha" => BuildStage::Alpha,
                "beta" => BuildStage::Beta,
                "rc" => BuildStage::Rc,
                _ => return Err(invalid(&format!("unknown build stage '{}'", tag))),
            };
            (rest, stage)
        } else {
            (body, BuildStage::Release)
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid(&format!("expected MAJOR.MINOR.PATCH, got '{}'", text)));
        }

        let mut triple = [0u8; 3];
        for (slot, part) in triple.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| invalid(&format!("'{}' is not a number in 0..=255", part)))?;
        }

        Ok(Self::new(triple[0], triple[1], triple[2], build_stage))
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple()
            .cmp(&other.triple())
            .then(self.build_stage.cmp(&other.build_stage))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{}.{}.{}{}",
            self.major,
            self.minor,
            self.patch,
            self.build_stage.suffix()
        )
    }
}

/// Display string of the library version.
pub fn version_string() -> String {
    Version::current().to_string()
}
