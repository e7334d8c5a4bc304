//! # Naming Convention
//!
//! Base-name derivation and structural validation.
//!
//! - Derive the base name from the firmware file name
//! - Enforce exactly one separator and no spaces
//! - Never decode the dash escaping into manufacturer/model fields
//!
//! Validation performs no I/O; it runs before any stage.

use crate::primitives::{FIRMWARE_EXTENSION, FORBIDDEN_SPACE, SEPARATOR};
use crate::{FirmwareArtifact, NamingRule, ProfileError};
use serde::Serialize;
use std::path::Path;

/// Derive the candidate base name from a firmware path.
///
/// Takes the leaf file name and removes one trailing `.bin`. Other
/// extensions stay part of the name. Non-UTF-8 names are converted lossily;
/// [`DeviceBaseName::from_artifact`] rejects them before any path is derived.
#[must_use]
pub fn derive_base_name(artifact: &Path) -> String {
    let leaf = artifact
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    match leaf.strip_suffix(FIRMWARE_EXTENSION) {
        Some(stem) => stem.to_string(),
        None => leaf,
    }
}

/// Stateless validator for the filename convention.
pub struct NamingValidator;

impl NamingValidator {
    /// Check a candidate base name.
    ///
    /// Valid iff the separator appears exactly once and no space appears.
    /// The separator rule is reported first when both are broken.
    pub fn validate(candidate: &str) -> Result<(), ProfileError> {
        let separators = candidate.matches(SEPARATOR).count();
        if separators != 1 {
            return Err(ProfileError::NamingConvention {
                base_name: candidate.to_string(),
                rule: NamingRule::SeparatorCount { found: separators },
            });
        }

        let spaces = candidate.matches(FORBIDDEN_SPACE).count();
        if spaces > 0 {
            return Err(ProfileError::NamingConvention {
                base_name: candidate.to_string(),
                rule: NamingRule::ContainsSpace { found: spaces },
            });
        }

        Ok(())
    }
}

/// A base name that has passed [`NamingValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeviceBaseName(String);

impl DeviceBaseName {
    /// Validate a candidate string and wrap it.
    pub fn parse(candidate: impl Into<String>) -> Result<Self, ProfileError> {
        let candidate = candidate.into();
        NamingValidator::validate(&candidate)?;
        Ok(Self(candidate))
    }

    /// Derive and validate the base name of a firmware artifact.
    ///
    /// A leaf that is not valid UTF-8 is refused, so derived paths always
    /// name the directory extraction writes.
    pub fn from_artifact(artifact: &FirmwareArtifact) -> Result<Self, ProfileError> {
        let path = artifact.as_path();
        if path.file_name().is_some_and(|leaf| leaf.to_str().is_none()) {
            return Err(ProfileError::NamingConvention {
                base_name: derive_base_name(path),
                rule: NamingRule::NotUtf8,
            });
        }
        Self::parse(derive_base_name(path))
    }

    /// Get the base name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceBaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
