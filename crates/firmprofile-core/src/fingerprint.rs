//! # Artifact Fingerprint
//!
//! BLAKE3 digest of the input firmware image, recorded in the run report so
//! two profiles can be traced back to the same dump.
//!
//! Only available with the `crypto-hash` feature. Without it the report
//! carries no fingerprint.

use std::path::Path;

#[cfg(feature = "crypto-hash")]
use crate::ProfileError;

/// Hex-encoded BLAKE3 digest of the file at `path`.
#[cfg(feature = "crypto-hash")]
pub fn artifact_fingerprint(path: &Path) -> Result<String, ProfileError> {
    let data = std::fs::read(path).map_err(|e| {
        ProfileError::Io(format!("Cannot read '{}' for hashing: {}", path.display(), e))
    })?;
    Ok(blake3::hash(&data).to_hex().to_string())
}

/// Fingerprint for the report; a read failure is logged and yields `None`.
///
/// Extraction reports the real problem with an unreadable artifact.
#[cfg(feature = "crypto-hash")]
pub(crate) fn best_effort(path: &Path) -> Option<String> {
    match artifact_fingerprint(path) {
        Ok(hex) => Some(hex),
        Err(e) => {
            tracing::warn!("Skipping artifact fingerprint: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "crypto-hash"))]
pub(crate) fn best_effort(_path: &Path) -> Option<String> {
    None
}
