//! # Path Resolution
//!
//! Pure derivation of the working layout for one firmware image:
//!
//! ```text
//! <parent>/<base>.bin
//! <parent>/<base>/                              extraction directory
//! <parent>/<base>/<base>_storage.json
//! <parent>/<base>/<base>_app_1.00_decrypted.bin
//! <parent>/<base>/<base>_schema_id.txt
//! ```
//!
//! No filesystem access happens here.

use crate::naming::DeviceBaseName;
use crate::primitives::{APP_SUFFIX, SCHEMA_ID_SUFFIX, STORAGE_SUFFIX};
use crate::FirmwareArtifact;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Read-only bundle of the paths every stage works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineContext {
    /// Parsed storage partition.
    pub storage_file: PathBuf,
    /// Decrypted application partition.
    pub app_file: PathBuf,
    /// Written by schema resolution when a schema is found.
    pub schema_id_file: PathBuf,
    /// Working directory shared by all stages.
    pub extracted_location: PathBuf,
}

impl PipelineContext {
    /// Derive the layout for `artifact` named `base`.
    #[must_use]
    pub fn resolve(artifact: &FirmwareArtifact, base: &DeviceBaseName) -> Self {
        let parent = artifact.as_path().parent().unwrap_or(Path::new(""));
        let extracted_location = parent.join(base.as_str());

        let suffixed = |suffix: &str| extracted_location.join(format!("{}{}", base, suffix));

        Self {
            storage_file: suffixed(STORAGE_SUFFIX),
            app_file: suffixed(APP_SUFFIX),
            schema_id_file: suffixed(SCHEMA_ID_SUFFIX),
            extracted_location,
        }
    }
}
