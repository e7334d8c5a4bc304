//! # Stage Configuration
//!
//! Maps every stage to the external program that implements it.
//!
//! ## Lookup Order
//!
//! 1. `--config <PATH>`
//! 2. `FIRMPROFILE_CONFIG`
//! 3. `./firmprofile.toml`, if present
//! 4. Built-in defaults (`python3 -m <module>`)
//!
//! ## Format
//!
//! ```toml
//! working_dir = "/opt/profile-tools"
//!
//! [stages.extraction]
//! program = "python3"
//! args = ["-m", "extract"]
//!
//! [stages.schema_resolution]
//! program = "python3"
//! args = ["-m", "pull_schema"]
//! token_flag = "--token"
//! ```
//!
//! Stages missing from the file keep their default command.

use firmprofile_core::{ProfileError, StageKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "FIRMPROFILE_CONFIG";

/// Configuration file picked up from the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "firmprofile.toml";

/// Interpreter used by the built-in stage commands.
const DEFAULT_PROGRAM: &str = "python3";

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// STAGE COMMAND
// =============================================================================

/// How one stage is launched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageCommand {
    /// Executable name or path.
    pub program: String,
    /// Arguments placed before the stage path.
    #[serde(default)]
    pub args: Vec<String>,
    /// Flag preceding the token; the token is positional when unset.
    #[serde(default)]
    pub token_flag: Option<String>,
}

impl StageCommand {
    /// Built-in command for `kind`.
    #[must_use]
    pub fn default_for(kind: StageKind) -> Self {
        let module = match kind {
            StageKind::Extraction => "extract",
            StageKind::Disassembly => "haxomatic",
            StageKind::StorageParsing => "process_storage",
            StageKind::AppParsing => "process_app",
            StageKind::SchemaResolution => "pull_schema",
            StageKind::ProfileGeneration => "generate_profile_classic",
        };

        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: vec!["-m".to_string(), module.to_string()],
            token_flag: None,
        }
    }
}

// =============================================================================
// PIPELINE CONFIG
// =============================================================================

/// Full stage configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Current directory for every stage process; inherited when unset.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Per-stage overrides keyed by stage (`extraction`, `schema_resolution`, ...).
    #[serde(default)]
    pub stages: BTreeMap<StageKind, StageCommand>,
}

impl PipelineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ProfileError> {
        let config: Self =
            toml::from_str(text).map_err(|e| ProfileError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            ProfileError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ProfileError::Config(format!(
                "'{}' is {} bytes, maximum is {}",
                path.display(),
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            ProfileError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text).map_err(|e| match e {
            ProfileError::Config(msg) => {
                ProfileError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Locate and load the configuration, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ProfileError> {
        let env_value = std::env::var_os(CONFIG_ENV).map(PathBuf::from);

        match locate(explicit, env_value, Path::new(DEFAULT_CONFIG_FILE)) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading stage configuration");
                Self::from_file(&path)
            }
            None => {
                tracing::debug!("No configuration file, using built-in stage commands");
                Ok(Self::default())
            }
        }
    }

    /// Command for `kind`, configured or built-in.
    #[must_use]
    pub fn command_for(&self, kind: StageKind) -> StageCommand {
        self.stages
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| StageCommand::default_for(kind))
    }

    fn validate(&self) -> Result<(), ProfileError> {
        for (kind, command) in &self.stages {
            if command.program.trim().is_empty() {
                return Err(ProfileError::Config(format!(
                    "stages.{}.program must not be empty",
                    kind.config_key()
                )));
            }
            if command.token_flag.is_some() && !kind.accepts_token() {
                return Err(ProfileError::Config(format!(
                    "stages.{}.token_flag is only valid for schema_resolution",
                    kind.config_key()
                )));
            }
        }
        Ok(())
    }
}

/// Pick the configuration file to load.
///
/// An explicit path or environment value is returned even if it does not
/// exist, so loading reports the problem. The fallback file is only used if
/// it exists.
#[must_use]
pub fn locate(
    explicit: Option<&Path>,
    env_value: Option<PathBuf>,
    fallback: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_value.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }
    fallback.is_file().then(|| fallback.to_path_buf())
}
