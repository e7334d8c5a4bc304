//! # Core Type Definitions
//!
//! This module contains the value types shared across the pipeline:
//! - Input identifiers (`FirmwareArtifact`, `Token`)
//! - Naming rule identifiers (`NamingRule`)
//! - Error types (`ProfileError`, `StageError`)
//!
//! ## Immutability
//!
//! Every value here is created once per invocation and never mutated.

use crate::primitives::{
    EXIT_CONFIG_ERROR, EXIT_NAMING_VIOLATION, EXIT_STAGE_FAILURE, EXIT_USAGE_OR_SCHEMA_MISSING,
    FORBIDDEN_SPACE, SEPARATOR,
};
use crate::system::StageKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// FIRMWARE ARTIFACT
// =============================================================================

/// The full encrypted firmware image handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareArtifact(PathBuf);

impl FirmwareArtifact {
    /// Wrap an input path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Borrow the underlying path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for FirmwareArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

// =============================================================================
// TOKEN
// =============================================================================

/// Opaque credential forwarded to schema resolution.
///
/// The pipeline never inspects the content. `Debug` is redacted so a token
/// cannot leak through logging.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Build a token from an optional command line value.
    ///
    /// Absent and empty values both mean "no token".
    #[must_use]
    pub fn from_arg(value: Option<String>) -> Option<Self> {
        value.filter(|v| !v.is_empty()).map(Self)
    }

    /// Get the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

// =============================================================================
// NAMING RULES
// =============================================================================

/// The structural rule a base name broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingRule {
    /// The separator must appear exactly once.
    SeparatorCount { found: usize },
    /// Literal spaces are not allowed.
    ContainsSpace { found: usize },
    /// The file name must be valid UTF-8.
    NotUtf8,
}

impl std::fmt::Display for NamingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamingRule::SeparatorCount { found } => write!(
                f,
                "expected exactly 1 '{}' separator, found {}",
                SEPARATOR, found
            ),
            NamingRule::ContainsSpace { found } => write!(
                f,
                "expected no '{}' characters, found {}",
                FORBIDDEN_SPACE.escape_default(),
                found
            ),
            NamingRule::NotUtf8 => f.write_str("expected a UTF-8 file name"),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Failure signalled by a single stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// The stage program could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The stage program exited with a non-zero status.
    #[error("'{program}' exited with status {code}")]
    NonZeroExit { program: String, code: i32 },

    /// The stage program was terminated without an exit status.
    #[error("'{program}' was terminated by a signal")]
    Terminated { program: String },

    /// An in-process stage reported failure.
    #[error("{0}")]
    Failed(String),
}

/// Errors that end a profile build.
///
/// - No silent failures
/// - Each variant maps to exactly one exit status via [`ProfileError::exit_code`]
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The base name does not follow the filename convention.
    #[error("Base name '{base_name}' violates the naming convention: {rule}")]
    NamingConvention { base_name: String, rule: NamingRule },

    /// A stage signalled failure; later stages were not run.
    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: StageKind,
        #[source]
        source: StageError,
    },

    /// Schema resolution completed but no schema identifier file exists.
    #[error("Profile incomplete because schema remains missing: {}", path.display())]
    SchemaMissing { path: PathBuf },

    /// Stage configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O error occurred outside of a stage.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ProfileError {
    /// Process exit status for this failure class.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            ProfileError::NamingConvention { .. } => EXIT_NAMING_VIOLATION,
            ProfileError::SchemaMissing { .. } => EXIT_USAGE_OR_SCHEMA_MISSING,
            ProfileError::StageFailed { .. } | ProfileError::Io(_) => EXIT_STAGE_FAILURE,
            ProfileError::Config(_) => EXIT_CONFIG_ERROR,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
