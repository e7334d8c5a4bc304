//! # Stage Contract
//!
//! The six external processing steps of a profile build, in the only order
//! they ever run:
//!
//! | # | Stage | Input path |
//! |---|-------|------------|
//! | 1 | Extraction | firmware artifact |
//! | 2 | Disassembly | decrypted app file |
//! | 3 | StorageParsing | storage file |
//! | 4 | AppParsing | decrypted app file |
//! | 5 | SchemaResolution | extraction directory (+ optional token) |
//! | 6 | ProfileGeneration | extraction directory |
//!
//! Stage 6 only runs once the schema gate has confirmed the schema file.
//! Each stage is opaque: the orchestrator hands it one path and looks only at
//! whether it returned `Ok` or `Err`.

use crate::paths::PipelineContext;
use crate::{FirmwareArtifact, StageError, Token};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// STAGE KIND
// =============================================================================

/// Identifies one stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Decrypt the firmware image and unpack its partitions.
    Extraction,
    /// Disassemble the application and scan for known patterns.
    Disassembly,
    /// Parse the storage partition.
    StorageParsing,
    /// Parse the application partition.
    AppParsing,
    /// Look up the device schema, possibly over the network.
    SchemaResolution,
    /// Render the final profile.
    ProfileGeneration,
}

impl StageKind {
    /// Every stage, in execution order.
    pub const ALL: [StageKind; 6] = [
        StageKind::Extraction,
        StageKind::Disassembly,
        StageKind::StorageParsing,
        StageKind::AppParsing,
        StageKind::SchemaResolution,
        StageKind::ProfileGeneration,
    ];

    /// Get the stage name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Extraction => "extraction",
            StageKind::Disassembly => "disassembly",
            StageKind::StorageParsing => "storage parsing",
            StageKind::AppParsing => "app parsing",
            StageKind::SchemaResolution => "schema resolution",
            StageKind::ProfileGeneration => "profile generation",
        }
    }

    /// Get the key naming this stage in configuration files.
    #[must_use]
    pub fn config_key(&self) -> &'static str {
        match self {
            StageKind::Extraction => "extraction",
            StageKind::Disassembly => "disassembly",
            StageKind::StorageParsing => "storage_parsing",
            StageKind::AppParsing => "app_parsing",
            StageKind::SchemaResolution => "schema_resolution",
            StageKind::ProfileGeneration => "profile_generation",
        }
    }

    /// Position in execution order, starting at 0.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            StageKind::Extraction => 0,
            StageKind::Disassembly => 1,
            StageKind::StorageParsing => 2,
            StageKind::AppParsing => 3,
            StageKind::SchemaResolution => 4,
            StageKind::ProfileGeneration => 5,
        }
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<StageKind> {
        StageKind::ALL.get(self.index().saturating_add(1)).copied()
    }

    /// Check if this stage is terminal (profile generation).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageKind::ProfileGeneration)
    }

    /// Whether this stage receives the optional token.
    #[must_use]
    pub fn accepts_token(&self) -> bool {
        matches!(self, StageKind::SchemaResolution)
    }

    /// The path this stage is invoked with.
    #[must_use]
    pub fn input_path<'a>(
        &self,
        artifact: &'a FirmwareArtifact,
        ctx: &'a PipelineContext,
    ) -> &'a Path {
        match self {
            StageKind::Extraction => artifact.as_path(),
            StageKind::Disassembly | StageKind::AppParsing => &ctx.app_file,
            StageKind::StorageParsing => &ctx.storage_file,
            StageKind::SchemaResolution | StageKind::ProfileGeneration => {
                &ctx.extracted_location
            }
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// STAGE TRAIT
// =============================================================================

/// What a stage is handed when it runs.
#[derive(Debug, Clone, Copy)]
pub struct StageInput<'a> {
    /// Which stage is running.
    pub kind: StageKind,
    /// The single path the stage works on.
    pub path: &'a Path,
    /// Credential for schema resolution; always `None` for other stages.
    pub token: Option<&'a Token>,
}

/// What a stage reports when it returns normally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    /// The stage returned; it made no claim about what it wrote.
    Completed,
    /// The stage returned and names an artifact it wrote.
    Produced(PathBuf),
}

/// A processing step the orchestrator can invoke.
///
/// Implementations are synchronous and may block for as long as they need.
/// Anything a stage writes goes into the extraction directory.
pub trait Stage {
    /// Run the stage once.
    fn run(&self, input: &StageInput<'_>) -> Result<StageOutcome, StageError>;

    /// Human-readable description used by dry runs and logs.
    fn describe(&self, input: &StageInput<'_>) -> String {
        format!("{} {}", input.kind, input.path.display())
    }
}

// =============================================================================
// STAGE SET
// =============================================================================

/// One implementation per [`StageKind`], injected into the pipeline.
pub struct StageSet {
    stages: [Box<dyn Stage>; 6],
}

impl StageSet {
    /// Build a set by asking `make` for each stage in execution order.
    pub fn from_fn(make: impl FnMut(StageKind) -> Box<dyn Stage>) -> Self {
        Self {
            stages: StageKind::ALL.map(make),
        }
    }

    /// Get the implementation for `kind`.
    #[must_use]
    pub fn get(&self, kind: StageKind) -> &dyn Stage {
        self.stages[kind.index()].as_ref()
    }
}

impl std::fmt::Debug for StageSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageSet")
            .field("stages", &StageKind::ALL.len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
