//! # Run Report
//!
//! Serializable record of one profile build: what was derived, which stages
//! ran, how long each took, and how the run ended.

use crate::gate::GateDecision;
use crate::naming::DeviceBaseName;
use crate::paths::PipelineContext;
use crate::pipeline::PipelineState;
use crate::primitives::{EXIT_STAGE_FAILURE, EXIT_SUCCESS, EXIT_USAGE_OR_SCHEMA_MISSING};
use crate::{FirmwareArtifact, StageKind, StageOutcome};
use serde::Serialize;
use std::path::PathBuf;

/// One stage that returned normally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub stage: StageKind,
    pub outcome: StageOutcome,
    pub elapsed_ms: u64,
}

/// How a run that got past name validation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every stage ran and the profile was rendered.
    ProfileGenerated,
    /// Schema resolution returned but the schema file is absent.
    SchemaMissing { schema_id_file: PathBuf },
    /// A stage failed; nothing after it ran.
    Aborted { stage: StageKind, error: String },
}

impl RunOutcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::ProfileGenerated => EXIT_SUCCESS,
            RunOutcome::SchemaMissing { .. } => EXIT_USAGE_OR_SCHEMA_MISSING,
            RunOutcome::Aborted { .. } => EXIT_STAGE_FAILURE,
        }
    }

    /// Check if the profile was generated.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::ProfileGenerated)
    }
}

/// Summary of a single invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub artifact: FirmwareArtifact,
    pub base_name: DeviceBaseName,
    pub context: PipelineContext,
    /// BLAKE3 of the artifact, when the `crypto-hash` feature is on and the file was readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    pub stages: Vec<StageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateDecision>,
    /// Every state the run passed through, starting at `Start`.
    pub states: Vec<PipelineState>,
    pub outcome: RunOutcome,
}

impl RunReport {
    /// The state the run ended in.
    #[must_use]
    pub fn final_state(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Start)
    }

    /// Stages that returned normally, in order.
    #[must_use]
    pub fn completed_stages(&self) -> Vec<StageKind> {
        self.stages.iter().map(|r| r.stage).collect()
    }

    /// Process exit status for this run.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }
}

/// A stage as it would run, for dry runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStage {
    pub stage: StageKind,
    pub input: PathBuf,
    pub command: String,
    /// Profile generation is conditional on the schema gate.
    pub gated: bool,
}
