//! # Pipeline Orchestrator
//!
//! Drives one profile build through a strictly linear state machine:
//!
//! ```text
//! Start → NameValidated → Extracted → Disassembled → StorageParsed → AppParsed
//!       → SchemaStageDone → {SchemaConfirmed | SchemaMissing}
//!       → {ProfileGenerated | Aborted}
//! ```
//!
//! ## Rules
//!
//! - Name validation happens in [`PreparedRun::prepare`], before any stage.
//! - A failing stage moves the run to `Aborted`; later stages never run.
//! - Files written by completed stages are left in place.
//! - Profile generation runs only if [`SchemaGate`] confirms the schema file.
//! - No retries. No concurrency.

use crate::fingerprint;
use crate::gate::{GateDecision, SchemaGate};
use crate::naming::DeviceBaseName;
use crate::paths::PipelineContext;
use crate::report::{PlannedStage, RunOutcome, RunReport, StageRecord};
use crate::{FirmwareArtifact, ProfileError, StageInput, StageKind, StageSet, Token};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

// =============================================================================
// PIPELINE STATE
// =============================================================================

/// States of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Start,
    NameValidated,
    Extracted,
    Disassembled,
    StorageParsed,
    AppParsed,
    SchemaStageDone,
    SchemaConfirmed,
    SchemaMissing,
    ProfileGenerated,
    Aborted,
}

impl PipelineState {
    /// State reached when `kind` returns normally.
    #[must_use]
    pub fn after(kind: StageKind) -> Self {
        match kind {
            StageKind::Extraction => PipelineState::Extracted,
            StageKind::Disassembly => PipelineState::Disassembled,
            StageKind::StorageParsing => PipelineState::StorageParsed,
            StageKind::AppParsing => PipelineState::AppParsed,
            StageKind::SchemaResolution => PipelineState::SchemaStageDone,
            StageKind::ProfileGeneration => PipelineState::ProfileGenerated,
        }
    }

    /// Check if the run can go no further.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::ProfileGenerated | PipelineState::Aborted)
    }
}

// =============================================================================
// REQUEST / PREPARED RUN
// =============================================================================

/// What the caller asks for: one artifact and maybe a token.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub artifact: FirmwareArtifact,
    pub token: Option<Token>,
}

impl RunRequest {
    /// Bundle an artifact with an optional token.
    #[must_use]
    pub fn new(artifact: FirmwareArtifact, token: Option<Token>) -> Self {
        Self { artifact, token }
    }
}

/// A request whose name has been validated and whose paths are derived.
///
/// Holding one of these means the run is in `NameValidated`.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    artifact: FirmwareArtifact,
    base_name: DeviceBaseName,
    context: PipelineContext,
    token: Option<Token>,
}

impl PreparedRun {
    /// Validate the base name and derive the layout. No I/O.
    pub fn prepare(request: RunRequest) -> Result<Self, ProfileError> {
        let base_name = DeviceBaseName::from_artifact(&request.artifact)?;
        let context = PipelineContext::resolve(&request.artifact, &base_name);

        Ok(Self {
            artifact: request.artifact,
            base_name,
            context,
            token: request.token,
        })
    }

    /// Re-root a relative artifact under `cwd` and derive the layout again.
    ///
    /// Stages may run in another directory; absolute paths keep what they
    /// write and what [`SchemaGate`] checks pointing at the same file.
    #[must_use]
    pub fn anchored_at(self, cwd: &Path) -> Self {
        if self.artifact.as_path().is_absolute() {
            return self;
        }

        let artifact = FirmwareArtifact::new(cwd.join(self.artifact.as_path()));
        let context = PipelineContext::resolve(&artifact, &self.base_name);
        Self {
            artifact,
            context,
            ..self
        }
    }

    /// The firmware image being processed.
    #[must_use]
    pub fn artifact(&self) -> &FirmwareArtifact {
        &self.artifact
    }

    /// The validated base name.
    #[must_use]
    pub fn base_name(&self) -> &DeviceBaseName {
        &self.base_name
    }

    /// Paths derived from the artifact and base name.
    #[must_use]
    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Check if a token will be handed to schema resolution.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn input_for(&self, kind: StageKind) -> StageInput<'_> {
        StageInput {
            kind,
            path: kind.input_path(&self.artifact, &self.context),
            token: if kind.accepts_token() {
                self.token.as_ref()
            } else {
                None
            },
        }
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Sequential orchestrator over an injected [`StageSet`].
#[derive(Debug)]
pub struct Pipeline {
    stages: StageSet,
}

impl Pipeline {
    /// Create an orchestrator over `stages`.
    #[must_use]
    pub fn new(stages: StageSet) -> Self {
        Self { stages }
    }

    /// Describe every stage without running anything.
    #[must_use]
    pub fn plan(&self, run: &PreparedRun) -> Vec<PlannedStage> {
        StageKind::ALL
            .iter()
            .map(|&kind| {
                let input = run.input_for(kind);
                PlannedStage {
                    stage: kind,
                    input: input.path.to_path_buf(),
                    command: self.stages.get(kind).describe(&input),
                    gated: kind.is_terminal(),
                }
            })
            .collect()
    }

    /// Execute the run to completion or first failure.
    ///
    /// Stage failures and a missing schema are reported through
    /// [`RunReport::outcome`], never by panicking.
    #[must_use]
    pub fn run(&self, run: &PreparedRun) -> RunReport {
        let mut trace = Trace::new();
        let fingerprint = fingerprint::best_effort(run.artifact.as_path());

        let outcome = match self.drive(run, &mut trace) {
            Ok(()) => RunOutcome::ProfileGenerated,
            Err(ProfileError::SchemaMissing { path }) => {
                trace.enter(PipelineState::Aborted);
                RunOutcome::SchemaMissing {
                    schema_id_file: path,
                }
            }
            Err(ProfileError::StageFailed { stage, source }) => {
                tracing::error!(stage = %stage, "Stage failed: {}", source);
                trace.enter(PipelineState::Aborted);
                RunOutcome::Aborted {
                    stage,
                    error: source.to_string(),
                }
            }
            Err(other) => {
                trace.enter(PipelineState::Aborted);
                RunOutcome::Aborted {
                    stage: trace.current_stage(),
                    error: other.to_string(),
                }
            }
        };

        RunReport {
            artifact: run.artifact.clone(),
            base_name: run.base_name.clone(),
            context: run.context.clone(),
            fingerprint,
            stages: trace.records,
            gate: trace.gate,
            states: trace.states,
            outcome,
        }
    }

    fn drive(&self, run: &PreparedRun, trace: &mut Trace) -> Result<(), ProfileError> {
        for kind in StageKind::ALL {
            if kind.is_terminal() {
                let decision = SchemaGate::check(&run.context.schema_id_file);
                trace.gate = Some(decision);
                match decision {
                    GateDecision::Confirmed => {
                        tracing::debug!(
                            path = %run.context.schema_id_file.display(),
                            "Schema confirmed"
                        );
                        trace.enter(PipelineState::SchemaConfirmed);
                    }
                    GateDecision::Missing => {
                        tracing::warn!(
                            path = %run.context.schema_id_file.display(),
                            "Schema identifier file not found after schema resolution"
                        );
                        trace.enter(PipelineState::SchemaMissing);
                        return Err(ProfileError::SchemaMissing {
                            path: run.context.schema_id_file.clone(),
                        });
                    }
                }
            }

            self.run_stage(run, kind, trace)?;
        }

        Ok(())
    }

    fn run_stage(
        &self,
        run: &PreparedRun,
        kind: StageKind,
        trace: &mut Trace,
    ) -> Result<(), ProfileError> {
        let input = run.input_for(kind);
        trace.pending = Some(kind);

        tracing::info!(stage = %kind, path = %input.path.display(), "Stage started");
        let started = Instant::now();

        let outcome = self
            .stages
            .get(kind)
            .run(&input)
            .map_err(|source| ProfileError::StageFailed { stage: kind, source })?;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(stage = %kind, elapsed_ms, "Stage finished");

        trace.records.push(StageRecord {
            stage: kind,
            outcome,
            elapsed_ms,
        });
        trace.enter(PipelineState::after(kind));
        Ok(())
    }
}

/// Mutable bookkeeping for one run.
struct Trace {
    states: Vec<PipelineState>,
    records: Vec<StageRecord>,
    gate: Option<GateDecision>,
    pending: Option<StageKind>,
}

impl Trace {
    fn new() -> Self {
        Self {
            states: vec![PipelineState::Start, PipelineState::NameValidated],
            records: Vec::new(),
            gate: None,
            pending: None,
        }
    }

    fn enter(&mut self, state: PipelineState) {
        tracing::debug!(?state, "Pipeline transition");
        self.states.push(state);
    }

    fn current_stage(&self) -> StageKind {
        self.pending.unwrap_or(StageKind::Extraction)
    }
}

// =============================================================================
// TESTS
// =============================================================================
