//! # firmprofile-core
//!
//! The pipeline orchestrator for building a device profile from one full
//! encrypted firmware image - THE LOGIC.
//!
//! This crate owns every decision a profile build makes:
//! - whether the firmware file name follows the naming convention
//! - where each intermediate artifact lives
//! - in which order the stages run, and when to stop
//! - whether the schema is present so the profile may be rendered
//!
//! The stages themselves (decryption, disassembly, partition parsing, schema
//! lookup, rendering) are opaque collaborators behind the [`Stage`] trait.
//!
//! ## Architectural Constraints
//!
//! - No async, no threads, no process spawning
//! - One stage runs at a time; the first failure ends the run
//! - Path derivation is pure

// =============================================================================
// MODULES
// =============================================================================

pub mod fingerprint;
pub mod gate;
pub mod naming;
pub mod paths;
pub mod pipeline;
pub mod primitives;
pub mod report;
pub mod system;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{FirmwareArtifact, NamingRule, ProfileError, StageError, Token};

// =============================================================================
// RE-EXPORTS: Orchestration
// =============================================================================

pub use gate::{GateDecision, SchemaGate};
pub use naming::{DeviceBaseName, NamingValidator, derive_base_name};
pub use paths::PipelineContext;
pub use pipeline::{Pipeline, PipelineState, PreparedRun, RunRequest};
pub use report::{PlannedStage, RunOutcome, RunReport, StageRecord};

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::{Stage, StageInput, StageKind, StageOutcome, StageSet};

#[cfg(feature = "crypto-hash")]
pub use fingerprint::artifact_fingerprint;
