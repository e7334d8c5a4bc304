//! # Pipeline Orchestration Tests
//!
//! Drive the orchestrator with in-memory stages that record every call.
//!
//! ## Groups
//! - Fail-fast ordering
//! - Schema gate
//! - Token pass-through

// Allow panic in tests - used to report unexpected outcomes
#![allow(clippy::panic)]

use firmprofile_core::{
    FirmwareArtifact, GateDecision, Pipeline, PipelineState, PreparedRun, ProfileError,
    RunOutcome, RunRequest, Stage, StageError, StageInput, StageKind, StageOutcome, StageSet,
    Token,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

// =============================================================================
// HELPERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct Call {
    kind: StageKind,
    path: PathBuf,
    token: Option<String>,
}

#[derive(Clone, Default)]
struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    fn kinds(&self) -> Vec<StageKind> {
        self.0.borrow().iter().map(|c| c.kind).collect()
    }

    fn call(&self, kind: StageKind) -> Option<Call> {
        self.0.borrow().iter().find(|c| c.kind == kind).cloned()
    }
}

#[derive(Clone)]
enum Behavior {
    Succeed,
    Fail,
    /// Write this file, then succeed.
    Write(PathBuf),
    /// Claim this file was produced without writing it.
    Claim(PathBuf),
}

struct Scripted {
    journal: Journal,
    behavior: Behavior,
}

impl Stage for Scripted {
    fn run(&self, input: &StageInput<'_>) -> Result<StageOutcome, StageError> {
        self.journal.0.borrow_mut().push(Call {
            kind: input.kind,
            path: input.path.to_path_buf(),
            token: input.token.map(|t| t.as_str().to_string()),
        });

        match &self.behavior {
            Behavior::Succeed => Ok(StageOutcome::Completed),
            Behavior::Fail => Err(StageError::Failed(format!("{} exploded", input.kind))),
            Behavior::Write(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| StageError::Failed(e.to_string()))?;
                }
                std::fs::write(path, b"schema-42").map_err(|e| StageError::Failed(e.to_string()))?;
                Ok(StageOutcome::Produced(path.clone()))
            }
            Behavior::Claim(path) => Ok(StageOutcome::Produced(path.clone())),
        }
    }
}

/// Pipeline where `pick` decides each stage's behavior.
fn pipeline(journal: &Journal, mut pick: impl FnMut(StageKind) -> Behavior) -> Pipeline {
    Pipeline::new(StageSet::from_fn(|kind| {
        Box::new(Scripted {
            journal: journal.clone(),
            behavior: pick(kind),
        })
    }))
}

fn prepare(path: &Path, token: Option<&str>) -> PreparedRun {
    PreparedRun::prepare(RunRequest::new(
        FirmwareArtifact::new(path),
        Token::from_arg(token.map(str::to_string)),
    ))
    .expect("valid name")
}

fn schema_file(dir: &Path) -> PathBuf {
    dir.join("Acme-Router_ModelX")
        .join("Acme-Router_ModelX_schema_id.txt")
}

// =============================================================================
// FAIL-FAST ORDERING
// =============================================================================

mod fail_fast {
    use super::*;

    #[test]
    fn happy_path_runs_every_stage_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact = dir.path().join("Acme-Router_ModelX.bin");
        let schema = schema_file(dir.path());
        let journal = Journal::default();

        let p = pipeline(&journal, |kind| match kind {
            StageKind::SchemaResolution => Behavior::Write(schema.clone()),
            _ => Behavior::Succeed,
        });
        let report = p.run(&prepare(&artifact, None));

        assert_eq!(report.outcome, RunOutcome::ProfileGenerated);
        assert_eq!(journal.kinds(), StageKind::ALL.to_vec());
        assert_eq!(report.completed_stages(), StageKind::ALL.to_vec());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(
            report.states,
            vec![
                PipelineState::Start,
                PipelineState::NameValidated,
                PipelineState::Extracted,
                PipelineState::Disassembled,
                PipelineState::StorageParsed,
                PipelineState::AppParsed,
                PipelineState::SchemaStageDone,
                PipelineState::SchemaConfirmed,
                PipelineState::ProfileGenerated,
            ]
        );
    }

    #[test]
    fn failure_at_each_stage_stops_everything_after_it() {
        for failing in StageKind::ALL {
            let dir = tempfile::tempdir().expect("tempdir");
            let artifact = dir.path().join("Acme-Router_ModelX.bin");
            let schema = schema_file(dir.path());
            let journal = Journal::default();

            let p = pipeline(&journal, |kind| {
                if kind == failing {
                    Behavior::Fail
                } else if kind == StageKind::SchemaResolution {
                    Behavior::Write(schema.clone())
                } else {
                    Behavior::Succeed
                }
            });
            let report = p.run(&prepare(&artifact, None));

            let expected: Vec<_> = StageKind::ALL
                .iter()
                .copied()
                .take_while(|k| *k <= failing)
                .collect();
            assert_eq!(journal.kinds(), expected, "failing stage {}", failing);
            assert_eq!(report.final_state(), PipelineState::Aborted);
            assert_eq!(report.exit_code(), 3);
            match &report.outcome {
                RunOutcome::Aborted { stage, error } => {
                    assert_eq!(*stage, failing);
                    assert!(error.contains("exploded"));
                }
                other => panic!("expected abort, got {:?}", other),
            }
        }
    }

    #[test]
    fn earlier_artifacts_are_left_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact = dir.path().join("Acme-Router_ModelX.bin");
        let storage = dir
            .path()
            .join("Acme-Router_ModelX")
            .join("Acme-Router_ModelX_storage.json");
        let journal = Journal::default();

        let p = pipeline(&journal, |kind| match kind {
            StageKind::Extraction => Behavior::Write(storage.clone()),
            StageKind::Disassembly => Behavior::Fail,
            _ => Behavior::Succeed,
        });
        let report = p.run(&prepare(&artifact, None));

        assert!(matches!(report.outcome, RunOutcome::Aborted { .. }));
        assert!(storage.exists());
    }

    #[test]
    fn stages_receive_derived_paths() {
        let journal = Journal::default();
        let p = pipeline(&journal, |_| Behavior::Succeed);
        let _ = p.run(&prepare(Path::new("/nonexistent/Acme-Router_ModelX.bin"), None));

        let dir = Path::new("/nonexistent/Acme-Router_ModelX");
        assert_eq!(
            journal.call(StageKind::Extraction).expect("ran").path,
            PathBuf::from("/nonexistent/Acme-Router_ModelX.bin")
        );
        assert_eq!(
            journal.call(StageKind::Disassembly).expect("ran").path,
            dir.join("Acme-Router_ModelX_app_1.00_decrypted.bin")
        );
        assert_eq!(
            journal.call(StageKind::StorageParsing).expect("ran").path,
            dir.join("Acme-Router_ModelX_storage.json")
        );
        assert_eq!(
            journal.call(StageKind::SchemaResolution).expect("ran").path,
            dir.to_path_buf()
        );
    }

    #[test]
    fn naming_violation_runs_nothing() {
        for name in ["Acme Router_Model.bin", "Acme_Router_Model.bin"] {
            let result = PreparedRun::prepare(RunRequest::new(FirmwareArtifact::new(name), None));
            let err = result.expect_err("invalid name");
            assert!(matches!(err, ProfileError::NamingConvention { .. }));
            assert_eq!(err.exit_code(), 2);
        }
    }
}

// =============================================================================
// SCHEMA GATE
// =============================================================================

mod schema_gate {
    use super::*;

    #[test]
    fn missing_schema_skips_generation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact = dir.path().join("Acme-Router_ModelX.bin");
        let journal = Journal::default();

        let p = pipeline(&journal, |_| Behavior::Succeed);
        let report = p.run(&prepare(&artifact, None));

        assert_eq!(
            report.outcome,
            RunOutcome::SchemaMissing {
                schema_id_file: schema_file(dir.path())
            }
        );
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.gate, Some(GateDecision::Missing));
        assert!(journal.call(StageKind::ProfileGeneration).is_none());
        assert!(journal.call(StageKind::SchemaResolution).is_some());
        assert_eq!(
            report.states[report.states.len() - 2..],
            [PipelineState::SchemaMissing, PipelineState::Aborted]
        );
    }

    #[test]
    fn claimed_but_unwritten_schema_is_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact = dir.path().join("Acme-Router_ModelX.bin");
        let schema = schema_file(dir.path());
        let journal = Journal::default();

        let p = pipeline(&journal, |kind| match kind {
            StageKind::SchemaResolution => Behavior::Claim(schema.clone()),
            _ => Behavior::Succeed,
        });
        let report = p.run(&prepare(&artifact, None));

        assert!(matches!(report.outcome, RunOutcome::SchemaMissing { .. }));
        assert!(journal.call(StageKind::ProfileGeneration).is_none());
    }

    #[test]
    fn schema_written_by_earlier_stage_is_confirmed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact = dir.path().join("Acme-Router_ModelX.bin");
        let schema = schema_file(dir.path());
        let journal = Journal::default();

        let p = pipeline(&journal, |kind| match kind {
            StageKind::Extraction => Behavior::Write(schema.clone()),
            _ => Behavior::Succeed,
        });
        let report = p.run(&prepare(&artifact, None));

        assert_eq!(report.gate, Some(GateDecision::Confirmed));
        assert_eq!(report.outcome, RunOutcome::ProfileGenerated);
        assert_eq!(
            journal.call(StageKind::ProfileGeneration).expect("ran").path,
            dir.path().join("Acme-Router_ModelX")
        );
    }

    #[test]
    fn generation_failure_after_confirmation_aborts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact = dir.path().join("Acme-Router_ModelX.bin");
        let schema = schema_file(dir.path());
        let journal = Journal::default();

        let p = pipeline(&journal, |kind| match kind {
            StageKind::SchemaResolution => Behavior::Write(schema.clone()),
            StageKind::ProfileGeneration => Behavior::Fail,
            _ => Behavior::Succeed,
        });
        let report = p.run(&prepare(&artifact, None));

        assert_eq!(report.gate, Some(GateDecision::Confirmed));
        assert!(matches!(
            report.outcome,
            RunOutcome::Aborted {
                stage: StageKind::ProfileGeneration,
                ..
            }
        ));
    }
}

// =============================================================================
// TOKEN PASS-THROUGH
// =============================================================================

mod token {
    use super::*;

    fn run_with(token: Option<&str>) -> Journal {
        let journal = Journal::default();
        let p = pipeline(&journal, |_| Behavior::Succeed);
        let _ = p.run(&prepare(Path::new("/nonexistent/Acme_X.bin"), token));
        journal
    }

    #[test]
    fn token_reaches_schema_stage_unchanged() {
        let journal = run_with(Some("tok en==/+"));
        assert_eq!(
            journal.call(StageKind::SchemaResolution).expect("ran").token,
            Some("tok en==/+".to_string())
        );
    }

    #[test]
    fn token_is_withheld_from_other_stages() {
        let journal = run_with(Some("secret"));
        for call in journal.0.borrow().iter() {
            if call.kind != StageKind::SchemaResolution {
                assert_eq!(call.token, None, "{} saw the token", call.kind);
            }
        }
    }

    #[test]
    fn absent_or_empty_token_means_none() {
        for token in [None, Some("")] {
            let journal = run_with(token);
            assert_eq!(
                journal.call(StageKind::SchemaResolution).expect("ran").token,
                None
            );
        }
    }
}
