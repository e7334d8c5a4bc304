//! # Process-Backed Stages
//!
//! Runs each pipeline stage as an external program.
//!
//! The command line is `<program> <args...> <stage path> [token]`, where the
//! token (schema resolution only) is either positional or preceded by the
//! configured `token_flag`. Standard streams are inherited so a stage can
//! prompt the user for a token.

use crate::config::{PipelineConfig, StageCommand};
use firmprofile_core::{Stage, StageError, StageInput, StageKind, StageOutcome, StageSet};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

/// A stage implemented by an external program.
#[derive(Debug, Clone)]
pub struct CommandStage {
    command: StageCommand,
    working_dir: Option<PathBuf>,
}

impl CommandStage {
    /// Launch `command` in `working_dir`, or the inherited directory.
    #[must_use]
    pub fn new(command: StageCommand, working_dir: Option<PathBuf>) -> Self {
        Self {
            command,
            working_dir,
        }
    }

    /// Arguments passed after the program name.
    #[must_use]
    pub fn arguments(&self, input: &StageInput<'_>) -> Vec<OsString> {
        let mut argv: Vec<OsString> = self.command.args.iter().map(OsString::from).collect();
        argv.push(input.path.as_os_str().to_os_string());

        if let Some(token) = input.token {
            if let Some(flag) = &self.command.token_flag {
                argv.push(OsString::from(flag));
            }
            argv.push(OsString::from(token.as_str()));
        }

        argv
    }

    fn build(&self, input: &StageInput<'_>) -> Command {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(self.arguments(input));
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl Stage for CommandStage {
    fn run(&self, input: &StageInput<'_>) -> Result<StageOutcome, StageError> {
        tracing::debug!(stage = %input.kind, command = %self.describe(input), "Spawning stage");

        let status = self
            .build(input)
            .status()
            .map_err(|source| StageError::Spawn {
                program: self.command.program.clone(),
                source,
            })?;

        if status.success() {
            return Ok(StageOutcome::Completed);
        }

        match status.code() {
            Some(code) => Err(StageError::NonZeroExit {
                program: self.command.program.clone(),
                code,
            }),
            None => Err(StageError::Terminated {
                program: self.command.program.clone(),
            }),
        }
    }

    /// Command line with the token masked.
    fn describe(&self, input: &StageInput<'_>) -> String {
        let mut parts = vec![self.command.program.clone()];
        parts.extend(self.command.args.iter().cloned());
        parts.push(input.path.display().to_string());

        if input.token.is_some() {
            if let Some(flag) = &self.command.token_flag {
                parts.push(flag.clone());
            }
            parts.push("<token>".to_string());
        }

        parts.join(" ")
    }
}

/// One [`CommandStage`] per stage, as configured.
#[must_use]
pub fn stage_set(config: &PipelineConfig) -> StageSet {
    StageSet::from_fn(|kind: StageKind| {
        Box::new(CommandStage::new(
            config.command_for(kind),
            config.working_dir.clone(),
        ))
    })
}
