//! # CLI Command Implementations
//!
//! This module contains the build command and its console output.

use super::Cli;
use crate::config::PipelineConfig;
use crate::stages::stage_set;
use firmprofile_core::primitives::{EXIT_SUCCESS, FILENAME_INSTRUCTIONS};
use firmprofile_core::{
    FirmwareArtifact, Pipeline, PlannedStage, PreparedRun, ProfileError, RunOutcome, RunReport,
    RunRequest, Token,
};
use std::path::{Path, PathBuf};

// =============================================================================
// CONSOLE TEXT
// =============================================================================

/// Print the filename convention, one rule per line.
pub fn print_filename_instructions() {
    for line in FILENAME_INSTRUCTIONS {
        println!("{}", line);
    }
}

/// Print usage plus the filename convention.
pub fn print_usage() {
    println!("Usage: firmprofile <full 2M encrypted bin file> [token]");
    println!("Token is optional.  Token instructions will prompt if needed.");
    print_filename_instructions();
}

// =============================================================================
// BUILD COMMAND
// =============================================================================

/// Validate, configure and run (or plan) a profile build.
pub fn cmd_build(cli: &Cli, firmware: PathBuf) -> Result<i32, ProfileError> {
    let request = RunRequest::new(
        FirmwareArtifact::new(firmware),
        Token::from_arg(cli.token.clone()),
    );

    // Naming is checked before anything touches the filesystem
    let prepared = PreparedRun::prepare(request)?;
    let cwd = std::env::current_dir()
        .map_err(|e| ProfileError::Io(format!("Cannot read current directory: {}", e)))?;
    let prepared = prepared.anchored_at(&cwd);

    let config = PipelineConfig::load(cli.config.as_deref())?;
    let pipeline = Pipeline::new(stage_set(&config));

    if cli.dry_run {
        let plan = pipeline.plan(&prepared);
        print_plan(&prepared, &plan, cli.json_mode)?;
        return Ok(EXIT_SUCCESS);
    }

    println!(
        "[+] Processing file='{}' as {}",
        prepared.artifact(),
        prepared.base_name()
    );
    tracing::info!(
        base_name = %prepared.base_name(),
        token = prepared.has_token(),
        "Starting profile build"
    );

    let report = pipeline.run(&prepared);
    print_outcome(&report);

    // The run's own status wins over a report that could not be saved
    if let Some(path) = &cli.report {
        if let Err(e) = write_report(&report, path) {
            tracing::warn!("{}", e);
            println!("[!] {}", e);
        }
    }
    if cli.json_mode {
        println!("{}", to_json(&report)?);
    }

    Ok(report.exit_code())
}

fn print_outcome(report: &RunReport) {
    match &report.outcome {
        RunOutcome::ProfileGenerated => {
            println!(
                "[+] Profile generated in {}",
                report.context.extracted_location.display()
            );
        }
        RunOutcome::SchemaMissing { schema_id_file } => {
            tracing::warn!(path = %schema_id_file.display(), "Schema missing");
            println!("[!] Unable to build complete profile as schema remains missing.");
        }
        RunOutcome::Aborted { stage, error } => {
            println!("[!] Stage '{}' failed: {}", stage, error);
        }
    }
}

fn print_plan(
    prepared: &PreparedRun,
    plan: &[PlannedStage],
    json_mode: bool,
) -> Result<(), ProfileError> {
    if json_mode {
        let output = serde_json::json!({
            "artifact": prepared.artifact(),
            "base_name": prepared.base_name(),
            "context": prepared.context(),
            "stages": plan,
        });
        println!("{}", to_json(&output)?);
        return Ok(());
    }

    let ctx = prepared.context();
    println!("Profile Build Plan");
    println!("==================");
    println!("Artifact:     {}", prepared.artifact());
    println!("Base name:    {}", prepared.base_name());
    println!("Working dir:  {}", ctx.extracted_location.display());
    println!("Storage file: {}", ctx.storage_file.display());
    println!("App file:     {}", ctx.app_file.display());
    println!("Schema file:  {}", ctx.schema_id_file.display());
    println!();

    for (i, step) in plan.iter().enumerate() {
        let gate = if step.gated { " (if schema present)" } else { "" };
        println!("  {}. {}{}", i + 1, step.stage, gate);
        println!("     {}", step.command);
    }

    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ProfileError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ProfileError::Io(format!("Cannot serialize report: {}", e)))
}

/// Write the run report as pretty JSON.
pub fn write_report(report: &RunReport, path: &Path) -> Result<(), ProfileError> {
    let json = to_json(report)?;
    std::fs::write(path, json)
        .map_err(|e| ProfileError::Io(format!("Write report '{}': {}", path.display(), e)))?;
    tracing::info!(path = %path.display(), "Run report written");
    Ok(())
}
