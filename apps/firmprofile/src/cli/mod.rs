//! # firmprofile CLI Module
//!
//! This module implements the command line contract:
//!
//! ```text
//! firmprofile <firmware_artifact_path> [token] [options]
//! ```
//!
//! ## Exit Statuses
//!
//! - `0` - profile generated (or dry run finished)
//! - `1` - missing argument / usage error, or schema still missing
//! - `2` - firmware file name breaks the naming convention
//! - `3` - a stage failed
//! - `4` - stage configuration could not be loaded
//!
//! All diagnostics and instructions are printed to stdout.

mod commands;

use clap::Parser;
use clap::error::ErrorKind;
use firmprofile_core::ProfileError;
use firmprofile_core::primitives::EXIT_USAGE_OR_SCHEMA_MISSING;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// firmprofile - device profile builder
///
/// Extracts, decrypts, parses and annotates a full encrypted firmware image
/// into a device profile.
#[derive(Parser, Debug)]
#[command(name = "firmprofile")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Full encrypted firmware image, named Manufacturer-Name_Model-description.bin
    pub firmware: Option<PathBuf>,

    /// Token for schema resolution (optional; the stage prompts if it needs one)
    #[arg(allow_hyphen_values = true)]
    pub token: Option<String>,

    /// Stage configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Validate and print the planned stage commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json_mode: bool,

    /// Write the run report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Suppress banner output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if the startup banner should be printed.
    ///
    /// Never on the usage path, so a missing argument prints only usage.
    #[must_use]
    pub fn wants_banner(&self) -> bool {
        !self.quiet && self.firmware.is_some()
    }
}

// =============================================================================
// ARGUMENT PARSING
// =============================================================================

/// Parse `args`, mapping usage errors onto the missing-argument status.
///
/// `--help` and `--version` print and exit 0 through clap. Any other parse
/// error is printed to stdout with usage and filename instructions, and the
/// returned `Err` carries the exit status.
pub fn parse_from<I, T>(args: I) -> Result<Cli, i32>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            println!("{}", e.render());
            print_usage();
            Err(EXIT_USAGE_OR_SCHEMA_MISSING)
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments and return the exit status.
pub fn execute(cli: Cli) -> Result<i32, ProfileError> {
    let Some(firmware) = cli.firmware.clone() else {
        print_usage();
        return Ok(EXIT_USAGE_OR_SCHEMA_MISSING);
    };

    cmd_build(&cli, firmware)
}

/// Print the diagnostic for an error that ended the run.
pub fn report_error(error: &ProfileError) {
    tracing::error!("{}", error);
    match error {
        ProfileError::NamingConvention { .. } => print_filename_instructions(),
        other => println!("[!] {}", other),
    }
}
