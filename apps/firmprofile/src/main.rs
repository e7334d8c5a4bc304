//! # firmprofile - Device Profile Builder
//!
//! Builds a structured device profile from one full encrypted firmware image.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   apps/firmprofile (THE BINARY)                 │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐   │
//! │  │   CLI       │    │   Config    │    │  Stage Processes │   │
//! │  │  (clap)     │    │   (toml)    │    │  (std::process)  │   │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘   │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                 ┌────────────────────┐                         │
//! │                 │  firmprofile-core  │                         │
//! │                 │    (THE LOGIC)     │                         │
//! │                 └────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! firmprofile dumps/Acme-Router_ModelX.bin
//! firmprofile dumps/Acme-Router_ModelX.bin "$TOKEN" --report run.json
//! firmprofile dumps/Acme-Router_ModelX.bin --dry-run
//! ```

use firmprofile::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = match cli::parse_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => std::process::exit(code),
    };

    init_tracing(cli.verbose);

    if cli.wants_banner() {
        print_banner();
    }

    let code = match cli::execute(cli) {
        Ok(code) => code,
        Err(e) => {
            cli::report_error(&e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

/// Initialize tracing on stderr. `FIRMPROFILE_LOG_FORMAT=json` switches to JSON lines.
///
/// Stdout is reserved for the diagnostics stages and users read.
fn init_tracing(verbose: bool) {
    let log_format =
        std::env::var("FIRMPROFILE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if verbose {
        "firmprofile=debug,firmprofile_core=debug"
    } else {
        "firmprofile=info,firmprofile_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        "firmprofile v{} - firmware to device profile",
        env!("CARGO_PKG_VERSION")
    );
}
