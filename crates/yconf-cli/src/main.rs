//! # yconf CLI entry point
//!
//! Parses command-line arguments, installs logging, and runs the check.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use yconf_cli::check::{run_check, usage_exit_code, CheckArgs};

/// Validate a YAML configuration, with `!include` files spliced in, against
/// a JSON schema.
#[derive(Parser, Debug)]
#[command(name = "yconf", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    check: CheckArgs,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout, usage errors to stderr.
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "yconf starting");

    match run_check(&cli.check) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
