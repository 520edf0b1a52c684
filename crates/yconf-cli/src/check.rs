//! # Check Command
//!
//! Runs the whole pipeline for one schema and one configuration:
//!
//! 1. Load the schema. On failure print `Failed to load schema: <path>`
//!    followed by `- <reason>`.
//! 2. Load the configuration with includes resolved. On failure print
//!    `Failed to load config: <path>` followed by `- <reason>`.
//! 3. Validate. On failure print `Validation failed:` and one `- <message>`
//!    line per message.
//! 4. Print `Configuration is valid!`, then the resolved tree as YAML if
//!    `--print` was given.
//!
//! Diagnostics go to stderr, the confirmation and the printed tree to
//! stdout.
//!
//! ## Path Precedence
//!
//! `-s/--schema` and `-c/--config` override the positionals, which override
//! `YCONF_SCHEMA` / `YCONF_CONFIG`, which override the defaults
//! `schema.json` / `config.yaml`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use yconf_core::{emit, SchemaError};
use yconf_include::{ConfigLoader, IncludeTagPolicy, LoaderOptions};
use yconf_schema::SchemaValidator;

/// Schema path used when none is given.
pub const DEFAULT_SCHEMA: &str = "schema.json";

/// Configuration path used when none is given.
pub const DEFAULT_CONFIG: &str = "config.yaml";

/// Arguments for the check command.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Schema file (JSON).
    #[arg(value_name = "SCHEMA", env = "YCONF_SCHEMA")]
    pub schema_file: Option<PathBuf>,

    /// Configuration file (YAML).
    #[arg(value_name = "CONFIG", env = "YCONF_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Schema file; takes precedence over the positional argument.
    #[arg(short = 's', long = "schema", value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Configuration file; takes precedence over the positional argument.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the resolved configuration as YAML after it validates.
    #[arg(short, long)]
    pub print: bool,

    /// Also treat any tag containing `:include` as an include directive.
    #[arg(long)]
    pub legacy_include_tags: bool,
}

impl CheckArgs {
    /// The schema path after applying precedence and defaults.
    pub fn schema_path(&self) -> PathBuf {
        self.schema
            .clone()
            .or_else(|| self.schema_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA))
    }

    /// The configuration path after applying precedence and defaults.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .or_else(|| self.config_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
    }

    pub fn loader_options(&self) -> LoaderOptions {
        let include_policy = if self.legacy_include_tags {
            IncludeTagPolicy::Permissive
        } else {
            IncludeTagPolicy::Exact
        };
        LoaderOptions { include_policy }
    }
}

/// Exit code for an argument parsing error: 0 when clap is only printing
/// help or version text, 1 for every usage error.
pub fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

/// Execute the check command against the process's stdout and stderr.
///
/// Returns exit code: 0 when the configuration is valid, 1 otherwise.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    check_to(args, &mut stdout.lock(), &mut stderr.lock())
}

/// Execute the check command, writing results to `out` and diagnostics to
/// `err`.
pub fn check_to(args: &CheckArgs, out: &mut dyn Write, err: &mut dyn Write) -> Result<u8> {
    let schema_path = args.schema_path();
    let config_path = args.config_path();
    tracing::debug!(
        schema = %schema_path.display(),
        config = %config_path.display(),
        policy = ?args.loader_options().include_policy,
        "starting check"
    );

    let validator = match SchemaValidator::load(&schema_path) {
        Ok(validator) => validator,
        Err(e) => {
            writeln!(err, "Failed to load schema: {}", schema_path.display())?;
            writeln!(err, "- {}", schema_reason(&e))?;
            return Ok(1);
        }
    };

    let loader = ConfigLoader::with_options(args.loader_options());
    let tree = match loader.load(&config_path) {
        Ok(tree) => tree,
        Err(e) => {
            writeln!(err, "Failed to load config: {}", config_path.display())?;
            writeln!(err, "- {e}")?;
            return Ok(1);
        }
    };

    if let Err(e) = validator.validate(&tree) {
        tracing::info!(config = %config_path.display(), "configuration rejected");
        writeln!(err, "Validation failed:")?;
        for message in e.messages() {
            writeln!(err, "- {message}")?;
        }
        return Ok(1);
    }

    writeln!(out, "Configuration is valid!")?;

    if args.print {
        let text = emit(&tree).context("failed to render resolved configuration")?;
        write!(out, "{text}")?;
    }
    Ok(0)
}

fn schema_reason(err: &SchemaError) -> String {
    match err {
        SchemaError::SchemaLoadFailure { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
