//! # yconf-cli — Configuration Checker
//!
//! Provides the `yconf` command-line interface: load a schema, load a
//! configuration with every `!include` spliced in, validate, and optionally
//! print the resolved tree.
//!
//! ```bash
//! yconf schema.json config.yaml
//! yconf -s schema.json -c config.yaml --print
//! YCONF_SCHEMA=schema.json yconf -c config.yaml -vv
//! ```
//!
//! Handlers return the process exit code as `anyhow::Result<u8>`. Expected
//! failures (bad schema, bad config, invalid config) are reported on stderr
//! and yield `Ok(1)`. An `Err` is reserved for I/O problems writing output.
//! Argument errors also exit with 1 ([`usage_exit_code`]); only `--help` and
//! `--version` exit with 0 before a check runs.

pub mod check;

pub use check::{run_check, usage_exit_code, CheckArgs};
