// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Command line interface.

mod config;
mod convert;
mod inspect;

use clap::{Parser, Subcommand};
use crateflux::{PKG_NAME, PKG_VERSION};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder as LogConfigBuilder, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::process::ExitCode;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Command to run.
    #[command(subcommand)]
    command: Commands,
    /// Path to a configuration file, taking precedence over the XDG user config.
    #[arg(short, long, required = false)]
    config_path: Option<PathBuf>,
    /// Increase log verbosity (debug level).
    #[arg(short, long)]
    verbose: bool,
}

/// Supported CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a source collection into a target format.
    Convert(convert::Args),
    /// Parse a source collection and print statistics without writing anything.
    Inspect(inspect::Args),
    /// Show the fully merged configuration.
    Config(config::Args),
}

/// Exit codes (§6): distinct from a process crash, these are the documented
/// mapping from conversion outcome to shell exit status.
#[derive(Debug, Clone, Copy)]
#[repr(u8)]
enum ExitCodeKind {
    /// Conversion completed successfully.
    Success = 0,
    /// Command line arguments were invalid.
    InvalidArguments = 1,
    /// The source collection could not be read.
    InputUnreadable = 2,
    /// The source collection could not be parsed.
    InputUnparseable = 3,
    /// The output root is not writable.
    OutputNotWritable = 4,
    /// The conversion was cancelled.
    Cancelled = 5,
    /// An internal error occurred.
    InternalError = 6,
}

/// Initialise logging at the level requested by `-v`/`--verbose` or the
/// config's `log_level`. Library code never calls this itself (A3).
fn init_logging(verbose: bool, config_level: Option<&str>) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        config_level
            .and_then(|s| s.parse().ok())
            .unwrap_or(LevelFilter::Info)
    };
    let log_config = LogConfigBuilder::new().build();
    // Fall back to stderr-only logging if no terminal is attached; failing to
    // initialise a logger at all should never stop the conversion from running.
    if TermLogger::init(level, log_config, TerminalMode::Mixed, ColorChoice::Auto).is_err() {
        eprintln!("warning: failed to initialise terminal logger");
    }
}

/// Main entry point.
///
/// # Errors
///
/// Returns an [`ExitCode`] mapping to the exit codes documented in the
/// external-interface section; this function itself never returns `Err`.
pub fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(ExitCodeKind::InvalidArguments as u8);
        }
    };

    init_logging(args.verbose, config.log_level.as_deref());
    log::info!("{PKG_NAME} {PKG_VERSION}");

    let outcome = match args.command {
        Commands::Convert(cmd_args) => convert::run(&config, cmd_args),
        Commands::Inspect(cmd_args) => inspect::run(cmd_args),
        Commands::Config(cmd_args) => config::run(&config, cmd_args),
    };

    match outcome {
        Ok(()) => ExitCode::from(ExitCodeKind::Success as u8),
        Err(kind) => {
            eprintln!("error: {}", kind.1);
            ExitCode::from(kind.0 as u8)
        }
    }
}

/// Load and merge the default, user, and (if given) explicit config layers (A1).
fn load_config(explicit_path: Option<&std::path::Path>) -> crateflux::Result<crateflux::config::Config> {
    use xdg::BaseDirectories;

    let base_dirs = BaseDirectories::with_prefix(PKG_NAME)?;
    let user_config_path = base_dirs.find_config_file("config.toml");
    crateflux::config::Config::load_layered(user_config_path.as_deref(), explicit_path)
}

/// A result/exit-code pair an individual subcommand returns on failure.
pub(crate) type SubcommandError = (ExitCodeKind, String);

/// Convenience alias for a subcommand's result type.
pub(crate) type SubcommandResult = Result<(), SubcommandError>;
