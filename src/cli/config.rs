// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! `config show`: print the fully merged configuration as TOML.

use super::SubcommandResult;
use clap::{Parser, Subcommand};
use crateflux::config::Config;

/// Command line arguments for the `config` command.
#[derive(Parser, Debug)]
pub struct Args {
    /// Config subcommand.
    #[command(subcommand)]
    command: ConfigCommand,
}

/// Subcommands of `config`.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the fully merged configuration as TOML.
    Show,
}

/// Run the `config` command.
pub fn run(config: &Config, args: Args) -> SubcommandResult {
    match args.command {
        ConfigCommand::Show => {
            let toml_string = toml::to_string_pretty(config)
                .map_err(|e| (super::ExitCodeKind::InternalError, e.to_string()))?;
            println!("{toml_string}");
            Ok(())
        }
    }
}
