// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! `inspect`: parse a source collection and print statistics without writing
//! anything (§4.13).

use super::{ExitCodeKind, SubcommandResult};
use clap::Parser;
use crateflux::progress;
use std::path::PathBuf;

/// Command line arguments for the `inspect` command.
#[derive(Parser, Debug)]
pub struct Args {
    /// Path to the source collection file.
    source: PathBuf,
    /// Optional music-root directory, used to repair relocated file paths.
    #[arg(long)]
    music_root: Option<PathBuf>,
}

/// Run the `inspect` command.
pub fn run(args: Args) -> SubcommandResult {
    let (sink, _source) = progress::channel();
    let collection = crateflux::source::parse_collection(&args.source, args.music_root.as_deref(), 30_000, &sink)
        .map_err(to_exit_code)?;

    println!("version: {}", collection.stats.version);
    println!("tracks: {}", collection.track_count());
    println!("root nodes: {}", collection.roots.len());
    println!("parse time: {} ms", collection.stats.parse_time_ms);
    if collection.stats.issues.is_empty() {
        println!("issues: none");
    } else {
        println!("issues ({}):", collection.stats.issues.len());
        for issue in &collection.stats.issues {
            println!("  - {issue}");
        }
    }
    Ok(())
}

/// Map a library error to the exit code documented in §6.
fn to_exit_code(error: crateflux::ErrorType) -> (ExitCodeKind, String) {
    let message = error.to_string();
    let kind = match error {
        crateflux::ErrorType::SourceUnreadable(_) => ExitCodeKind::InputUnreadable,
        crateflux::ErrorType::SourceUnparseable(_) => ExitCodeKind::InputUnparseable,
        _ => ExitCodeKind::InternalError,
    };
    (kind, message)
}
