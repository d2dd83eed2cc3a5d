// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! `convert`: parse a source collection and dispatch it to a target-format
//! writer (§4.13).

use super::{ExitCodeKind, SubcommandResult};
use clap::Parser;
use crateflux::config::{Config, ExportOptions, KeyNotation, TargetFormat, Tier};
use crateflux::driver::{self, ConvertOptions, ConvertOutcome};
use crateflux::progress;
use std::path::PathBuf;

/// Command line arguments for the `convert` command.
#[derive(Parser, Debug)]
pub struct Args {
    /// Path to the source collection file.
    source: PathBuf,
    /// Directory to write the export into.
    output_dir: PathBuf,
    /// Which writer to dispatch to.
    #[arg(long)]
    target_format: Option<TargetFormat>,
    /// Analysis-file tier (hardware export only).
    #[arg(long)]
    tier: Option<Tier>,
    /// Optional music-root directory, used to repair relocated file paths.
    #[arg(long)]
    music_root: Option<PathBuf>,
    /// Copy audio files into `Contents/` (hardware export only).
    #[arg(long)]
    copy_audio: bool,
    /// Verify copied audio with a SHA-256 comparison (hardware export only).
    #[arg(long)]
    verify_copy: bool,
    /// Key notation used in the interchange XML `Tonality` attribute.
    #[arg(long)]
    key_notation: Option<KeyNotation>,
    /// Clear a pre-existing, non-empty `PIONEER/` tree before exporting.
    #[arg(long)]
    overwrite: bool,
}

/// Run the `convert` command.
pub fn run(config: &Config, args: Args) -> SubcommandResult {
    let overrides = ExportOptions {
        target_format: args.target_format,
        tier: args.tier,
        copy_audio: Some(args.copy_audio),
        verify_copy: Some(args.verify_copy),
        overwrite: Some(args.overwrite),
        key_notation: args.key_notation,
        filename_index_cap: None,
    };
    let merged = config.with_cli_overrides(&overrides);
    let export = merged.export;

    let target_format = export.target_format.unwrap_or(TargetFormat::CdjHardware);
    let tier = export.tier.unwrap_or(Tier::TierB);
    let key_notation = export.key_notation.unwrap_or(KeyNotation::OpenKey);
    let filename_index_cap = export.filename_index_cap.unwrap_or(30_000);

    let (sink, source) = progress::channel();
    let cancel = progress::CancellationToken::new();

    let mut collection = crateflux::source::parse_collection(&args.source, args.music_root.as_deref(), filename_index_cap, &sink)
        .map_err(to_exit_code)?;

    for update in source.updates.try_iter() {
        log::debug!("{}% {}", update.percentage, update.message);
    }

    let roots = collection.roots.clone();
    let convert_options = ConvertOptions {
        target_format,
        tier,
        copy_audio: export.copy_audio.unwrap_or(false),
        verify_copy: export.verify_copy.unwrap_or(false),
        overwrite: export.overwrite.unwrap_or(false),
        key_notation,
    };

    let outcome = driver::convert(&mut collection, &roots, &args.output_dir, convert_options, &sink, &cancel).map_err(to_exit_code)?;

    for update in source.updates.try_iter() {
        log::debug!("{}% {}", update.percentage, update.message);
    }

    match outcome {
        ConvertOutcome::Hardware(result) => {
            println!(
                "wrote {} track(s), copied {} audio file(s) ({} bytes)",
                result.tracks_written, result.audio_files_copied, result.bytes_copied
            );
        }
        ConvertOutcome::Xml(path) => println!("wrote {}", path.display()),
        ConvertOutcome::M3u(count) => println!("wrote {count} playlist(s)"),
    }
    Ok(())
}

/// Map a library error to the exit code documented in §6.
fn to_exit_code(error: crateflux::ErrorType) -> (ExitCodeKind, String) {
    let message = error.to_string();
    let kind = match error {
        crateflux::ErrorType::SourceUnreadable(_) => ExitCodeKind::InputUnreadable,
        crateflux::ErrorType::SourceUnparseable(_) => ExitCodeKind::InputUnparseable,
        crateflux::ErrorType::WriteFailed(_)
        | crateflux::ErrorType::AudioCopyFailed { .. }
        | crateflux::ErrorType::VerifyMismatch(_) => ExitCodeKind::OutputNotWritable,
        crateflux::ErrorType::CancelRequested => ExitCodeKind::Cancelled,
        _ => ExitCodeKind::InternalError,
    };
    (kind, message)
}
