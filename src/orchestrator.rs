// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The hardware-export orchestrator (C7, §4.7).
//!
//! Owns the on-disk layout of a `cdj-hardware` export: creating the
//! `PIONEER/` tree, optionally copying and verifying audio, invoking the
//! analysis-file writer (C5) per track, and finally the database writer
//! (C6). Cancellation is polled between tracks and between major steps; a
//! cancelled run removes whatever partial `PIONEER/` tree it produced.

use crate::config::Tier;
use crate::error::ErrorType;
use crate::model::{Collection, Fingerprint, Track};
use crate::pdb;
use crate::plan::ExportPlan;
use crate::progress::{CancellationToken, ProgressSink, TerminalEvent};
use crate::sanitize::sanitize_basename_for_path;
use crate::util::copy_file;
use crate::{analysis, xml_writer};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Aggregate outcome of a hardware export.
#[derive(Debug, Clone, Default)]
pub struct ExportResult {
    /// Number of tracks whose analysis files were written.
    pub tracks_written: usize,
    /// Number of audio files copied (0 if copy-audio was not requested).
    pub audio_files_copied: usize,
    /// Total bytes copied across all audio files.
    pub bytes_copied: u64,
    /// Non-fatal issues collected during the run.
    pub issues: Vec<String>,
}

/// Options controlling a hardware export, independent of the general
/// [`crate::config::ExportOptions`] so this module stays usable without a
/// loaded [`crate::config::Config`].
#[derive(Debug, Clone, Copy)]
pub struct HardwareExportOptions {
    /// Analysis-file tier.
    pub tier: Tier,
    /// Copy audio files into `Contents/`.
    pub copy_audio: bool,
    /// Verify copies with a SHA-256 comparison.
    pub verify_copy: bool,
    /// Clear a pre-existing, non-empty `PIONEER/` tree first.
    pub overwrite: bool,
}

/// Run a full hardware export of `plan` into `output_root`.
///
/// # Errors
///
/// Returns [`ErrorType::WriteFailed`] if the output tree cannot be created,
/// [`ErrorType::AudioCopyFailed`] if a copy fails, [`ErrorType::VerifyMismatch`]
/// if a post-copy hash comparison fails, or [`ErrorType::CancelRequested`] if
/// `cancel` is set mid-run.
pub fn export(
    plan: ExportPlan,
    collection: &mut Collection,
    output_root: &Path,
    options: HardwareExportOptions,
    progress: &ProgressSink,
    cancel: &CancellationToken,
) -> crate::Result<ExportResult> {
    let pioneer_dir = output_root.join("PIONEER");
    let rekordbox_dir = pioneer_dir.join("rekordbox");
    let usbanlz_dir = pioneer_dir.join("USBANLZ");
    let contents_dir = output_root.join("Contents");

    if pioneer_dir.is_dir() && pioneer_dir.read_dir().is_ok_and(|mut d| d.next().is_some()) {
        if options.overwrite {
            fs::remove_dir_all(&pioneer_dir).map_err(|e| ErrorType::WriteFailed(e.to_string()))?;
        } else {
            return Err(ErrorType::WriteFailed(format!(
                "{} already exists and is not empty; pass --overwrite to replace it",
                pioneer_dir.display()
            )));
        }
    }
    for dir in [&pioneer_dir, &rekordbox_dir, &usbanlz_dir, &contents_dir] {
        fs::create_dir_all(dir).map_err(|e| ErrorType::WriteFailed(e.to_string()))?;
    }

    let mut result = ExportResult::default();

    if options.copy_audio {
        copy_audio_files(collection, &contents_dir, options.verify_copy, progress, cancel, &mut result)?;
    }

    if cancel.is_cancelled() {
        cleanup_partial(&pioneer_dir);
        progress.finish(TerminalEvent::Cancelled);
        return Err(ErrorType::CancelRequested);
    }

    let total = plan.tracks.len().max(1);
    for (i, plan_track) in plan.tracks.iter().enumerate() {
        if cancel.is_cancelled() {
            cleanup_partial(&pioneer_dir);
            progress.finish(TerminalEvent::Cancelled);
            return Err(ErrorType::CancelRequested);
        }
        if let Some(track) = collection.track(&plan_track.fingerprint) {
            let _ = analysis::write_analysis_files(track, output_root, options.tier)?;
            result.tracks_written += 1;
        }
        if i % 100 == 0 || i == total - 1 {
            let percentage = u8::try_from((i + 1) * 100 / total).unwrap_or(100);
            progress.report(percentage, format!("analysed {}/{}", i + 1, total));
        }
    }

    if cancel.is_cancelled() {
        cleanup_partial(&pioneer_dir);
        progress.finish(TerminalEvent::Cancelled);
        return Err(ErrorType::CancelRequested);
    }

    let pdb_path = rekordbox_dir.join("export.pdb");
    pdb::write_database(&plan, collection, &contents_dir, options.tier, &pdb_path)?;

    write_export_info(output_root, options.tier)?;

    progress.report(100, "export complete");
    progress.finish(TerminalEvent::Done);
    Ok(result)
}

/// Copy each track's audio file into `contents_dir`, sanitising its basename
/// (C1) and, if requested, verifying the copy with a SHA-256 comparison.
/// Updates each track's `file_path` in `collection` to the new location, so
/// both the analysis writer (C5) and the database writer (C6) pick up the
/// copied file rather than the original source path.
fn copy_audio_files(
    collection: &mut Collection,
    contents_dir: &Path,
    verify: bool,
    progress: &ProgressSink,
    cancel: &CancellationToken,
    result: &mut ExportResult,
) -> crate::Result<()> {
    let fingerprints: Vec<Fingerprint> = collection.tracks().map(|t| t.fingerprint.clone()).collect();
    let total = fingerprints.len().max(1);
    for (i, fingerprint) in fingerprints.iter().enumerate() {
        if cancel.is_cancelled() {
            return Ok(());
        }
        let Some(track) = collection.track(fingerprint) else { continue };
        let source = track.file_path.clone();
        let file_size = track.file_size;
        let parent_len = contents_dir.to_string_lossy().len();
        let basename = sanitize_basename_for_path(
            &source.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
            parent_len,
        )?;
        let dest = contents_dir.join(&basename);
        copy_file(&source, &dest).map_err(|e| ErrorType::AudioCopyFailed {
            path: source.display().to_string(),
            source: e,
        })?;
        result.audio_files_copied += 1;
        result.bytes_copied += file_size;

        if verify {
            let source_hash = hash_file(&source)?;
            let dest_hash = hash_file(&dest)?;
            if source_hash != dest_hash {
                return Err(ErrorType::VerifyMismatch(dest.display().to_string()));
            }
        }

        if let Some(track) = collection.track_mut(fingerprint) {
            track.file_path = dest;
        }

        progress.report(
            u8::try_from((i + 1) * 100 / total).unwrap_or(100),
            format!("copied {}/{}", i + 1, total),
        );
    }
    Ok(())
}

/// SHA-256 of a file's contents, for post-copy verification.
fn hash_file(path: &Path) -> crate::Result<[u8; 32]> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hasher.finalize().into())
}

/// Write the short `EXPORT.INFO` summary (§4.7 step 6).
fn write_export_info(output_root: &Path, tier: Tier) -> crate::Result<()> {
    let now = chrono::Local::now();
    let contents = format!(
        "Date: {}\nConverter: {} {}\nTier: {}\n",
        now.format("%Y-%m-%d %H:%M:%S"),
        xml_writer::PRODUCT_NAME,
        xml_writer::PRODUCT_VERSION,
        tier,
    );
    fs::write(output_root.join("EXPORT.INFO"), contents).map_err(|e| ErrorType::WriteFailed(e.to_string()))
}

/// Remove a partially written `PIONEER/` tree after cancellation.
fn cleanup_partial(pioneer_dir: &Path) {
    let _ = fs::remove_dir_all(pioneer_dir);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fingerprint, Node, NodeKind, PlaylistEntry};
    use std::io::Write as _;
    use tempfile::tempdir;

    fn sample_track(fingerprint: &str, path: &Path) -> Track {
        Track {
            fingerprint: Fingerprint(fingerprint.to_string()),
            title: "T".to_string(),
            artist: String::new(),
            album: String::new(),
            genre: String::new(),
            label: String::new(),
            comment: String::new(),
            remixer: String::new(),
            file_path: path.to_path_buf(),
            file_size: 5,
            sample_rate: 44_100,
            bitrate: 320,
            sample_depth: 16,
            duration_secs: 10,
            duration_secs_float: 10.0,
            bpm: 120.0,
            key_index: None,
            rating: 0,
            play_count: 0,
            date_added: None,
            date_modified: None,
            last_played: None,
            color_index: None,
            cues: Vec::new(),
            grid_anchor_ms: None,
        }
    }

    #[test]
    fn export_creates_pioneer_tree_and_database() {
        let source_dir = tempdir().unwrap();
        let audio_path = source_dir.path().join("song.mp3");
        let mut f = fs::File::create(&audio_path).unwrap();
        f.write_all(b"fake").unwrap();

        let mut collection = Collection::new();
        collection.insert_track(sample_track("t1", &audio_path));
        let mut playlist = Node::new_playlist("PL");
        if let NodeKind::Playlist { entries } = &mut playlist.kind {
            entries.push(PlaylistEntry::Resolved(Fingerprint("t1".to_string())));
        }
        let playlist_id = collection.push_node(playlist);
        collection.roots.push(playlist_id);
        let plan = crate::plan::build(&collection, &collection.roots.clone());

        let output_dir = tempdir().unwrap();
        let (sink, _source) = crate::progress::channel();
        let cancel = CancellationToken::new();
        let options = HardwareExportOptions {
            tier: Tier::TierA,
            copy_audio: false,
            verify_copy: false,
            overwrite: false,
        };
        let result = export(plan, &mut collection, output_dir.path(), options, &sink, &cancel).unwrap();
        assert_eq!(result.tracks_written, 1);
        assert!(output_dir.path().join("PIONEER/rekordbox/export.pdb").exists());
        assert!(output_dir.path().join("PIONEER/rekordbox/DeviceSQL.edb").exists());
        assert!(output_dir.path().join("EXPORT.INFO").exists());
    }

    #[test]
    fn cancelled_export_removes_partial_tree() {
        let mut collection = Collection::new();
        let plan = crate::plan::build(&collection, &[]);
        collection.roots.clear();

        let output_dir = tempdir().unwrap();
        let (sink, _source) = crate::progress::channel();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let options = HardwareExportOptions {
            tier: Tier::TierA,
            copy_audio: false,
            verify_copy: false,
            overwrite: false,
        };
        let result = export(plan, &mut collection, output_dir.path(), options, &sink, &cancel);
        assert!(matches!(result, Err(ErrorType::CancelRequested)));
        assert!(!output_dir.path().join("PIONEER").exists());
    }

    #[test]
    fn refuses_nonempty_pioneer_dir_without_overwrite() {
        let output_dir = tempdir().unwrap();
        fs::create_dir_all(output_dir.path().join("PIONEER")).unwrap();
        fs::write(output_dir.path().join("PIONEER/marker"), b"x").unwrap();

        let mut collection = Collection::new();
        let plan = crate::plan::build(&collection, &[]);
        let (sink, _source) = crate::progress::channel();
        let cancel = CancellationToken::new();
        let options = HardwareExportOptions {
            tier: Tier::TierA,
            copy_audio: false,
            verify_copy: false,
            overwrite: false,
        };
        let result = export(plan, &mut collection, output_dir.path(), options, &sink, &cancel);
        assert!(result.is_err());
    }
}
