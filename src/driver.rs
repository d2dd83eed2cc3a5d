// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The conversion driver (C9, §4.9): the single entry point that turns a
//! parsed [`Collection`] plus a target format and options into a finished
//! export, dispatching to whichever writer the target format names.

use crate::config::{KeyNotation, TargetFormat, Tier};
use crate::model::{Collection, NodeId};
use crate::orchestrator::{self, HardwareExportOptions};
use crate::plan;
use crate::progress::{CancellationToken, ProgressSink, TerminalEvent};
use crate::{m3u, xml_writer};
use std::path::Path;

/// Options a caller supplies for one conversion run, independent of how the
/// `Collection` was obtained.
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Which writer to dispatch to.
    pub target_format: TargetFormat,
    /// Analysis-file tier (hardware export only).
    pub tier: Tier,
    /// Copy audio files into `Contents/` (hardware export only).
    pub copy_audio: bool,
    /// Verify copies with a SHA-256 comparison (hardware export only).
    pub verify_copy: bool,
    /// Clear a pre-existing, non-empty `PIONEER/` tree first (hardware export only).
    pub overwrite: bool,
    /// Key notation used for the interchange XML `Tonality` attribute.
    pub key_notation: KeyNotation,
}

/// Outcome of a conversion, regardless of which writer ran.
#[derive(Debug, Clone)]
pub enum ConvertOutcome {
    /// A `cdj-hardware` export completed.
    Hardware(orchestrator::ExportResult),
    /// An `interchange-xml` or `database-software` export completed, naming
    /// the file written.
    Xml(std::path::PathBuf),
    /// An `m3u` export completed, naming how many playlist files were written.
    M3u(usize),
}

/// Run one conversion: build the export plan for `selected_roots` (or the
/// whole tree, via `&collection.roots`), then dispatch to the writer named by
/// `options.target_format`.
///
/// # Errors
///
/// Propagates whatever error the dispatched writer returns.
pub fn convert(
    collection: &mut Collection,
    selected_roots: &[NodeId],
    output_dir: &Path,
    options: ConvertOptions,
    progress: &ProgressSink,
    cancel: &CancellationToken,
) -> crate::Result<ConvertOutcome> {
    log::info!("building export plan for {} root node(s)", selected_roots.len());
    let export_plan = plan::build(collection, selected_roots);
    log::info!(
        "plan has {} tracks, {} playlist nodes",
        export_plan.tracks.len(),
        export_plan.nodes.len()
    );

    match options.target_format {
        TargetFormat::CdjHardware => {
            let hw_options = HardwareExportOptions {
                tier: options.tier,
                copy_audio: options.copy_audio,
                verify_copy: options.verify_copy,
                overwrite: options.overwrite,
            };
            let result = orchestrator::export(export_plan, collection, output_dir, hw_options, progress, cancel)?;
            Ok(ConvertOutcome::Hardware(result))
        }
        TargetFormat::InterchangeXml | TargetFormat::DatabaseSoftware => {
            std::fs::create_dir_all(output_dir).map_err(|e| crate::error::ErrorType::WriteFailed(e.to_string()))?;
            let path = output_dir.join("collection.xml");
            xml_writer::write_xml(&export_plan, collection, options.key_notation, &path)?;
            progress.report(100, "interchange XML written");
            progress.finish(TerminalEvent::Done);
            Ok(ConvertOutcome::Xml(path))
        }
        TargetFormat::M3u => {
            let count = m3u::write_playlists(collection, selected_roots, output_dir)?;
            progress.report(100, "playlists written");
            progress.finish(TerminalEvent::Done);
            Ok(ConvertOutcome::M3u(count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fingerprint, Node, NodeKind, PlaylistEntry, Track};
    use tempfile::tempdir;

    fn sample_track() -> Track {
        Track {
            fingerprint: Fingerprint("t1".to_string()),
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            album: String::new(),
            genre: String::new(),
            label: String::new(),
            comment: String::new(),
            remixer: String::new(),
            file_path: "/music/song.mp3".into(),
            file_size: 100,
            sample_rate: 44_100,
            bitrate: 320,
            sample_depth: 16,
            duration_secs: 180,
            duration_secs_float: 180.0,
            bpm: 128.0,
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

    fn collection_with_playlist() -> Collection {
        let mut collection = Collection::new();
        collection.insert_track(sample_track());
        let mut playlist = Node::new_playlist("PL");
        if let NodeKind::Playlist { entries } = &mut playlist.kind {
            entries.push(PlaylistEntry::Resolved(Fingerprint("t1".to_string())));
        }
        let playlist_id = collection.push_node(playlist);
        collection.roots.push(playlist_id);
        collection
    }

    #[test]
    fn dispatches_to_xml_writer_for_interchange_format() {
        let mut collection = collection_with_playlist();
        let roots = collection.roots.clone();
        let output_dir = tempdir().unwrap();
        let (sink, _source) = crate::progress::channel();
        let cancel = CancellationToken::new();
        let options = ConvertOptions {
            target_format: TargetFormat::InterchangeXml,
            tier: Tier::TierB,
            copy_audio: false,
            verify_copy: false,
            overwrite: false,
            key_notation: KeyNotation::OpenKey,
        };
        let outcome = convert(&mut collection, &roots, output_dir.path(), options, &sink, &cancel).unwrap();
        assert!(matches!(outcome, ConvertOutcome::Xml(_)));
        assert!(output_dir.path().join("collection.xml").exists());
    }

    #[test]
    fn dispatches_to_m3u_writer_for_m3u_format() {
        let mut collection = collection_with_playlist();
        let roots = collection.roots.clone();
        let output_dir = tempdir().unwrap();
        let (sink, _source) = crate::progress::channel();
        let cancel = CancellationToken::new();
        let options = ConvertOptions {
            target_format: TargetFormat::M3u,
            tier: Tier::TierB,
            copy_audio: false,
            verify_copy: false,
            overwrite: false,
            key_notation: KeyNotation::OpenKey,
        };
        let outcome = convert(&mut collection, &roots, output_dir.path(), options, &sink, &cancel).unwrap();
        assert!(matches!(outcome, ConvertOutcome::M3u(1)));
    }
}
