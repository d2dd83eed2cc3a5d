// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Interchange XML writer (C8, §4.8).
//!
//! Unlike [`crate::pdb`], this writer has no ids to assign on its own — it
//! reuses the same [`crate::plan::ExportPlan`] the database writer consumes,
//! so a track or playlist node carries the same id in both output formats.

use crate::config::KeyNotation;
use crate::error::ErrorType;
use crate::key::{self, KeyFormat};
use crate::model::{Collection, Track};
use crate::plan::{ExportPlan, PlanNode};
use std::fmt::Write as _;
use std::path::Path;

/// Name reported in the `Product` element and `EXPORT.INFO` (§4.7 step 6).
pub const PRODUCT_NAME: &str = env!("CARGO_PKG_NAME");

/// Version reported alongside [`PRODUCT_NAME`].
pub const PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render the interchange XML document for `plan` and write it to `path`.
///
/// # Errors
///
/// Returns [`ErrorType::WriteFailed`] if `path` cannot be written.
pub fn write_xml(plan: &ExportPlan, collection: &Collection, key_notation: KeyNotation, path: &Path) -> crate::Result<()> {
    let document = render(plan, collection, key_notation);
    std::fs::write(path, document.as_bytes()).map_err(|e| ErrorType::WriteFailed(format!("{}: {e}", path.display())))
}

/// Render the full document as a `String`, without touching the filesystem —
/// split out so tests can assert on the XML text directly.
#[must_use]
pub fn render(plan: &ExportPlan, collection: &Collection, key_notation: KeyNotation) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<DJ_PLAYLISTS Version=\"1.0.0\">\n");
    let _ = writeln!(out, "  <PRODUCT Name={} Version={} Company=\"\"/>", attr(PRODUCT_NAME), attr(PRODUCT_VERSION));

    let _ = writeln!(out, "  <COLLECTION Entries=\"{}\">", plan.tracks.len());
    for plan_track in &plan.tracks {
        if let Some(track) = collection.track(&plan_track.fingerprint) {
            write_track(&mut out, plan_track.id, track, key_notation);
        }
    }
    out.push_str("  </COLLECTION>\n");

    out.push_str("  <PLAYLISTS>\n");
    write_node_children(&mut out, plan, 0, 2);
    out.push_str("  </PLAYLISTS>\n");

    out.push_str("</DJ_PLAYLISTS>\n");
    out
}

/// Write one `TRACK` element, including its child `POSITION_MARK` cue elements.
fn write_track(out: &mut String, track_id: u32, track: &Track, key_notation: KeyNotation) {
    let tonality = track
        .key_index
        .and_then(|idx| key::to(i32::from(idx), key_format_for(key_notation)).ok())
        .unwrap_or_default();
    let date_added = track
        .date_added
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let location = format!("file://localhost/{}", encode_location(&track.file_path));

    let _ = write!(
        out,
        "    <TRACK TrackID=\"{id}\" Name={title} Artist={artist} Album={album} Genre={genre} \
Kind=\"MP3 File\" Size=\"{size}\" TotalTime=\"{total_time}\" Year=\"0\" AverageBpm=\"{bpm:.2}\" \
Bitrate=\"{bitrate}\" SampleRate=\"{sample_rate}\" Rating=\"{rating}\" PlayCount=\"{play_count}\" \
DateAdded=\"{date_added}\" Tonality={tonality} Location={location}",
        id = track_id,
        title = attr(&track.title),
        artist = attr(&track.artist),
        album = attr(&track.album),
        genre = attr(&track.genre),
        size = track.file_size,
        total_time = track.duration_secs,
        bpm = track.bpm,
        bitrate = track.bitrate,
        sample_rate = track.sample_rate,
        rating = track.rating,
        play_count = track.play_count,
        date_added = date_added,
        tonality = attr(&tonality),
        location = attr(&location),
    );

    if track.cues.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    for cue in &track.cues {
        write_cue(out, cue);
    }
    out.push_str("    </TRACK>\n");
}

/// Write one `POSITION_MARK` element for a cue point.
fn write_cue(out: &mut String, cue: &crate::model::CuePoint) {
    let kind = if cue.is_loop() { 4 } else { 0 };
    let num = i32::from(cue.hot_cue_slot);
    let start_secs = f64::from(cue.start_ms) / 1000.0;
    let (red, green, blue) = cue.color.unwrap_or((40, 226, 20));
    let _ = write!(out, "      <POSITION_MARK Name={} Type=\"{kind}\" Start=\"{start_secs:.3}\"", attr(&cue.name));
    if cue.is_loop() {
        let end_secs = f64::from(cue.start_ms + cue.length_ms) / 1000.0;
        let _ = write!(out, " End=\"{end_secs:.3}\"");
    }
    let _ = writeln!(out, " Num=\"{num}\" Red=\"{red}\" Green=\"{green}\" Blue=\"{blue}\"/>");
}

/// Recursively write the `NODE` elements for `node_id`'s children.
fn write_node_children(out: &mut String, plan: &ExportPlan, node_id: u32, indent: usize) {
    let pad = "  ".repeat(indent);
    let mut children: Vec<&PlanNode> = plan.nodes.iter().filter(|n| n.parent_id == node_id && n.id != node_id).collect();
    children.sort_by_key(|n| n.seq);
    for node in children {
        if node.is_folder {
            let child_count = plan.nodes.iter().filter(|n| n.parent_id == node.id && n.id != node.id).count();
            let _ = writeln!(out, "{pad}<NODE Type=\"0\" Name={} Count=\"{child_count}\">", attr(&node.name));
            write_node_children(out, plan, node.id, indent + 1);
            let _ = writeln!(out, "{pad}</NODE>");
        } else {
            let _ = writeln!(out, "{pad}<NODE Type=\"1\" Name={} Entries=\"{}\">", attr(&node.name), node.track_ids.len());
            for &track_id in &node.track_ids {
                let _ = writeln!(out, "{pad}  <TRACK Key=\"{track_id}\"/>");
            }
            let _ = writeln!(out, "{pad}</NODE>");
        }
    }
}

/// Map the config-level key-notation choice to the key translator's format enum.
fn key_format_for(notation: KeyNotation) -> KeyFormat {
    match notation {
        KeyNotation::OpenKey => KeyFormat::OpenKey,
        KeyNotation::Classical => KeyFormat::Classical,
        KeyNotation::FlatClassical => KeyFormat::FlatClassical,
    }
}

/// URL-encode a path's components with forward slashes, per §4.8's `Location` format.
fn encode_location(path: &Path) -> String {
    path.components()
        .map(|c| urlencoding::encode(&c.as_os_str().to_string_lossy()).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Render `value` as a quoted, XML-escaped attribute, e.g. `"foo &amp; bar"`.
fn attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped.push('"');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fingerprint, Node, NodeKind, PlaylistEntry};

    fn sample_track() -> Track {
        Track {
            fingerprint: Fingerprint("t1".to_string()),
            title: "Song & Title".to_string(),
            artist: "Artist".to_string(),
            album: String::new(),
            genre: String::new(),
            label: String::new(),
            comment: String::new(),
            remixer: String::new(),
            file_path: "/music/song.mp3".into(),
            file_size: 1000,
            sample_rate: 44_100,
            bitrate: 320,
            sample_depth: 16,
            duration_secs: 200,
            duration_secs_float: 200.0,
            bpm: 128.5,
            key_index: Some(0),
            rating: 4,
            play_count: 2,
            date_added: chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
            date_modified: None,
            last_played: None,
            color_index: None,
            cues: Vec::new(),
            grid_anchor_ms: None,
        }
    }

    fn plan_with_one_track() -> (Collection, ExportPlan) {
        let mut collection = Collection::new();
        collection.insert_track(sample_track());
        let mut playlist = Node::new_playlist("My Playlist");
        if let NodeKind::Playlist { entries } = &mut playlist.kind {
            entries.push(PlaylistEntry::Resolved(Fingerprint("t1".to_string())));
        }
        let playlist_id = collection.push_node(playlist);
        collection.roots.push(playlist_id);
        let plan = crate::plan::build(&collection, &collection.roots.clone());
        (collection, plan)
    }

    #[test]
    fn collection_entries_attribute_matches_track_count() {
        let (collection, plan) = plan_with_one_track();
        let xml = render(&plan, &collection, KeyNotation::OpenKey);
        assert!(xml.contains("<COLLECTION Entries=\"1\">"));
    }

    #[test]
    fn ampersand_in_title_is_escaped() {
        let (collection, plan) = plan_with_one_track();
        let xml = render(&plan, &collection, KeyNotation::OpenKey);
        assert!(xml.contains("Song &amp; Title"));
        assert!(!xml.contains("Song & Title"));
    }

    #[test]
    fn playlist_node_lists_its_track_by_key() {
        let (collection, plan) = plan_with_one_track();
        let xml = render(&plan, &collection, KeyNotation::OpenKey);
        assert!(xml.contains("<NODE Type=\"1\" Name=\"My Playlist\" Entries=\"1\">"));
        assert!(xml.contains("<TRACK Key=\"1\"/>"));
    }

    #[test]
    fn location_uses_file_localhost_scheme() {
        let (collection, plan) = plan_with_one_track();
        let xml = render(&plan, &collection, KeyNotation::OpenKey);
        assert!(xml.contains("file://localhost/music/song.mp3"));
    }
}
