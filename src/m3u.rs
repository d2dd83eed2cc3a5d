// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! M3U playlist writer (A5, §4.14).
//!
//! One file per playlist node; folders contribute no file of their own, only
//! a directory boundary between the playlists nested under them.

use crate::error::ErrorType;
use crate::model::{Collection, NodeId, NodeKind, PlaylistEntry};
use crate::sanitize::sanitize_basename;
use std::fmt::Write as _;
use std::path::Path;

/// Write one `.m3u8` file per playlist reachable from `roots`, into `output_dir`.
///
/// Folders are walked but contribute no file; smartlists are skipped, since
/// this target has no notion of a saved query to evaluate (§4.14: "this
/// target intentionally ignores all per-track metadata beyond what `EXTINF`
/// needs", and a smartlist carries none of that to begin with).
///
/// # Errors
///
/// Returns [`ErrorType::WriteFailed`] if `output_dir` or any playlist file
/// cannot be written, or [`ErrorType::PathUnrepresentable`] if a playlist
/// name cannot be sanitised into a usable filename.
pub fn write_playlists(collection: &Collection, roots: &[NodeId], output_dir: &Path) -> crate::Result<usize> {
    std::fs::create_dir_all(output_dir).map_err(|e| ErrorType::WriteFailed(e.to_string()))?;
    let mut written = 0usize;
    let mut used_names: Vec<String> = Vec::new();
    for &root in roots {
        write_subtree(collection, root, output_dir, &mut used_names, &mut written)?;
    }
    Ok(written)
}

/// Recursively walk `node_id`, writing one file per playlist encountered.
fn write_subtree(
    collection: &Collection,
    node_id: NodeId,
    output_dir: &Path,
    used_names: &mut Vec<String>,
    written: &mut usize,
) -> crate::Result<()> {
    let node = &collection.nodes[node_id];
    match &node.kind {
        NodeKind::Folder { children } => {
            for &child in children {
                write_subtree(collection, child, output_dir, used_names, written)?;
            }
        }
        NodeKind::Smartlist { .. } => {}
        NodeKind::Playlist { entries } => {
            let basename = sanitize_basename(&node.name)?;
            let filename = disambiguate(&basename, used_names);
            let path = output_dir.join(format!("{filename}.m3u8"));
            let contents = render(collection, entries);
            std::fs::write(&path, contents.as_bytes()).map_err(|e| ErrorType::WriteFailed(format!("{}: {e}", path.display())))?;
            *written += 1;
        }
    }
    Ok(())
}

/// Append a numeric suffix if `basename` has already been used at this level,
/// so two playlists with the same sanitised name don't overwrite each other.
fn disambiguate(basename: &str, used_names: &mut Vec<String>) -> String {
    if !used_names.contains(&basename.to_string()) {
        used_names.push(basename.to_string());
        return basename.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{basename} ({n})");
        if !used_names.contains(&candidate) {
            used_names.push(candidate.clone());
            return candidate;
        }
        n += 1;
    }
}

/// Render one playlist's `.m3u8` body: `#EXTM3U`, then an `#EXTINF`/path pair
/// per resolved track in playlist order.
fn render(collection: &Collection, entries: &[PlaylistEntry]) -> String {
    let mut out = String::from("#EXTM3U\n");
    for entry in entries {
        let PlaylistEntry::Resolved(fingerprint) = entry else {
            continue;
        };
        let Some(track) = collection.track(fingerprint) else {
            continue;
        };
        let duration = track.duration_secs;
        let _ = writeln!(out, "#EXTINF:{duration},{} - {}", track.artist, track.title);
        let _ = writeln!(out, "{}", track.file_path.display());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fingerprint, Node, Track};
    use tempfile::tempdir;

    fn sample_track(fingerprint: &str, title: &str) -> Track {
        Track {
            fingerprint: Fingerprint(fingerprint.to_string()),
            title: title.to_string(),
            artist: "Artist".to_string(),
            album: String::new(),
            genre: String::new(),
            label: String::new(),
            comment: String::new(),
            remixer: String::new(),
            file_path: format!("/music/{title}.mp3").into(),
            file_size: 0,
            sample_rate: 44_100,
            bitrate: 320,
            sample_depth: 16,
            duration_secs: 222,
            duration_secs_float: 222.0,
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

    #[test]
    fn one_file_per_playlist_folders_contribute_none() {
        let mut collection = Collection::new();
        collection.insert_track(sample_track("a", "Song A"));

        let mut playlist = Node::new_playlist("Set 1");
        if let NodeKind::Playlist { entries } = &mut playlist.kind {
            entries.push(PlaylistEntry::Resolved(Fingerprint("a".to_string())));
        }
        let playlist_id = collection.push_node(playlist);
        let mut folder = Node::new_folder("Sets");
        if let NodeKind::Folder { children } = &mut folder.kind {
            children.push(playlist_id);
        }
        let folder_id = collection.push_node(folder);
        collection.roots.push(folder_id);

        let dir = tempdir().unwrap();
        let written = write_playlists(&collection, &collection.roots.clone(), dir.path()).unwrap();
        assert_eq!(written, 1);
        assert!(dir.path().join("Set 1.m3u8").exists());
    }

    #[test]
    fn extinf_line_carries_duration_artist_and_title() {
        let mut collection = Collection::new();
        collection.insert_track(sample_track("a", "Song A"));
        let mut playlist = Node::new_playlist("Set 1");
        if let NodeKind::Playlist { entries } = &mut playlist.kind {
            entries.push(PlaylistEntry::Resolved(Fingerprint("a".to_string())));
        }
        let playlist_id = collection.push_node(playlist);
        collection.roots.push(playlist_id);

        let dir = tempdir().unwrap();
        write_playlists(&collection, &collection.roots.clone(), dir.path()).unwrap();
        let contents = std::fs::read_to_string(dir.path().join("Set 1.m3u8")).unwrap();
        assert!(contents.starts_with("#EXTM3U\n"));
        assert!(contents.contains("#EXTINF:222,Artist - Song A\n"));
        assert!(contents.contains("/music/Song A.mp3"));
    }

    #[test]
    fn duplicate_playlist_names_get_disambiguated() {
        let mut collection = Collection::new();
        let p1 = collection.push_node(Node::new_playlist("Same"));
        let p2 = collection.push_node(Node::new_playlist("Same"));
        collection.roots.push(p1);
        collection.roots.push(p2);

        let dir = tempdir().unwrap();
        let written = write_playlists(&collection, &collection.roots.clone(), dir.path()).unwrap();
        assert_eq!(written, 2);
        assert!(dir.path().join("Same.m3u8").exists());
        assert!(dir.path().join("Same (2).m3u8").exists());
    }
}
