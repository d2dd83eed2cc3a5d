// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The source collection parser (C4).
//!
//! The document is decoded and pre-cleaned up front rather than streamed byte
//! by byte: [`super::encoding::decode`] has to see the whole file to run its
//! statistical detector, and the control-character/stray-`&` repair pass
//! needs the same full text before a single XML event can safely be parsed.
//! What *is* streamed is the event loop itself — [`quick_xml::Reader`] walks
//! the cleaned text one element at a time, and a malformed `ENTRY` is caught
//! and dropped without aborting the rest of the document.

use crate::error::ErrorType;
use crate::filename_index::FilenameIndex;
use crate::model::{Collection, CueKind, CuePoint, Fingerprint, Node, NodeKind, PlaylistEntry, Track};
use crate::progress::ProgressSink;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Emit a progress update every this many entries processed.
const PROGRESS_STRIDE: usize = 500;

/// Parse a source collection document at `path` into a [`Collection`].
///
/// If `music_root` is given, tracks whose recorded path no longer exists on
/// disk are looked up by basename in a [`FilenameIndex`] built from that root
/// (capacity `filename_index_cap`); a hit overwrites the track's path, a miss
/// leaves it untouched.
///
/// # Errors
///
/// Returns [`ErrorType::SourceUnreadable`] if `path` cannot be read, or
/// [`ErrorType::SourceUnparseable`] if the document is malformed beyond what
/// recovery mode can absorb (e.g. truncated mid-element). Per-entry failures
/// are not returned as errors: the offending entry is dropped and recorded in
/// [`crate::model::CollectionStats::issues`].
pub fn parse_collection(
    path: &Path,
    music_root: Option<&Path>,
    filename_index_cap: usize,
    progress: &ProgressSink,
) -> crate::Result<Collection> {
    let started = Instant::now();
    let bytes = std::fs::read(path)
        .map_err(|e| ErrorType::SourceUnreadable(format!("{}: {e}", path.display())))?;
    let text = super::encoding::decode(&bytes);
    let cleaned = preclean(&text);

    let mut collection = Collection::new();
    let mut raw_keys: HashMap<String, Fingerprint> = HashMap::new();
    let mut entry_count = 0usize;

    let mut reader = Reader::from_str(&cleaned);
    reader.config_mut().trim_text_start = true;
    reader.config_mut().trim_text_end = true;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Eof => break,
            Event::Start(e) => match e.name().as_ref() {
                b"NML" => collection.stats.version = get_attr(&e, "VERSION").unwrap_or_default(),
                b"COLLECTION" => parse_collection_section(
                    &mut reader,
                    &mut collection,
                    &mut raw_keys,
                    progress,
                    &mut entry_count,
                )?,
                b"PLAYLISTS" => parse_playlists_section(&mut reader, &mut collection)?,
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"NML" => {
                collection.stats.version = get_attr(&e, "VERSION").unwrap_or_default();
            }
            _ => {}
        }
    }

    if collection.stats.version.is_empty() {
        return Err(ErrorType::SourceUnparseable(
            "no NML root element found".to_string(),
        ));
    }

    collection.resolve_playlist_entries(|raw_key| raw_keys.get(raw_key).cloned());

    if let Some(root) = music_root {
        repair_paths(&mut collection, root, filename_index_cap);
    }

    collection.stats.entry_count = entry_count;
    collection.stats.parse_time_ms =
        u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    progress.report(100, format!("parsed {entry_count} entries"));

    Ok(collection)
}

fn xml_err(err: quick_xml::Error) -> ErrorType {
    ErrorType::SourceUnparseable(err.to_string())
}

/// Read the `COLLECTION` element's children, materialising one track per `ENTRY`.
fn parse_collection_section(
    reader: &mut Reader<&[u8]>,
    collection: &mut Collection,
    raw_keys: &mut HashMap<String, Fingerprint>,
    progress: &ProgressSink,
    entry_count: &mut usize,
) -> crate::Result<()> {
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::End(e) if e.name().as_ref() == b"COLLECTION" => return Ok(()),
            Event::Start(e) if e.name().as_ref() == b"ENTRY" => {
                match parse_entry(reader, &e, false) {
                    Ok((track, raw_key)) => {
                        raw_keys.insert(raw_key, track.fingerprint.clone());
                        collection.insert_track(track);
                        *entry_count += 1;
                        if *entry_count % PROGRESS_STRIDE == 0 {
                            progress.report(
                                percentage_estimate(*entry_count),
                                format!("parsed {entry_count} entries"),
                            );
                        }
                    }
                    Err(issue) => collection.stats.issues.push(issue),
                }
            }
            Event::Empty(e) if e.name().as_ref() == b"ENTRY" => {
                collection
                    .stats
                    .issues
                    .push("ENTRY has no LOCATION element".to_string());
            }
            Event::Eof => {
                return Err(ErrorType::SourceUnparseable(
                    "unexpected end of document inside COLLECTION".to_string(),
                ))
            }
            _ => {}
        }
    }
}

/// Progress is reported in terms of entries processed, not document bytes, so
/// this is a rough heartbeat rather than a true completion percentage; it
/// caps below 100 so the final `report(100, ..)` in [`parse_collection`] is
/// unambiguously the last update.
fn percentage_estimate(entry_count: usize) -> u8 {
    u8::try_from((entry_count / PROGRESS_STRIDE).min(99)).unwrap_or(99)
}

/// Parse one `ENTRY` element into a `(Track, raw_key)` pair, where `raw_key`
/// is the volume+path string used later to resolve playlist references.
///
/// `start` is the already-consumed opening tag; if `was_empty` the element
/// had no children (and is therefore rejected: an entry needs at least a
/// `LOCATION` child).
fn parse_entry(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    was_empty: bool,
) -> Result<(Track, String), String> {
    if was_empty {
        return Err("ENTRY has no LOCATION element".to_string());
    }

    let title = get_attr(start, "TITLE").unwrap_or_default();
    let artist = get_attr(start, "ARTIST").unwrap_or_default();
    let date_modified = get_attr(start, "MODIFIED_DATE").and_then(|s| parse_nml_date(&s));

    let mut album = String::new();
    let mut genre = String::new();
    let mut label = String::new();
    let mut comment = String::new();
    let mut remixer = String::new();
    let mut bitrate = 0u32;
    let mut duration_secs = 0u32;
    let mut duration_secs_float = 0.0f64;
    let mut date_added = None;
    let mut play_count = 0u32;
    let mut rating = 0u8;
    let mut bpm = 0.0f64;
    let mut key_index = None;
    let mut location: Option<(PathBuf, String)> = None;
    let mut cues = Vec::new();
    let mut grid_anchor_ms = None;
    let mut grid_bpm = None;
    let mut display_order = 0u32;

    loop {
        let event = reader.read_event().map_err(|e| e.to_string())?;
        let (e, is_start) = match event {
            Event::End(e) if e.name().as_ref() == b"ENTRY" => break,
            Event::Eof => return Err("unexpected end of document inside ENTRY".to_string()),
            Event::Start(e) => (e, true),
            Event::Empty(e) => (e, false),
            _ => continue,
        };
        {
            match e.name().as_ref() {
                b"LOCATION" => {
                    let dir = get_attr(&e, "DIR").unwrap_or_default();
                    let file = get_attr(&e, "FILE").unwrap_or_default();
                    let volume = get_attr(&e, "VOLUME").unwrap_or_default();
                    let raw_key = format!("{volume}{dir}{file}");
                    location = Some((build_location_path(&dir, &file, &volume), raw_key));
                }
                b"ALBUM" => album = get_attr(&e, "TITLE").unwrap_or_default(),
                b"INFO" => {
                    bitrate = get_attr(&e, "BITRATE")
                        .and_then(|s| s.parse::<u32>().ok())
                        .map_or(0, |bps| bps / 1000);
                    duration_secs = get_attr(&e, "PLAYTIME")
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(0);
                    duration_secs_float = get_attr(&e, "PLAYTIME_FLOAT")
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(f64::from(duration_secs));
                    genre = get_attr(&e, "GENRE").unwrap_or_default();
                    label = get_attr(&e, "LABEL").unwrap_or_default();
                    comment = get_attr(&e, "COMMENT").unwrap_or_default();
                    remixer = get_attr(&e, "REMIXER").unwrap_or_default();
                    date_added = get_attr(&e, "IMPORT_DATE").and_then(|s| parse_nml_date(&s));
                    play_count = get_attr(&e, "PLAYCOUNT")
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(0);
                    rating = get_attr(&e, "RANKING")
                        .and_then(|s| s.parse::<u8>().ok())
                        .map_or(0, rating_from_ranking);
                }
                b"TEMPO" => {
                    bpm = get_attr(&e, "BPM").and_then(|s| s.parse().ok()).unwrap_or(0.0);
                }
                b"MUSICAL_KEY" => {
                    key_index = get_attr(&e, "VALUE")
                        .and_then(|s| s.parse::<u8>().ok())
                        .filter(|idx| *idx < 24);
                }
                b"CUE_V2" => {
                    display_order += 1;
                    let name = get_attr(&e, "NAME").unwrap_or_default();
                    let type_attr: i32 = get_attr(&e, "TYPE").and_then(|s| s.parse().ok()).unwrap_or(0);
                    let start_ms = get_attr(&e, "START")
                        .and_then(|s| s.parse::<f64>().ok())
                        .map_or(0, |ms| ms.max(0.0).round() as u32);
                    let length_ms = get_attr(&e, "LEN")
                        .and_then(|s| s.parse::<f64>().ok())
                        .map_or(0, |ms| ms.max(0.0).round() as u32);
                    let hot_cue_slot = get_attr(&e, "HOTCUE")
                        .and_then(|s| s.parse::<i8>().ok())
                        .unwrap_or(-1);
                    let color = get_attr(&e, "COLOR")
                        .and_then(|s| s.parse::<u32>().ok())
                        .map(|v| (((v >> 16) & 0xFF) as u8, ((v >> 8) & 0xFF) as u8, (v & 0xFF) as u8));
                    let kind = cue_kind(type_attr, hot_cue_slot, length_ms);
                    if kind == CueKind::GridAnchor {
                        grid_anchor_ms = Some(start_ms);
                    }
                    cues.push(CuePoint {
                        name,
                        kind,
                        start_ms,
                        length_ms,
                        hot_cue_slot,
                        display_order: display_order - 1,
                        color,
                    });
                }
                b"GRID" => {
                    if let Some(bpm_str) = get_attr(&e, "BPM") {
                        grid_bpm = bpm_str.parse::<f64>().ok();
                    }
                }
                _ => {
                    if is_start {
                        reader
                            .read_to_end(e.name())
                            .map_err(|err| err.to_string())?;
                    }
                }
            }
        }
    }

    let Some((file_path, raw_key)) = location else {
        return Err("ENTRY has no LOCATION element".to_string());
    };

    if bpm == 0.0 {
        if let Some(promoted) = grid_bpm {
            bpm = promoted;
        }
    }

    let fingerprint = Fingerprint::from_path(Path::new(&raw_key));

    let track = Track {
        fingerprint,
        title,
        artist,
        album,
        genre,
        label,
        comment,
        remixer,
        file_path,
        // Source collections of this kind do not carry audio-signal
        // properties (Non-goal: BPM/key come from metadata, never
        // redetected); 0 is the model's "unknown" sentinel.
        file_size: 0,
        sample_rate: 0,
        bitrate,
        sample_depth: 0,
        duration_secs,
        duration_secs_float,
        bpm,
        key_index,
        rating,
        play_count,
        date_added,
        date_modified,
        last_played: None,
        color_index: None,
        cues,
        grid_anchor_ms,
    };

    Ok((track, raw_key))
}

/// Bucket a 0..255 ranking into the 0..5 star scale (§4.4).
fn rating_from_ranking(ranking: u8) -> u8 {
    ((u32::from(ranking) + 25) / 51).min(5) as u8
}

/// Classify a cue by its source `TYPE`, hot-cue slot, and length.
fn cue_kind(type_attr: i32, hot_cue_slot: i8, length_ms: u32) -> CueKind {
    if length_ms > 0 {
        return CueKind::Loop;
    }
    match type_attr {
        1 => CueKind::FadeIn,
        2 => CueKind::FadeOut,
        4 => CueKind::GridAnchor,
        _ if hot_cue_slot < 0 => CueKind::Memory,
        _ => CueKind::Cue,
    }
}

/// Build an absolute path from a Traktor-style `DIR`/`FILE`/`VOLUME` triple.
/// `DIR` segments are separated by `/:` with leading and trailing markers.
fn build_location_path(dir: &str, file: &str, volume: &str) -> PathBuf {
    let mut path = String::new();
    path.push_str(volume);
    if !volume.is_empty() && !volume.ends_with('/') && !volume.ends_with('\\') {
        path.push('/');
    }
    for segment in dir.split("/:").filter(|s| !s.is_empty()) {
        path.push_str(segment);
        path.push('/');
    }
    path.push_str(file);
    PathBuf::from(path)
}

/// Parse a `YYYY/M/D` date, the format used throughout the source collection.
fn parse_nml_date(value: &str) -> Option<chrono::NaiveDate> {
    let mut parts = value.split('/');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(year, month, day)
}

/// Read the `PLAYLISTS` element's children: zero or more root `NODE`s.
fn parse_playlists_section(
    reader: &mut Reader<&[u8]>,
    collection: &mut Collection,
) -> crate::Result<()> {
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::End(e) if e.name().as_ref() == b"PLAYLISTS" => return Ok(()),
            Event::Start(e) if e.name().as_ref() == b"NODE" => {
                let id = parse_node(reader, collection, &e, false)?;
                collection.roots.push(id);
            }
            Event::Empty(e) if e.name().as_ref() == b"NODE" => {
                let id = parse_node(reader, collection, &e, true)?;
                collection.roots.push(id);
            }
            Event::Eof => {
                return Err(ErrorType::SourceUnparseable(
                    "unexpected end of document inside PLAYLISTS".to_string(),
                ))
            }
            _ => {}
        }
    }
}

/// Parse one `NODE` element (folder, playlist, or smartlist), recursing into
/// children as needed, and return its freshly assigned id.
///
/// `SUBNODES` (around child `NODE`s) and `PLAYLIST` (around `ENTRY`/
/// `PRIMARYKEY` pairs) are transparent wrapper elements: both are ignored by
/// the catch-all arm below, so only the tags this function actually cares
/// about need to be matched.
fn parse_node(
    reader: &mut Reader<&[u8]>,
    collection: &mut Collection,
    start: &BytesStart,
    was_empty: bool,
) -> crate::Result<crate::model::NodeId> {
    let node_type = get_attr(start, "TYPE").unwrap_or_default();
    let name = get_attr(start, "NAME").unwrap_or_default();

    if was_empty {
        let node = match node_type.as_str() {
            "PLAYLIST" => Node::new_playlist(name),
            "SMARTLIST" => Node::new_smartlist(name, String::new()),
            _ => Node::new_folder(name),
        };
        return Ok(collection.push_node(node));
    }

    match node_type.as_str() {
        "PLAYLIST" => {
            let mut entries = Vec::new();
            loop {
                match reader.read_event().map_err(xml_err)? {
                    Event::End(e) if e.name().as_ref() == b"NODE" => break,
                    Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"PRIMARYKEY" => {
                        if let Some(key) = get_attr(&e, "KEY") {
                            entries.push(PlaylistEntry::Unresolved(key));
                        }
                    }
                    Event::Eof => {
                        return Err(ErrorType::SourceUnparseable(
                            "unexpected end of document inside playlist NODE".to_string(),
                        ))
                    }
                    _ => {}
                }
            }
            let mut node = Node::new_playlist(name);
            if let NodeKind::Playlist { entries: slot } = &mut node.kind {
                *slot = entries;
            }
            Ok(collection.push_node(node))
        }
        "SMARTLIST" => {
            let mut query = String::new();
            loop {
                match reader.read_event().map_err(xml_err)? {
                    Event::End(e) if e.name().as_ref() == b"NODE" => break,
                    Event::Text(text) => {
                        if let Ok(decoded) = text.decode() {
                            query.push_str(&decoded);
                        }
                    }
                    Event::Eof => {
                        return Err(ErrorType::SourceUnparseable(
                            "unexpected end of document inside smartlist NODE".to_string(),
                        ))
                    }
                    _ => {}
                }
            }
            Ok(collection.push_node(Node::new_smartlist(name, query)))
        }
        _ => {
            // FOLDER, or an unrecognised kind treated as an empty folder.
            let mut children = Vec::new();
            loop {
                match reader.read_event().map_err(xml_err)? {
                    Event::End(e) if e.name().as_ref() == b"NODE" => break,
                    Event::Start(e) if e.name().as_ref() == b"NODE" => {
                        children.push(parse_node(reader, collection, &e, false)?);
                    }
                    Event::Empty(e) if e.name().as_ref() == b"NODE" => {
                        children.push(parse_node(reader, collection, &e, true)?);
                    }
                    Event::Eof => {
                        return Err(ErrorType::SourceUnparseable(
                            "unexpected end of document inside folder NODE".to_string(),
                        ))
                    }
                    _ => {}
                }
            }
            let mut node = Node::new_folder(name);
            if let NodeKind::Folder { children: slot } = &mut node.kind {
                *slot = children;
            }
            Ok(collection.push_node(node))
        }
    }
}

/// For every track whose recorded path is missing on disk, try to relocate it
/// by basename using a [`FilenameIndex`] built from `root`. Failures to build
/// the index are recorded as an issue rather than aborting the parse (§4.3).
fn repair_paths(collection: &mut Collection, root: &Path, filename_index_cap: usize) {
    let mut index = match FilenameIndex::build(root, filename_index_cap) {
        Ok(index) => index,
        Err(err) => {
            collection
                .stats
                .issues
                .push(format!("filename index unusable, repair disabled: {err}"));
            return;
        }
    };

    let fingerprints: Vec<Fingerprint> = collection.tracks().map(|t| t.fingerprint.clone()).collect();
    for fingerprint in fingerprints {
        let needs_repair = collection
            .track(&fingerprint)
            .is_some_and(|t| !t.file_path.exists());
        if !needs_repair {
            continue;
        }
        let basename = collection
            .track(&fingerprint)
            .and_then(|t| t.file_path.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_owned);
        let Some(basename) = basename else { continue };
        if let Some(found) = index.lookup(&basename) {
            let found = found.to_path_buf();
            if let Some(track) = collection.track_mut(&fingerprint) {
                track.file_path = found;
            }
        }
    }
}

/// Strip forbidden control characters and escape stray `&` not starting a
/// known entity, ahead of handing the text to the XML reader (§4.4).
fn preclean(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if is_forbidden_control(c) {
            continue;
        }
        if c == '&' {
            let lookahead: String = chars.clone().take(12).collect();
            if looks_like_entity(&lookahead) {
                out.push(c);
            } else {
                out.push_str("&amp;");
            }
            continue;
        }
        out.push(c);
    }
    out
}

fn is_forbidden_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F | 0x7F)
}

fn looks_like_entity(lookahead: &str) -> bool {
    const NAMED: [&str; 5] = ["amp;", "lt;", "gt;", "quot;", "apos;"];
    if NAMED.iter().any(|entity| lookahead.starts_with(entity)) {
        return true;
    }
    let Some(rest) = lookahead.strip_prefix('#') else {
        return false;
    };
    let digits: String = rest
        .chars()
        .take_while(|c| c.is_ascii_hexdigit() || *c == 'x')
        .collect();
    !digits.is_empty() && rest[digits.len()..].starts_with(';')
}

fn get_attr(start: &BytesStart, key: &str) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key.as_bytes())
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::channel;
    use std::io::Write;

    fn write_fixture(xml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(xml.as_bytes()).unwrap();
        file
    }

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<NML VERSION="19">
  <COLLECTION ENTRIES="1">
    <ENTRY TITLE="A" ARTIST="B" MODIFIED_DATE="2020/1/2">
      <LOCATION DIR="/:Music/:" FILE="song.mp3" VOLUME="C:"/>
      <ALBUM TITLE="C"/>
      <INFO BITRATE="320000" PLAYTIME="180" RANKING="204" GENRE="House"/>
      <TEMPO BPM="128.00"/>
      <MUSICAL_KEY VALUE="5"/>
      <CUE_V2 NAME="Drop" TYPE="0" START="1000" LEN="0" HOTCUE="0"/>
    </ENTRY>
  </COLLECTION>
  <PLAYLISTS>
    <NODE TYPE="FOLDER" NAME="ROOT">
      <SUBNODES COUNT="1">
        <NODE TYPE="PLAYLIST" NAME="PL">
          <PLAYLIST ENTRIES="1" TYPE="LIST">
            <ENTRY>
              <PRIMARYKEY TYPE="TRACK" KEY="C:/:Music/:song.mp3"/>
            </ENTRY>
          </PLAYLIST>
        </NODE>
      </SUBNODES>
    </NODE>
  </PLAYLISTS>
</NML>
"#;

    #[test]
    fn parses_minimal_collection() {
        let file = write_fixture(FIXTURE);
        let (sink, _source) = channel();
        let collection = parse_collection(file.path(), None, 100, &sink).unwrap();

        assert_eq!(collection.track_count(), 1);
        let track = collection.tracks().next().unwrap();
        assert_eq!(track.title, "A");
        assert_eq!(track.artist, "B");
        assert_eq!(track.album, "C");
        assert_eq!(track.bitrate, 320);
        assert_eq!(track.rating, 4);
        assert_eq!(track.key_index, Some(5));
        assert_eq!(track.cues.len(), 1);
    }

    #[test]
    fn resolves_playlist_entry_to_track() {
        let file = write_fixture(FIXTURE);
        let (sink, _source) = channel();
        let collection = parse_collection(file.path(), None, 100, &sink).unwrap();

        assert_eq!(collection.roots.len(), 1);
        let root = &collection.nodes[collection.roots[0]];
        let NodeKind::Folder { children } = &root.kind else {
            panic!("expected root to be a folder");
        };
        let playlist = &collection.nodes[children[0]];
        let NodeKind::Playlist { entries } = &playlist.kind else {
            panic!("expected child to be a playlist");
        };
        assert_eq!(entries.len(), 1);
        assert!(matches!(entries[0], PlaylistEntry::Resolved(_)));
    }

    #[test]
    fn stray_ampersand_drops_at_most_one_entry() {
        let xml = FIXTURE.replace("TITLE=\"A\"", "TITLE=\"A & B\"");
        let file = write_fixture(&xml);
        let (sink, _source) = channel();
        let collection = parse_collection(file.path(), None, 100, &sink).unwrap();
        assert_eq!(collection.track_count(), 1);
        assert_eq!(collection.tracks().next().unwrap().title, "A &amp; B");
    }

    #[test]
    fn rating_bucket_matches_source_scale() {
        assert_eq!(rating_from_ranking(0), 0);
        assert_eq!(rating_from_ranking(51), 1);
        assert_eq!(rating_from_ranking(102), 2);
        assert_eq!(rating_from_ranking(153), 3);
        assert_eq!(rating_from_ranking(204), 4);
        assert_eq!(rating_from_ranking(255), 5);
    }
}
