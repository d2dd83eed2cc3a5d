// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The paged binary database writer (C6), `PIONEER/rekordbox/export.pdb`.
//!
//! ALL MULTIBYTE INTEGERS HERE ARE LITTLE-ENDIAN — the inverse of
//! [`crate::analysis`], which is big-endian throughout (§4.6, Design Notes
//! "Endianness discipline"). Helpers in this module are named `write_le_*` so
//! a misplaced big-endian write stands out at a glance; nothing is shared
//! with the analysis writer's helpers.
//!
//! The file is a sequence of fixed-size pages. Page 0 holds the file header
//! and table-pointer list; each table (tracks, genres, artists, ...) owns a
//! chain of pages allocated after it, each holding a row region growing from
//! the page header and a string heap growing from the far end of the page
//! (Design Notes "Tagged section variants" describes the analogous pattern
//! for §4.5; here the two regions literally grow toward each other, §4.6).

pub mod string;

use crate::config::Tier;
use crate::error::ErrorType;
use crate::model::{Collection, CueKind, Track};
use crate::plan::{ExportPlan, PlanNode, PlanTrack, RefTable, TrackId};
use std::path::Path;

/// Default page size. 8192 is also acceptable per §4.6 but this writer
/// always uses the 4 KiB default.
const PAGE_LEN: u32 = 4096;

/// File header length: signature, page_len, num_tables, next_unused_page,
/// reserved, sequence, reserved — seven `u32` fields.
const FILE_HEADER_LEN: u32 = 28;

/// One table-pointer entry: kind, reserved, first_page, last_page.
const TABLE_POINTER_LEN: u32 = 16;

/// Page header length (§4.6): kind (u32), next-page (u32), sequence (u32),
/// row count (u16) + 2 bytes padding, heap offset (u16), free space (u16) + 2
/// bytes padding, then two reserved u32s.
const PAGE_HEADER_LEN: u32 = 28;

/// Track row fixed width (§4.6, reconciled in [`build_track_row`]'s doc comment).
const TRACK_ROW_LEN: usize = 88;

/// Reference-table row fixed width: `u32` id + `u32` heap pointer.
const REF_ROW_LEN: usize = 8;

/// Playlist-tree row fixed width: node id, parent id, seq, kind byte, name pointer.
const TREE_ROW_LEN: usize = 17;

/// Playlist-entries row fixed width: playlist id, track id, position.
const ENTRY_ROW_LEN: usize = 12;

/// Table kind ids (§4.6 "Tables, by kind id").
mod kind {
    pub const TRACKS: u32 = 0;
    pub const GENRES: u32 = 1;
    pub const ARTISTS: u32 = 2;
    pub const ALBUMS: u32 = 3;
    pub const LABELS: u32 = 4;
    pub const KEYS: u32 = 5;
    pub const COLOURS: u32 = 6;
    pub const PLAYLIST_TREE: u32 = 7;
    pub const PLAYLIST_ENTRIES: u32 = 8;
    pub const ARTWORK: u32 = 13;
    pub const HISTORY_PLAYLISTS: u32 = 17;
    pub const HISTORY_ENTRIES: u32 = 18;
}

/// A heap-bound string, to be placed in the page heap with the row's pointer
/// patched in once its offset is known.
struct HeapRef {
    /// Byte offset within `RowData::fixed` where the resolved `u32` little-endian
    /// pointer is written.
    patch_offset: usize,
    /// Already DeviceSQL-encoded bytes.
    bytes: Vec<u8>,
}

/// One not-yet-paginated row.
struct RowData {
    /// Used to sort rows within a page in ascending order (§4.6 invariant 5).
    primary_id: u32,
    fixed: Vec<u8>,
    heap_refs: Vec<HeapRef>,
}

/// The bytes of one allocated page, before its header is rendered (the
/// header needs the page's position in its table's chain, known only once
/// every table's page count has been decided).
struct PageContent {
    row_bytes: Vec<u8>,
    heap_bytes: Vec<u8>,
    row_count: u32,
}

/// Write the full database for `plan` to `path`, using `collection` to look
/// up full track records and `tier` to decide hot-cue capacity.
///
/// `contents_root` is the export's `Contents/` directory; track file paths
/// are stored relative to it.
///
/// # Errors
///
/// Returns [`ErrorType::CollectionTooLarge`] if `plan.tracks.len()` exceeds
/// the hardware's 20 000-track limit, or [`ErrorType::WriteFailed`] if the
/// file cannot be written.
pub fn write_database(
    plan: &ExportPlan,
    collection: &Collection,
    contents_root: &Path,
    tier: Tier,
    path: &Path,
) -> crate::Result<()> {
    if plan.tracks.len() > 20_000 {
        return Err(ErrorType::CollectionTooLarge(plan.tracks.len()));
    }

    let bytes = assemble(plan, collection, contents_root, tier);
    std::fs::write(path, &bytes).map_err(|e| ErrorType::WriteFailed(format!("{}: {e}", path.display())))?;

    // §9 Open Question 1: a second, byte-identical copy under the alternate
    // filename older hardware looks for. Copied rather than re-rendered so
    // the two files are guaranteed identical.
    let twin = path.with_file_name("DeviceSQL.edb");
    std::fs::write(&twin, &bytes).map_err(|e| ErrorType::WriteFailed(format!("{}: {e}", twin.display())))?;

    Ok(())
}

/// Build the full file byte-for-byte: all table pages, then the header page
/// with table pointers patched in once every table's first/last page index
/// is known.
fn assemble(plan: &ExportPlan, collection: &Collection, contents_root: &Path, tier: Tier) -> Vec<u8> {
    let tables: Vec<(u32, Vec<PageContent>)> = vec![
        (kind::TRACKS, paginate(build_track_rows(plan, collection, contents_root))),
        (kind::GENRES, paginate(build_ref_rows(&plan.genres))),
        (kind::ARTISTS, paginate(build_ref_rows(&plan.artists))),
        (kind::ALBUMS, paginate(build_ref_rows(&plan.albums))),
        (kind::LABELS, paginate(build_ref_rows(&plan.labels))),
        (kind::KEYS, paginate(build_ref_rows(&plan.keys))),
        (kind::COLOURS, paginate(build_ref_rows(&plan.colours))),
        (kind::PLAYLIST_TREE, paginate(build_tree_rows(plan))),
        (kind::PLAYLIST_ENTRIES, paginate(build_entry_rows(plan))),
        (kind::ARTWORK, Vec::new()),
        (kind::HISTORY_PLAYLISTS, Vec::new()),
        (kind::HISTORY_ENTRIES, Vec::new()),
    ];
    let _ = tier; // tier affects analysis-file hot-cue capacity (C5), not the database layout.

    // Assign global page indices. Page 0 is the header page; data pages
    // start at 1. Every table gets at least one page (even if empty) so its
    // table-pointer entry always names a real, emitted page.
    let mut next_page = 1u32;
    let mut table_pointers = Vec::with_capacity(tables.len());
    let mut rendered_pages: Vec<Vec<u8>> = Vec::new();

    for (tkind, mut pages) in tables {
        if pages.is_empty() {
            pages.push(PageContent {
                row_bytes: Vec::new(),
                heap_bytes: Vec::new(),
                row_count: 0,
            });
        }
        let first_page = next_page;
        let page_count = u32::try_from(pages.len()).unwrap_or(1);
        let last_page = first_page + page_count - 1;
        for (i, page) in pages.into_iter().enumerate() {
            let this_index = first_page + u32::try_from(i).unwrap_or(0);
            let is_last = this_index == last_page;
            let next = if is_last { 0 } else { this_index + 1 };
            let sequence = u32::try_from(i).unwrap_or(0);
            rendered_pages.push(render_page(tkind, &page, next, sequence));
        }
        next_page = last_page + 1;
        table_pointers.push((tkind, first_page, last_page));
    }

    let num_tables = u32::try_from(table_pointers.len()).unwrap_or(0);
    let mut header_page = vec![0u8; PAGE_LEN as usize];
    let mut cursor = 0usize;
    write_le_u32(&mut header_page, &mut cursor, 0); // signature
    write_le_u32(&mut header_page, &mut cursor, PAGE_LEN);
    write_le_u32(&mut header_page, &mut cursor, num_tables);
    write_le_u32(&mut header_page, &mut cursor, next_page); // next_unused_page, invariant 3
    write_le_u32(&mut header_page, &mut cursor, 0); // reserved
    write_le_u32(&mut header_page, &mut cursor, 0); // sequence
    write_le_u32(&mut header_page, &mut cursor, 0); // reserved
    debug_assert_eq!(cursor, FILE_HEADER_LEN as usize);
    for (tkind, first_page, last_page) in table_pointers {
        write_le_u32(&mut header_page, &mut cursor, tkind);
        write_le_u32(&mut header_page, &mut cursor, 0); // reserved / empty-candidate
        write_le_u32(&mut header_page, &mut cursor, first_page);
        write_le_u32(&mut header_page, &mut cursor, last_page);
    }
    debug_assert!(cursor <= PAGE_LEN as usize);
    let _ = TABLE_POINTER_LEN;

    let mut out = Vec::with_capacity((1 + rendered_pages.len()) * PAGE_LEN as usize);
    out.extend_from_slice(&header_page);
    for page in rendered_pages {
        out.extend_from_slice(&page);
    }
    out
}

/// Render one page's final bytes: header (with the now-known chain position)
/// followed by the row region and the heap region, separated by free space so
/// the total is exactly [`PAGE_LEN`] (§8 property 2 / §4.6 invariant 4).
fn render_page(tkind: u32, page: &PageContent, next_page: u32, sequence: u32) -> Vec<u8> {
    let mut out = vec![0u8; PAGE_LEN as usize];
    let heap_offset = PAGE_LEN as usize - page.heap_bytes.len();
    let used = PAGE_HEADER_LEN as usize + page.row_bytes.len() + page.heap_bytes.len();
    let free_space = PAGE_LEN as usize - used;

    let mut cursor = 0usize;
    write_le_u32(&mut out, &mut cursor, tkind);
    write_le_u32(&mut out, &mut cursor, next_page);
    write_le_u32(&mut out, &mut cursor, sequence);
    write_le_u16(&mut out, &mut cursor, u16::try_from(page.row_count).unwrap_or(u16::MAX));
    write_le_u16(&mut out, &mut cursor, 0); // padding
    write_le_u16(&mut out, &mut cursor, u16::try_from(heap_offset).unwrap_or(u16::MAX));
    write_le_u16(&mut out, &mut cursor, u16::try_from(free_space).unwrap_or(u16::MAX));
    write_le_u32(&mut out, &mut cursor, 0); // reserved
    write_le_u32(&mut out, &mut cursor, 0); // reserved
    debug_assert_eq!(cursor, PAGE_HEADER_LEN as usize);

    let row_start = PAGE_HEADER_LEN as usize;
    out[row_start..row_start + page.row_bytes.len()].copy_from_slice(&page.row_bytes);
    out[heap_offset..heap_offset + page.heap_bytes.len()].copy_from_slice(&page.heap_bytes);
    out
}

/// Pack `rows` (sorted ascending by primary id, §4.6 invariant 5) into pages,
/// sealing a page once the next row would overflow [`PAGE_LEN`] and resolving
/// each row's heap pointers against that page's own heap.
fn paginate(mut rows: Vec<RowData>) -> Vec<PageContent> {
    rows.sort_by_key(|r| r.primary_id);

    let mut pages = Vec::new();
    let mut row_bytes = Vec::new();
    let mut heap_bytes: Vec<u8> = Vec::new();
    let mut row_count = 0u32;

    for row in rows {
        let row_len = row.fixed.len();
        let heap_len: usize = row.heap_refs.iter().map(|h| h.bytes.len()).sum();
        let projected = PAGE_HEADER_LEN as usize + row_bytes.len() + row_len + heap_bytes.len() + heap_len;
        if !row_bytes.is_empty() && projected > PAGE_LEN as usize {
            pages.push(PageContent {
                row_bytes: std::mem::take(&mut row_bytes),
                heap_bytes: std::mem::take(&mut heap_bytes),
                row_count,
            });
            row_count = 0;
        }

        let mut fixed = row.fixed;
        for href in row.heap_refs {
            heap_bytes.extend_from_slice(&href.bytes);
            let offset = PAGE_LEN as usize - heap_bytes.len();
            let offset_u32 = u32::try_from(offset).unwrap_or(0);
            fixed[href.patch_offset..href.patch_offset + 4].copy_from_slice(&offset_u32.to_le_bytes());
        }
        row_bytes.extend_from_slice(&fixed);
        row_count += 1;
    }

    pages.push(PageContent {
        row_bytes,
        heap_bytes,
        row_count,
    });
    pages
}

/// Build the track rows.
///
/// The row layout's 88-byte budget (§4.6) only has room for four heap
/// pointers, not the five named in prose (title, file-path, comment,
/// remixer, file-kind): `2+2 header fields + 10 u32 core fields (40) + 2
/// u16 (bitrate/rating) + 4 u32 (colour/date/play-count/year) + 8 reserved =
/// 72`, leaving exactly 16 bytes — four pointers — before the 88-byte cap.
/// `file-kind` is dropped as a separate heap string; it is always derivable
/// from the file-path extension, so storing it again would be redundant
/// with no budget to spare.
fn build_track_rows(plan: &ExportPlan, collection: &Collection, contents_root: &Path) -> Vec<RowData> {
    plan.tracks
        .iter()
        .filter_map(|plan_track| {
            let track = collection.track(&plan_track.fingerprint)?;
            Some(build_track_row(plan_track, track, contents_root))
        })
        .collect()
}

fn build_track_row(plan_track: &PlanTrack, track: &Track, contents_root: &Path) -> RowData {
    let mut fixed = vec![0u8; TRACK_ROW_LEN];
    let mut cursor = 0usize;
    write_le_u16(&mut fixed, &mut cursor, 0x0024); // row-kind marker
    write_le_u16(&mut fixed, &mut cursor, u16::try_from(TRACK_ROW_LEN).unwrap());
    write_le_u32(&mut fixed, &mut cursor, plan_track.id);
    write_le_u32(&mut fixed, &mut cursor, plan_track.artist_id);
    write_le_u32(&mut fixed, &mut cursor, plan_track.album_id);
    write_le_u32(&mut fixed, &mut cursor, plan_track.genre_id);
    write_le_u32(&mut fixed, &mut cursor, plan_track.label_id);
    write_le_u32(&mut fixed, &mut cursor, plan_track.key_id);
    write_le_u32(&mut fixed, &mut cursor, track.bpm_centi());
    write_le_u32(&mut fixed, &mut cursor, track.duration_secs);
    write_le_u32(&mut fixed, &mut cursor, track.sample_rate);
    write_le_u32(&mut fixed, &mut cursor, u32::try_from(track.file_size).unwrap_or(u32::MAX));
    write_le_u16(&mut fixed, &mut cursor, u16::try_from(track.bitrate).unwrap_or(u16::MAX));
    write_le_u16(&mut fixed, &mut cursor, u16::from(track.rating));
    write_le_u32(&mut fixed, &mut cursor, plan_track.colour_id);
    write_le_u32(&mut fixed, &mut cursor, days_since_epoch(track.date_added));
    write_le_u32(&mut fixed, &mut cursor, track.play_count);
    write_le_u32(&mut fixed, &mut cursor, 0); // year: not present in the source metadata (§3)
    cursor += 8; // reserved
    debug_assert_eq!(cursor, 72);

    let title_offset = cursor;
    cursor += 4;
    let path_offset = cursor;
    cursor += 4;
    let comment_offset = cursor;
    cursor += 4;
    let remixer_offset = cursor;
    cursor += 4;
    debug_assert_eq!(cursor, TRACK_ROW_LEN);

    let relative_path = relative_to_contents(&track.file_path, contents_root);
    let heap_refs = vec![
        HeapRef { patch_offset: title_offset, bytes: string::encode(&track.title) },
        HeapRef { patch_offset: path_offset, bytes: string::encode(&relative_path) },
        HeapRef { patch_offset: comment_offset, bytes: string::encode(&track.comment) },
        HeapRef { patch_offset: remixer_offset, bytes: string::encode(&track.remixer) },
    ];

    RowData {
        primary_id: plan_track.id,
        fixed,
        heap_refs,
    }
}

/// Express `path` relative to `contents_root`, falling back to just the file
/// name if `path` was never relocated under it (audio not copied).
fn relative_to_contents(path: &Path, contents_root: &Path) -> String {
    path.strip_prefix(contents_root)
        .ok()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

/// Days since the Unix epoch, or 0 if unset.
fn days_since_epoch(date: Option<chrono::NaiveDate>) -> u32 {
    let Some(date) = date else { return 0 };
    let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date");
    let days = date.signed_duration_since(epoch).num_days();
    u32::try_from(days.max(0)).unwrap_or(0)
}

/// Build rows for a generic `(id, name)` reference table.
fn build_ref_rows(table: &RefTable) -> Vec<RowData> {
    table
        .rows()
        .map(|(id, name)| {
            let mut fixed = vec![0u8; REF_ROW_LEN];
            let mut cursor = 0usize;
            write_le_u32(&mut fixed, &mut cursor, id);
            let name_ptr_offset = cursor;
            cursor += 4;
            debug_assert_eq!(cursor, REF_ROW_LEN);
            RowData {
                primary_id: id,
                fixed,
                heap_refs: vec![HeapRef { patch_offset: name_ptr_offset, bytes: string::encode(name) }],
            }
        })
        .collect()
}

/// Build playlist-tree rows from the plan's flattened node list.
fn build_tree_rows(plan: &ExportPlan) -> Vec<RowData> {
    plan.nodes
        .iter()
        .map(|node: &PlanNode| {
            let mut fixed = vec![0u8; TREE_ROW_LEN];
            let mut cursor = 0usize;
            write_le_u32(&mut fixed, &mut cursor, node.id);
            write_le_u32(&mut fixed, &mut cursor, node.parent_id);
            write_le_u32(&mut fixed, &mut cursor, node.seq);
            fixed[cursor] = u8::from(!node.is_folder);
            cursor += 1;
            let name_ptr_offset = cursor;
            cursor += 4;
            debug_assert_eq!(cursor, TREE_ROW_LEN);
            RowData {
                primary_id: node.id,
                fixed,
                heap_refs: vec![HeapRef { patch_offset: name_ptr_offset, bytes: string::encode(&node.name) }],
            }
        })
        .collect()
}

/// Build playlist-entries rows, ordered by playlist id then position (§4.6).
fn build_entry_rows(plan: &ExportPlan) -> Vec<RowData> {
    let mut rows = Vec::new();
    for node in &plan.nodes {
        for (position, &track_id) in node.track_ids.iter().enumerate() {
            let mut fixed = vec![0u8; ENTRY_ROW_LEN];
            let mut cursor = 0usize;
            write_le_u32(&mut fixed, &mut cursor, node.id);
            write_le_u32(&mut fixed, &mut cursor, track_id);
            write_le_u32(&mut fixed, &mut cursor, u32::try_from(position).unwrap_or(u32::MAX));
            // Sort key combines playlist id (high bits) and position (low
            // bits) so `paginate`'s ascending sort yields "by playlist id
            // then position" without a second pass.
            let primary_id = (node.id << 16) | (u32::try_from(position).unwrap_or(0xFFFF) & 0xFFFF);
            rows.push(RowData {
                primary_id,
                fixed,
                heap_refs: Vec::new(),
            });
        }
    }
    rows
}

fn write_le_u32(buf: &mut [u8], cursor: &mut usize, value: u32) {
    buf[*cursor..*cursor + 4].copy_from_slice(&value.to_le_bytes());
    *cursor += 4;
}

fn write_le_u16(buf: &mut [u8], cursor: &mut usize, value: u16) {
    buf[*cursor..*cursor + 2].copy_from_slice(&value.to_le_bytes());
    *cursor += 2;
}

/// Maximum number of hot-cue slots retained per tier (§2 C7 tier matrix,
/// §4.13): a baseline tier only has three performance pads, higher tiers
/// expose all eight. Cue filtering against this cap happens in the analysis
/// writer (C5); this is exposed here so the database writer and analysis
/// writer agree on the same cap without duplicating the tier table.
#[must_use]
pub fn hot_cue_capacity(tier: Tier) -> usize {
    match tier {
        Tier::TierA => 3,
        Tier::TierB | Tier::TierC => 8,
    }
}

/// Whether `kind` denotes a loop, for callers outside this module that need
/// the same classification the cue tables use.
#[must_use]
pub fn is_loop_kind(kind: CueKind) -> bool {
    kind == CueKind::Loop
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fingerprint, Node, NodeKind, PlaylistEntry};
    use std::path::PathBuf;

    fn sample_track(fingerprint: &str) -> Track {
        Track {
            fingerprint: Fingerprint(fingerprint.to_string()),
            title: "A".to_string(),
            artist: String::new(),
            album: String::new(),
            genre: String::new(),
            label: String::new(),
            comment: String::new(),
            remixer: String::new(),
            file_path: PathBuf::from("/Contents/song.mp3"),
            file_size: 0,
            sample_rate: 44_100,
            bitrate: 320,
            sample_depth: 16,
            duration_secs: 180,
            duration_secs_float: 180.0,
            bpm: 128.0,
            key_index: Some(5),
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

    fn minimal_collection() -> (Collection, ExportPlan) {
        let mut collection = Collection::new();
        collection.insert_track(sample_track("t1"));

        let mut playlist = Node::new_playlist("PL");
        if let NodeKind::Playlist { entries } = &mut playlist.kind {
            entries.push(PlaylistEntry::Resolved(Fingerprint("t1".to_string())));
        }
        let playlist_id = collection.push_node(playlist);
        collection.roots.push(playlist_id);

        let plan = crate::plan::build(&collection, &collection.roots.clone());
        (collection, plan)
    }

    #[test]
    fn every_page_is_exactly_page_len() {
        let (collection, plan) = minimal_collection();
        let bytes = assemble(&plan, &collection, Path::new("/Contents"), Tier::TierB);
        assert_eq!(bytes.len() % PAGE_LEN as usize, 0);
    }

    #[test]
    fn file_header_reports_consistent_next_unused_page() {
        let (collection, plan) = minimal_collection();
        let bytes = assemble(&plan, &collection, Path::new("/Contents"), Tier::TierB);
        let total_pages = u32::try_from(bytes.len() / PAGE_LEN as usize).unwrap();
        let next_unused = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
        assert_eq!(next_unused, total_pages);
    }

    #[test]
    fn track_row_references_existing_artist_row() {
        let mut collection = Collection::new();
        let mut track = sample_track("t1");
        track.artist = "Some Artist".to_string();
        collection.insert_track(track);
        let mut playlist = Node::new_playlist("PL");
        if let NodeKind::Playlist { entries } = &mut playlist.kind {
            entries.push(PlaylistEntry::Resolved(Fingerprint("t1".to_string())));
        }
        let playlist_id = collection.push_node(playlist);
        collection.roots.push(playlist_id);
        let plan = crate::plan::build(&collection, &collection.roots.clone());

        assert_eq!(plan.tracks[0].artist_id, 1);
        assert_eq!(plan.artists.rows().next(), Some((1, "Some Artist")));
    }

    #[test]
    fn oversized_collection_is_rejected() {
        let mut plan = ExportPlan::default();
        for i in 0..20_001u32 {
            plan.tracks.push(PlanTrack {
                id: i + 1,
                fingerprint: Fingerprint(format!("t{i}")),
                artist_id: 0,
                album_id: 0,
                genre_id: 0,
                label_id: 0,
                key_id: 0,
                colour_id: 0,
            });
        }
        let collection = Collection::new();
        let result = write_database(&plan, &collection, Path::new("/Contents"), Tier::TierA, Path::new("/tmp/export.pdb"));
        assert!(matches!(result, Err(ErrorType::CollectionTooLarge(20_001))));
    }

    #[test]
    fn track_id_equals_playlist_entry_track_id() {
        let (collection, plan) = minimal_collection();
        let entry_rows = build_entry_rows(&plan);
        assert_eq!(entry_rows.len(), 1);
        let track_id = u32::from_le_bytes(entry_rows[0].fixed[4..8].try_into().unwrap());
        assert_eq!(track_id, plan.tracks[0].id);
        let _ = collection;
    }
}
