// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Analysis-file writer (C5).
//!
//! Emits the tagged, big-endian `ANLZ` container files that sit alongside the
//! binary database: `.DAT` always, `.EXT` and `.2EX` for tiers that ask for
//! them. Every multibyte integer in this module is big-endian — the inverse
//! of [`crate::pdb`], which is little-endian throughout (§4.5/§4.6, Design
//! Notes "Endianness discipline").

use crate::config::Tier;
use crate::error::ErrorType;
use crate::model::{CueKind, CuePoint, Track};
use md5::{Digest, Md5};
use std::fs;
use std::path::{Path, PathBuf};

/// Length of the container header: magic (4) + header length (4) + file
/// length (4) + 16 reserved bytes.
const CONTAINER_HEADER_LEN: u32 = 28;

/// Length of a section header: tag (4) + header length (4) + total length (4).
/// Every section in this engine carries no extra header fields beyond the
/// three common ones, so this constant is shared by all of them.
const SECTION_HEADER_LEN: u32 = 12;

/// Beat grid entries are capped at this count regardless of track duration.
const MAX_BEATGRID_ENTRIES: usize = 1500;

/// Fixed payload size of the `PWAV` preview waveform, in bytes.
const WAVEFORM_PREVIEW_LEN: usize = 400;

/// Write the analysis files for `track` under `export_root`, returning the
/// directory they were written to.
///
/// # Errors
///
/// Returns [`ErrorType::WriteFailed`] if any file cannot be written.
pub fn write_analysis_files(track: &Track, export_root: &Path, tier: Tier) -> crate::Result<PathBuf> {
    let (p3, hash8) = directory_for(&track.file_path);
    let dir = export_root
        .join("PIONEER")
        .join("USBANLZ")
        .join(p3)
        .join(hash8);
    fs::create_dir_all(&dir).map_err(|e| ErrorType::WriteFailed(e.to_string()))?;

    let dat = build_dat(track, tier);
    write_file(&dir.join("ANLZ0000.DAT"), &dat)?;

    if matches!(tier, Tier::TierB | Tier::TierC) {
        let ext = build_ext(track);
        write_file(&dir.join("ANLZ0000.EXT"), &ext)?;
    }

    if tier == Tier::TierC {
        let two_ex = build_two_ex(track);
        write_file(&dir.join("ANLZ0000.2EX"), &two_ex)?;
    }

    Ok(dir)
}

fn write_file(path: &Path, bytes: &[u8]) -> crate::Result<()> {
    fs::write(path, bytes).map_err(|e| ErrorType::WriteFailed(format!("{}: {e}", path.display())))
}

/// Compute the `P<3hex>/<8hex>` directory pair for an audio path (§4.5).
///
/// The hash is MD5 of the lowercase, forward-slash-normalised path, with the
/// first four digest bytes read as a little-endian `u32` and formatted as
/// eight uppercase hex digits. Treated as contract, not merely "a stable
/// hash" (Design Notes, Open Question 4): any other algorithm would place
/// files in directories real hardware does not expect.
#[must_use]
pub fn directory_for(audio_path: &Path) -> (String, String) {
    let normalised = audio_path.to_string_lossy().to_lowercase().replace('\\', "/");
    let mut hasher = Md5::new();
    hasher.update(normalised.as_bytes());
    let digest = hasher.finalize();
    let hash = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    let hash_hex = format!("{hash:08X}");
    let p3 = format!("P{}", &hash_hex[..3]);
    (p3, hash_hex)
}

fn build_dat(track: &Track, tier: Tier) -> Vec<u8> {
    let mut sections = Vec::new();

    emit_section(&mut sections, b"PPTH", &build_path_payload(track));
    emit_section(&mut sections, b"PWAV", &build_waveform_preview_payload(track));

    if let Some(grid) = build_beatgrid_payload(track) {
        emit_section(&mut sections, b"PQTZ", &grid);
    }

    // Hardware only exposes as many pads as the tier's hot-cue capacity (§2 C7
    // tier matrix); cues assigned to a slot beyond that capacity are dropped.
    let capacity = crate::pdb::hot_cue_capacity(tier);
    let memory_cues: Vec<&CuePoint> = track.cues.iter().filter(|c| !c.is_hot_cue()).collect();
    let hot_cues: Vec<&CuePoint> = track
        .cues
        .iter()
        .filter(|c| c.is_hot_cue() && usize::try_from(c.hot_cue_slot).is_ok_and(|slot| slot < capacity))
        .collect();
    // PCPT is replaced by PCP2 (UTF-16BE comment + RGB colour) on the tiers
    // that request colour waveforms (§4.5 "extended format").
    let extended = matches!(tier, Tier::TierB | Tier::TierC);
    if !memory_cues.is_empty() {
        emit_section(&mut sections, b"PCOB", &build_cue_list_payload(0, &memory_cues, extended));
    }
    if !hot_cues.is_empty() {
        emit_section(&mut sections, b"PCOB", &build_cue_list_payload(1, &hot_cues, extended));
    }

    build_container(&sections)
}

fn build_ext(track: &Track) -> Vec<u8> {
    let mut sections = Vec::new();
    emit_section(&mut sections, b"PWV4", &build_colour_waveform_payload(track));
    build_container(&sections)
}

fn build_two_ex(_track: &Track) -> Vec<u8> {
    let mut sections = Vec::new();
    // No phrase-structure detection is performed (audio content is never
    // interpreted); the section is still emitted, with zero phrases, so a
    // tier-c reader that expects PSSI to exist does not choke on its absence.
    emit_section(&mut sections, b"PSSI", &0u32.to_be_bytes());
    build_container(&sections)
}

/// Wrap `sections` (each already including its own section header) in the
/// `PMAI` container header, back-patching the file-length field once the
/// total size is known (§4.5 "Assembly").
fn build_container(sections: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"PMAI");
    buf.extend_from_slice(&CONTAINER_HEADER_LEN.to_be_bytes());
    let file_len_offset = buf.len();
    buf.extend_from_slice(&[0u8; 4]);
    buf.extend_from_slice(&[0u8; 16]);
    for section in sections {
        buf.extend_from_slice(section);
    }
    let file_len = u32::try_from(buf.len()).unwrap_or(u32::MAX);
    buf[file_len_offset..file_len_offset + 4].copy_from_slice(&file_len.to_be_bytes());
    buf
}

/// Write a tag + common section header + payload (Design Notes "tagged
/// section variants"): the one place the four-byte tag and two length fields
/// are assembled, shared by every section kind.
fn emit_section(out: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
    out.extend_from_slice(tag);
    out.extend_from_slice(&SECTION_HEADER_LEN.to_be_bytes());
    let total = SECTION_HEADER_LEN + u32::try_from(payload.len()).unwrap_or(u32::MAX);
    out.extend_from_slice(&total.to_be_bytes());
    out.extend_from_slice(payload);
}

fn build_path_payload(track: &Track) -> Vec<u8> {
    let filename = track
        .file_path
        .file_name()
        .map_or_else(|| track.file_path.to_string_lossy(), |name| name.to_string_lossy());
    utf16be_field(&filename)
}

/// A `u32` byte-length prefix followed by UTF-16BE text and a trailing NUL,
/// the shape shared by `PPTH`'s path and `PCP2`'s comment.
fn utf16be_field(text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut out = Vec::with_capacity(4 + units.len() * 2 + 2);
    let len = (u32::try_from(units.len()).unwrap_or(u32::MAX) + 1) * 2;
    out.extend_from_slice(&len.to_be_bytes());
    for unit in units {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out.extend_from_slice(&[0, 0]);
    out
}

/// Build the `PQTZ` beat grid payload, or `None` if the track is too short to
/// contain a single beat (§4.5 failure mode: `TrackTooShortForGrid`, caller
/// skips the section but still produces the container).
fn build_beatgrid_payload(track: &Track) -> Option<Vec<u8>> {
    if track.bpm <= 0.0 || track.duration_secs == 0 {
        return None;
    }
    let step_ms = 60_000.0 / track.bpm;
    let duration_ms = f64::from(track.duration_secs) * 1000.0;
    let anchor_ms = f64::from(track.grid_anchor_ms.unwrap_or(0));
    let tempo = u16::try_from(track.bpm_centi().min(u32::from(u16::MAX))).unwrap_or(u16::MAX);

    let mut entries = Vec::new();
    let mut position = anchor_ms;
    let mut beat_number = 1u16;
    while position <= duration_ms && entries.len() < MAX_BEATGRID_ENTRIES {
        entries.push((beat_number, tempo, position.round() as u32));
        position += step_ms;
        beat_number = if beat_number == 4 { 1 } else { beat_number + 1 };
    }
    if entries.is_empty() {
        return None;
    }

    let mut payload = Vec::new();
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.extend_from_slice(&0x0080_0000u32.to_be_bytes());
    payload.extend_from_slice(&(u32::try_from(entries.len()).unwrap_or(u32::MAX)).to_be_bytes());
    for (number, tempo, time) in entries {
        payload.extend_from_slice(&number.to_be_bytes());
        payload.extend_from_slice(&tempo.to_be_bytes());
        payload.extend_from_slice(&time.to_be_bytes());
    }
    Some(payload)
}

/// Build the `PCOB` cue-list payload for one `kind` (0 = memory, 1 = hot).
fn build_cue_list_payload(kind: u32, cues: &[&CuePoint], extended: bool) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&kind.to_be_bytes());
    payload.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    payload.extend_from_slice(&(u16::try_from(cues.len()).unwrap_or(u16::MAX)).to_be_bytes());
    for cue in cues {
        if extended {
            payload.extend_from_slice(&build_pcp2(cue));
        } else {
            payload.extend_from_slice(&build_pcpt(cue));
        }
    }
    payload
}

/// The 26 bytes of cue fields shared by `PCPT` and `PCP2`, before `PCP2`'s
/// comment/colour extension.
fn cue_base_fields(cue: &CuePoint) -> Vec<u8> {
    let mut fields = Vec::with_capacity(26);
    let hot_cue: u32 = if cue.hot_cue_slot >= 0 {
        u32::from(u8::try_from(cue.hot_cue_slot).unwrap_or(0)) + 1
    } else {
        0
    };
    // §9 Open Question 2: status = 4 only for loops, never for a plain hot cue.
    let status: u32 = if cue.kind == CueKind::Loop { 4 } else { 0 };
    fields.extend_from_slice(&hot_cue.to_be_bytes());
    fields.extend_from_slice(&status.to_be_bytes());
    fields.extend_from_slice(&0x0010_0000u32.to_be_bytes());
    let order = u16::try_from(cue.display_order).unwrap_or(u16::MAX);
    fields.extend_from_slice(&order.to_be_bytes());
    fields.extend_from_slice(&order.saturating_add(1).to_be_bytes());
    fields.push(if cue.is_loop() { 2 } else { 1 });
    fields.push(0);
    fields.extend_from_slice(&cue.start_ms.to_be_bytes());
    let loop_end = if cue.is_loop() {
        cue.start_ms + cue.length_ms
    } else {
        0xFFFF_FFFF
    };
    fields.extend_from_slice(&loop_end.to_be_bytes());
    fields
}

/// A fixed 38-byte `PCPT` cue record (12-byte header + 26 fields).
fn build_pcpt(cue: &CuePoint) -> Vec<u8> {
    let fields = cue_base_fields(cue);
    let mut record = Vec::with_capacity(38);
    record.extend_from_slice(b"PCPT");
    record.extend_from_slice(&SECTION_HEADER_LEN.to_be_bytes());
    let total = SECTION_HEADER_LEN + u32::try_from(fields.len()).unwrap_or(u32::MAX);
    record.extend_from_slice(&total.to_be_bytes());
    record.extend_from_slice(&fields);
    record
}

/// `PCP2`: `PCPT`'s fields plus a UTF-16BE comment and a 4-byte colour.
fn build_pcp2(cue: &CuePoint) -> Vec<u8> {
    let mut fields = cue_base_fields(cue);
    fields.extend_from_slice(&utf16be_field(&cue.name));
    let (r, g, b) = cue.color.unwrap_or((0, 0, 0));
    fields.extend_from_slice(&[0, r, g, b]);

    let mut record = Vec::new();
    record.extend_from_slice(b"PCP2");
    record.extend_from_slice(&SECTION_HEADER_LEN.to_be_bytes());
    let total = SECTION_HEADER_LEN + u32::try_from(fields.len()).unwrap_or(u32::MAX);
    record.extend_from_slice(&total.to_be_bytes());
    record.extend_from_slice(&fields);
    record
}

/// Synthesize a deterministic placeholder waveform preview.
///
/// Real amplitude/colour data requires decoding the audio signal, which is
/// out of scope (Non-goal 1: BPM/key come from metadata, audio is never
/// interpreted). The byte pattern is a function of position only, so the
/// output is at least stable across runs for the same track.
fn build_waveform_preview_payload(_track: &Track) -> Vec<u8> {
    let mut payload = Vec::with_capacity(8 + WAVEFORM_PREVIEW_LEN);
    payload.extend_from_slice(&(u32::try_from(WAVEFORM_PREVIEW_LEN).unwrap()).to_be_bytes());
    payload.extend_from_slice(&0x0010_0000u32.to_be_bytes());
    for i in 0..WAVEFORM_PREVIEW_LEN {
        let amplitude = u8::try_from(i % 32).unwrap_or(0) & 0b0001_1111;
        payload.push(amplitude);
    }
    payload
}

fn build_colour_waveform_payload(_track: &Track) -> Vec<u8> {
    let mut payload = Vec::with_capacity(8 + WAVEFORM_PREVIEW_LEN);
    payload.extend_from_slice(&(u32::try_from(WAVEFORM_PREVIEW_LEN).unwrap()).to_be_bytes());
    payload.extend_from_slice(&0x0010_0000u32.to_be_bytes());
    for i in 0..WAVEFORM_PREVIEW_LEN {
        payload.push(u8::try_from(i % 256).unwrap_or(0));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CueKind, Fingerprint};
    use std::path::PathBuf;

    fn sample_track() -> Track {
        Track {
            fingerprint: Fingerprint("t1".to_string()),
            title: "A".to_string(),
            artist: "B".to_string(),
            album: "C".to_string(),
            genre: String::new(),
            label: String::new(),
            comment: String::new(),
            remixer: String::new(),
            file_path: PathBuf::from("/Music/Track.mp3"),
            file_size: 0,
            sample_rate: 0,
            bitrate: 0,
            sample_depth: 0,
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
            grid_anchor_ms: Some(100),
        }
    }

    #[test]
    fn directory_hash_matches_scenario() {
        let (p3, hash8) = directory_for(Path::new("/Music/Track.mp3"));
        assert_eq!(p3.len(), 4);
        assert_eq!(hash8.len(), 8);
        // Same path, two computations: deterministic (§8 property 9).
        let (p3b, hash8b) = directory_for(Path::new("/Music/Track.mp3"));
        assert_eq!((p3, hash8), (p3b, hash8b));
    }

    #[test]
    fn beatgrid_entry_count_and_values_match_scenario() {
        let track = sample_track();
        let payload = build_beatgrid_payload(&track).unwrap();
        // 8 bytes of reserved header fields, then 4-byte count, then 8 bytes/entry.
        let count = u32::from_be_bytes(payload[8..12].try_into().unwrap());
        assert_eq!(count, 20);
        let entry = |i: usize| -> (u16, u16, u32) {
            let base = 12 + i * 8;
            (
                u16::from_be_bytes(payload[base..base + 2].try_into().unwrap()),
                u16::from_be_bytes(payload[base + 2..base + 4].try_into().unwrap()),
                u32::from_be_bytes(payload[base + 4..base + 8].try_into().unwrap()),
            )
        };
        assert_eq!(entry(0), (1, 12000, 100));
        assert_eq!(entry(4), (1, 12000, 2100));
    }

    #[test]
    fn too_short_track_skips_beatgrid() {
        let mut track = sample_track();
        track.bpm = 0.0;
        assert!(build_beatgrid_payload(&track).is_none());
    }

    #[test]
    fn container_file_length_is_accurate() {
        let track = sample_track();
        let dat = build_dat(&track, Tier::TierB);
        assert_eq!(&dat[0..4], b"PMAI");
        let declared_len = u32::from_be_bytes(dat[8..12].try_into().unwrap());
        assert_eq!(declared_len as usize, dat.len());
    }

    #[test]
    fn loop_cue_gets_status_four_but_plain_hot_cue_does_not() {
        let loop_cue = CuePoint {
            name: String::new(),
            kind: CueKind::Loop,
            start_ms: 1000,
            length_ms: 2000,
            hot_cue_slot: 0,
            display_order: 0,
            color: None,
        };
        let plain_hot_cue = CuePoint {
            kind: CueKind::Cue,
            length_ms: 0,
            ..loop_cue.clone()
        };
        let loop_record = build_pcpt(&loop_cue);
        let plain_record = build_pcpt(&plain_hot_cue);
        let status_of = |record: &[u8]| u32::from_be_bytes(record[12..16].try_into().unwrap());
        assert_eq!(status_of(&loop_record), 4);
        assert_eq!(status_of(&plain_record), 0);
    }

    fn hot_cue(slot: i8) -> CuePoint {
        let slot_u32 = u32::try_from(slot).unwrap_or(0);
        CuePoint {
            name: String::new(),
            kind: CueKind::Cue,
            start_ms: slot_u32 * 1000,
            length_ms: 0,
            hot_cue_slot: slot,
            display_order: slot_u32,
            color: Some((10, 20, 30)),
        }
    }

    /// Find the single `PCOB` section with the given `kind` word and return its
    /// u16 entry count (§4.5: kind 0 = memory, 1 = hot).
    fn pcob_entry_count(dat: &[u8], kind: u32) -> u16 {
        let mut offset = CONTAINER_HEADER_LEN as usize;
        while offset < dat.len() {
            let tag = &dat[offset..offset + 4];
            let total_len = u32::from_be_bytes(dat[offset + 8..offset + 12].try_into().unwrap()) as usize;
            if tag == b"PCOB" {
                let payload = &dat[offset + 12..offset + total_len];
                if u32::from_be_bytes(payload[0..4].try_into().unwrap()) == kind {
                    return u16::from_be_bytes(payload[8..10].try_into().unwrap());
                }
            }
            offset += total_len;
        }
        panic!("no PCOB section with kind {kind}");
    }

    #[test]
    fn tier_a_caps_hot_cues_at_three() {
        let mut track = sample_track();
        track.cues = (0..8).map(hot_cue).collect();
        let dat = build_dat(&track, Tier::TierA);
        assert_eq!(pcob_entry_count(&dat, 1), 3);
    }

    #[test]
    fn tier_b_keeps_all_eight_hot_cues_and_uses_pcp2() {
        let mut track = sample_track();
        track.cues = (0..8).map(hot_cue).collect();
        let dat = build_dat(&track, Tier::TierB);
        assert_eq!(pcob_entry_count(&dat, 1), 8);
        assert!(dat.windows(4).any(|w| w == b"PCP2"));
        assert!(!dat.windows(4).any(|w| w == b"PCPT"));
    }

    #[test]
    fn tier_a_uses_pcpt_not_pcp2() {
        let mut track = sample_track();
        track.cues = vec![hot_cue(0)];
        let dat = build_dat(&track, Tier::TierA);
        assert!(dat.windows(4).any(|w| w == b"PCPT"));
        assert!(!dat.windows(4).any(|w| w == b"PCP2"));
    }

    #[test]
    fn path_payload_uses_basename_not_full_path() {
        let track = sample_track();
        let payload = build_path_payload(&track);
        let len = u32::from_be_bytes(payload[0..4].try_into().unwrap());
        let unit_count = (len / 2 - 1) as usize;
        let units: Vec<u16> = (0..unit_count)
            .map(|i| u16::from_be_bytes(payload[4 + i * 2..6 + i * 2].try_into().unwrap()))
            .collect();
        let decoded = String::from_utf16(&units).unwrap();
        assert_eq!(decoded, "Track.mp3");
    }
}
