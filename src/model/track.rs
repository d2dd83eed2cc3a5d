// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Tracks (§3).

use super::cue::CuePoint;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// A stable opaque identity for a track within one collection load.
///
/// Derived from the source XML's own primary key when available, otherwise a
/// hash of the canonicalised absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    /// Derive a fingerprint from an absolute file path, for sources that carry
    /// no dedicated primary key.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let normalised = path.to_string_lossy().to_lowercase().replace('\\', "/");
        let mut hasher = Sha256::new();
        hasher.update(normalised.as_bytes());
        Fingerprint(format!("{:x}", hasher.finalize()))
    }
}

/// A single track in the collection.
#[derive(Debug, Clone)]
pub struct Track {
    /// Stable identity, unique within a collection load.
    pub fingerprint: Fingerprint,
    /// Track title.
    pub title: String,
    /// Primary artist.
    pub artist: String,
    /// Album title.
    pub album: String,
    /// Genre.
    pub genre: String,
    /// Record label.
    pub label: String,
    /// Free-text comment.
    pub comment: String,
    /// Remixer, if any.
    pub remixer: String,
    /// Absolute path to the audio file.
    pub file_path: PathBuf,
    /// File size in bytes.
    pub file_size: u64,
    /// Sample rate in Hz; 0 if unknown.
    pub sample_rate: u32,
    /// Bitrate in kbps.
    pub bitrate: u32,
    /// Sample depth in bits.
    pub sample_depth: u16,
    /// Duration in whole seconds.
    pub duration_secs: u32,
    /// Duration with sub-second precision, when available.
    pub duration_secs_float: f64,
    /// Beats per minute.
    pub bpm: f64,
    /// Key index 0..23, or `None` if absent.
    pub key_index: Option<u8>,
    /// Rating 0..5.
    pub rating: u8,
    /// Number of times played.
    pub play_count: u32,
    /// Date the track was added to the collection.
    pub date_added: Option<NaiveDate>,
    /// Date the track's metadata was last modified.
    pub date_modified: Option<NaiveDate>,
    /// Date the track was last played.
    pub last_played: Option<NaiveDate>,
    /// Colour-tag index 0..7.
    pub color_index: Option<u8>,
    /// Ordered cue points, in source order.
    pub cues: Vec<CuePoint>,
    /// Optional beat-grid anchor position in milliseconds.
    pub grid_anchor_ms: Option<u32>,
}

/// Sample rates recognised by the hardware; 0 means "unknown".
pub const RECOGNISED_SAMPLE_RATES: [u32; 5] = [22_050, 44_100, 48_000, 88_200, 96_000];

impl Track {
    /// Whether `sample_rate` is one of the hardware-recognised values or 0 (unknown).
    #[must_use]
    pub fn has_valid_sample_rate(&self) -> bool {
        self.sample_rate == 0 || RECOGNISED_SAMPLE_RATES.contains(&self.sample_rate)
    }

    /// BPM scaled by 100 and rounded, as stored in the binary database.
    #[must_use]
    pub fn bpm_centi(&self) -> u32 {
        (self.bpm * 100.0).round().max(0.0) as u32
    }
}
