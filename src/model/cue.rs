// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Cue points (§3).

/// The kind of a cue point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    /// A plain point cue.
    Cue,
    /// Marks a fade-in.
    FadeIn,
    /// Marks a fade-out.
    FadeOut,
    /// A navigation-only cue (hot-cue slot is always -1 for these).
    Memory,
    /// Marks the beat-grid anchor.
    GridAnchor,
    /// A loop, carrying a non-zero length.
    Loop,
}

/// A single cue point on a track.
#[derive(Debug, Clone, PartialEq)]
pub struct CuePoint {
    /// User-assigned name, may be empty.
    pub name: String,
    /// What kind of cue this is.
    pub kind: CueKind,
    /// Position in the track where the cue starts, in milliseconds.
    pub start_ms: u32,
    /// Length in milliseconds; 0 for point cues, non-zero for loops.
    pub length_ms: u32,
    /// Hot-cue slot: -1 for memory cues, 0..7 for hot-cue pads.
    pub hot_cue_slot: i8,
    /// Order in which the cue appeared in the source document.
    pub display_order: u32,
    /// Optional 24-bit RGB colour.
    pub color: Option<(u8, u8, u8)>,
}

impl CuePoint {
    /// Whether this cue is a loop (non-zero length).
    #[must_use]
    pub fn is_loop(&self) -> bool {
        self.length_ms > 0
    }

    /// Whether this cue occupies a hot-cue pad (as opposed to being a memory cue).
    #[must_use]
    pub fn is_hot_cue(&self) -> bool {
        self.hot_cue_slot >= 0
    }
}
