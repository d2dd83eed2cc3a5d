// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Musical key translation (C2).
//!
//! The canonical form is the 24-value key index used by the source vendor.
//! Everything else — Open-Key/Camelot tokens, classical notation, the
//! target vendor's key row id, and harmonic-neighbour relationships — is
//! derived from a static table indexed by that value.

use crate::error::ErrorType;
use std::sync::OnceLock;

/// A single entry of the key table: (open-key, classical, flat-classical, vendor key id).
type KeyEntry = (&'static str, &'static str, &'static str, u32);

/// Static key table, indexed by the 24-value key index.
///
/// Index 0..11 are major keys (`B` suffix on the Open-Key wheel), 12..23 are the
/// relative minors (`A` suffix), ordered around the circle of fifths so that
/// `index` and `index + 12` are relative major/minor pairs.
const KEY_TABLE: [KeyEntry; 24] = [
    ("1B", "C", "C", 1),
    ("8B", "G", "G", 2),
    ("3B", "D", "D", 3),
    ("10B", "A", "A", 4),
    ("5B", "E", "E", 5),
    ("12B", "B", "Cb", 6),
    ("7B", "F#", "Gb", 7),
    ("2B", "C#", "Db", 8),
    ("9B", "G#", "Ab", 9),
    ("4B", "D#", "Eb", 10),
    ("11B", "A#", "Bb", 11),
    ("6B", "F", "F", 12),
    ("10A", "Am", "Am", 13),
    ("5A", "Em", "Em", 14),
    ("12A", "Bm", "Bm", 15),
    ("7A", "F#m", "Gbm", 16),
    ("2A", "C#m", "Dbm", 17),
    ("9A", "G#m", "Abm", 18),
    ("4A", "D#m", "Ebm", 19),
    ("11A", "A#m", "Bbm", 20),
    ("6A", "Fm", "Fm", 21),
    ("1A", "Cm", "Cm", 22),
    ("8A", "Gm", "Gm", 23),
    ("3A", "Dm", "Dm", 24),
];

/// Target key-notation format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// Camelot / Open-Key wheel notation, e.g. `8A`.
    OpenKey,
    /// Classical notation using sharps, e.g. `F#m`.
    Classical,
    /// Classical notation using flats, e.g. `Gbm`.
    FlatClassical,
    /// The target vendor's internal key row id.
    VendorId,
}

/// Direction for [`progression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Step up the circle of fifths (numeric value increases).
    Up,
    /// Step down the circle of fifths (numeric value decreases).
    Down,
    /// Step to the harmonically-compatible relative key (flip major/minor).
    Harmonic,
}

/// The set of harmonically related Open-Key tokens for a given key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarmonicNeighbours {
    /// The key itself (`perfect_matches` includes its own relative).
    pub perfect_matches: Vec<String>,
    /// One step up the wheel (same letter, +1 energy).
    pub energy_up: String,
    /// One step down the wheel (same letter, -1 energy).
    pub energy_down: String,
    /// Keys two steps away, compatible for a dominant-style transition.
    pub dominant_matches: Vec<String>,
    /// Harmonic matches: the relative key plus both energy neighbours.
    pub harmonic_matches: Vec<String>,
    /// The relative major/minor (A<->B flip, same numeral).
    pub relative_key: String,
}

/// Parse an Open-Key token like `8A` into (numeral 1..12, letter).
fn parse_open_key(token: &str) -> Option<(u32, char)> {
    let letter = token.chars().last()?;
    if letter != 'A' && letter != 'B' {
        return None;
    }
    let digits = &token[..token.len() - 1];
    let numeral: u32 = digits.parse().ok()?;
    if !(1..=12).contains(&numeral) {
        return None;
    }
    Some((numeral, letter))
}

/// Format (numeral, letter) back into an Open-Key token, wrapping the numeral into 1..12.
fn format_open_key(numeral: i64, letter: char) -> String {
    let wrapped = ((numeral - 1).rem_euclid(12)) + 1;
    format!("{wrapped}{letter}")
}

/// Translate a key index (0..23) into the requested format.
///
/// An empty/absent key yields an empty string in every format, never an error.
///
/// # Errors
///
/// Returns [`ErrorType::InvalidKeyIndex`] if `index` is outside `0..24`.
pub fn to(index: i32, format: KeyFormat) -> crate::Result<String> {
    let idx = usize::try_from(index).map_err(|_| ErrorType::InvalidKeyIndex(index))?;
    let entry = KEY_TABLE
        .get(idx)
        .ok_or(ErrorType::InvalidKeyIndex(index))?;
    Ok(match format {
        KeyFormat::OpenKey => entry.0.to_string(),
        KeyFormat::Classical => entry.1.to_string(),
        KeyFormat::FlatClassical => entry.2.to_string(),
        KeyFormat::VendorId => entry.3.to_string(),
    })
}

/// Cache of index lookups, keyed by `(index, discriminant)`. Small and
/// read-heavy once warmed, so a single process-wide cache is safe to share.
static CACHE: OnceLock<std::sync::Mutex<std::collections::HashMap<(i32, u8), String>>> =
    OnceLock::new();

/// Discriminant used for cache keys; avoids requiring `Hash` on `KeyFormat`.
fn format_discriminant(format: KeyFormat) -> u8 {
    match format {
        KeyFormat::OpenKey => 0,
        KeyFormat::Classical => 1,
        KeyFormat::FlatClassical => 2,
        KeyFormat::VendorId => 3,
    }
}

/// Cached version of [`to`]; results are memoised per `(index, format)` pair.
///
/// # Errors
///
/// Same as [`to`].
pub fn to_cached(index: i32, format: KeyFormat) -> crate::Result<String> {
    let cache = CACHE.get_or_init(|| std::sync::Mutex::new(std::collections::HashMap::new()));
    let cache_key = (index, format_discriminant(format));
    if let Some(hit) = cache.lock().expect("key cache poisoned").get(&cache_key) {
        return Ok(hit.clone());
    }
    let value = to(index, format)?;
    cache
        .lock()
        .expect("key cache poisoned")
        .insert(cache_key, value.clone());
    Ok(value)
}

/// Compute harmonic neighbours for an Open-Key token.
///
/// Returns `None` if `open_key_token` does not parse as a valid Open-Key token.
#[must_use]
pub fn harmonic_neighbours(open_key_token: &str) -> Option<HarmonicNeighbours> {
    let (numeral, letter) = parse_open_key(open_key_token)?;
    let numeral = i64::from(numeral);
    let relative_letter = if letter == 'A' { 'B' } else { 'A' };

    let energy_up = format_open_key(numeral + 1, letter);
    let energy_down = format_open_key(numeral - 1, letter);
    let relative_key = format_open_key(numeral, relative_letter);
    let dominant_matches = vec![
        format_open_key(numeral + 2, letter),
        format_open_key(numeral - 2, letter),
    ];
    let harmonic_matches = vec![relative_key.clone(), energy_up.clone(), energy_down.clone()];
    let perfect_matches = vec![open_key_token.to_string(), relative_key.clone()];

    Some(HarmonicNeighbours {
        perfect_matches,
        energy_up,
        energy_down,
        dominant_matches,
        harmonic_matches,
        relative_key,
    })
}

/// Walk the wheel one step in `direction` from `open_key_token`, returning the
/// ordered list of keys visited (length 1, the starting key included first).
///
/// Returns `None` if `open_key_token` does not parse.
#[must_use]
pub fn progression(open_key_token: &str, direction: Direction) -> Option<Vec<String>> {
    let neighbours = harmonic_neighbours(open_key_token)?;
    Some(match direction {
        Direction::Up => vec![open_key_token.to_string(), neighbours.energy_up],
        Direction::Down => vec![open_key_token.to_string(), neighbours.energy_down],
        Direction::Harmonic => vec![open_key_token.to_string(), neighbours.relative_key],
    })
}

/// The 12 wheel colours (major-key numerals 1..12), arbitrary but stable RGB
/// triples used for key-colour-coded UI hints.
const WHEEL_COLOURS: [(u8, u8, u8); 12] = [
    (255, 0, 0),
    (255, 128, 0),
    (255, 213, 0),
    (170, 255, 0),
    (85, 255, 0),
    (0, 255, 85),
    (0, 255, 213),
    (0, 170, 255),
    (0, 85, 255),
    (85, 0, 255),
    (170, 0, 255),
    (255, 0, 170),
];

/// Return the wheel colour (RGB) associated with an Open-Key token's numeral.
///
/// Returns `None` if `open_key_token` does not parse.
#[must_use]
pub fn wheel_colour(open_key_token: &str) -> Option<(u8, u8, u8)> {
    let (numeral, _letter) = parse_open_key(open_key_token)?;
    WHEEL_COLOURS.get((numeral - 1) as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_all_indices() {
        for idx in 0..24 {
            let open_key = to(idx, KeyFormat::OpenKey).unwrap();
            let (numeral, letter) = parse_open_key(&open_key).unwrap();
            let reconstructed = format_open_key(i64::from(numeral), letter);
            assert_eq!(reconstructed, open_key);
        }
    }

    #[test]
    fn relative_key_is_symmetric() {
        let a = to(0, KeyFormat::OpenKey).unwrap(); // "1B"
        let neighbours_a = harmonic_neighbours(&a).unwrap();
        let b = neighbours_a.relative_key;
        let neighbours_b = harmonic_neighbours(&b).unwrap();
        assert_eq!(neighbours_b.relative_key, a);
    }

    #[test]
    fn dominant_is_plus_or_minus_two() {
        let neighbours = harmonic_neighbours("1A").unwrap();
        assert!(neighbours.dominant_matches.contains(&"3A".to_string()));
        assert!(neighbours.dominant_matches.contains(&"11A".to_string()));
    }

    #[test]
    fn wraps_around_wheel() {
        let neighbours = harmonic_neighbours("12A").unwrap();
        assert_eq!(neighbours.energy_up, "1A");
    }

    #[test]
    fn empty_string_in_yields_empty_out() {
        assert_eq!(harmonic_neighbours(""), None);
    }

    #[test]
    fn out_of_range_index_errors() {
        assert!(matches!(
            to(24, KeyFormat::OpenKey),
            Err(ErrorType::InvalidKeyIndex(24))
        ));
        assert!(matches!(
            to(-1, KeyFormat::OpenKey),
            Err(ErrorType::InvalidKeyIndex(-1))
        ));
    }

    #[test]
    fn cache_returns_same_value() {
        let first = to_cached(5, KeyFormat::Classical).unwrap();
        let second = to_cached(5, KeyFormat::Classical).unwrap();
        assert_eq!(first, second);
    }
}
