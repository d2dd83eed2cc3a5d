// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Path and filename sanitisation for the target filesystem (C1).
//!
//! Reduces an arbitrary Unicode basename to something safe for FAT32 and the
//! hardware's ASCII-only constraint: non-ASCII transliterated, reserved
//! characters replaced, DOS reserved names avoided, length-bounded.

use crate::error::ErrorType;
use unidecode::unidecode;

/// DOS device names that must not be used as a bare basename (without extension).
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Maximum length in bytes of a sanitised basename.
const MAX_BASENAME_BYTES: usize = 200;

/// Maximum length in bytes of a full sanitised path.
const MAX_PATH_BYTES: usize = 256;

/// Characters that are not permitted in a FAT32 basename.
fn is_forbidden(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
        || (c as u32) <= 0x1F
        || (c as u32) == 0x7F
}

/// Collapse consecutive runs of `_` into a single `_`.
fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push(c);
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    out
}

/// Split `name` into (stem, extension-with-dot), where the extension is the text
/// from the last `.` onward, provided that dot is not the first character.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

/// Truncate `stem` to at most `max_bytes`, respecting UTF-8 char boundaries.
fn truncate_to_bytes(stem: &str, max_bytes: usize) -> &str {
    if stem.len() <= max_bytes {
        return stem;
    }
    let mut end = max_bytes;
    while end > 0 && !stem.is_char_boundary(end) {
        end -= 1;
    }
    &stem[..end]
}

/// Sanitise a single basename (file or directory name) for the target filesystem.
///
/// # Errors
///
/// Returns [`ErrorType::PathUnrepresentable`] if, after truncation, the basename's
/// stem is empty.
pub fn sanitize_basename(name: &str) -> crate::Result<String> {
    let transliterated = unidecode(name);
    let (stem, ext) = split_extension(&transliterated);

    let replaced: String = stem
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let collapsed = collapse_underscores(&replaced);
    let collapsed = collapsed.trim_matches('_');

    if collapsed.is_empty() {
        return Err(ErrorType::PathUnrepresentable(name.to_string()));
    }

    let reserved_suffixed = if RESERVED_NAMES.contains(&collapsed.to_ascii_uppercase().as_str()) {
        format!("{collapsed}_")
    } else {
        collapsed.to_string()
    };

    let budget = MAX_BASENAME_BYTES.saturating_sub(ext.len());
    let truncated = truncate_to_bytes(&reserved_suffixed, budget.max(1));

    if truncated.is_empty() {
        return Err(ErrorType::PathUnrepresentable(name.to_string()));
    }

    Ok(format!("{truncated}{ext}"))
}

/// Sanitise a basename and shorten it further, if needed, so that joining it to
/// `parent_len` additional bytes (the directory prefix) stays within the
/// hardware's 256-byte full-path budget.
///
/// # Errors
///
/// Returns [`ErrorType::PathUnrepresentable`] if no non-empty basename fits.
pub fn sanitize_basename_for_path(name: &str, parent_len: usize) -> crate::Result<String> {
    let sanitised = sanitize_basename(name)?;
    let available = MAX_PATH_BYTES.saturating_sub(parent_len);
    if sanitised.len() <= available {
        return Ok(sanitised);
    }

    let (stem, ext) = split_extension(&sanitised);
    let budget = available.saturating_sub(ext.len());
    let shortened = truncate_to_bytes(stem, budget);
    if shortened.is_empty() {
        return Err(ErrorType::PathUnrepresentable(name.to_string()));
    }
    Ok(format!("{shortened}{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_forbidden_characters() {
        assert_eq!(sanitize_basename("a:b/c*d.mp3").unwrap(), "a_b_c_d.mp3");
    }

    #[test]
    fn collapses_underscore_runs() {
        assert_eq!(sanitize_basename("a___b.mp3").unwrap(), "a_b.mp3");
    }

    #[test]
    fn transliterates_non_ascii() {
        assert_eq!(sanitize_basename("Café.mp3").unwrap(), "Cafe.mp3");
    }

    #[test]
    fn avoids_reserved_names() {
        assert_eq!(sanitize_basename("CON.mp3").unwrap(), "CON_.mp3");
        assert_eq!(sanitize_basename("con.mp3").unwrap(), "con_.mp3");
    }

    #[test]
    fn truncates_long_basenames_preserving_extension() {
        let long_name = format!("{}.mp3", "a".repeat(400));
        let result = sanitize_basename(&long_name).unwrap();
        assert!(result.len() <= MAX_BASENAME_BYTES + 4);
        assert!(result.ends_with(".mp3"));
    }

    #[test]
    fn empty_after_sanitisation_fails() {
        assert!(matches!(
            sanitize_basename("???.mp3"),
            Err(ErrorType::PathUnrepresentable(_))
        ));
    }

    #[test]
    fn full_path_budget_shortens_basename_further() {
        let parent_len = 240;
        let long_name = format!("{}.mp3", "b".repeat(100));
        let result = sanitize_basename_for_path(&long_name, parent_len).unwrap();
        assert!(result.len() <= 16);
        assert!(result.ends_with(".mp3"));
    }
}
