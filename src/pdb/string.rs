// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! DeviceSQL variable-length string encoding (§4.6).
//!
//! Three shapes, selected by the smallest one that fits — the writer never
//! emits the long-ASCII or UTF-16 form for text that the short form could
//! carry.
//!
//! The short form's length field is off by one from the naive reading of the
//! spec's encode table: on decode, "the real length of a short string is
//! `(prefix − 1) / 2 − 1`" (§4.6), which only round-trips if the prefix is
//! built from `length + 1`, not `length`. That caps the one-byte prefix's
//! reach at 126 bytes, not 127 — a length of exactly 127 already needs the
//! long-ASCII form. Preserved verbatim as the real format's own quirk rather
//! than "corrected" to the naive table reading.

/// Longest ASCII body that fits the one-byte short form (see module docs).
const MAX_SHORT_ASCII_LEN: usize = 126;

/// Encode `text` as a DeviceSQL string, choosing the minimal of the three
/// shapes (pure ASCII short form, pure ASCII long form, UTF-16BE form).
#[must_use]
pub fn encode(text: &str) -> Vec<u8> {
    if text.is_ascii() {
        if text.len() <= MAX_SHORT_ASCII_LEN {
            encode_short_ascii(text)
        } else {
            encode_long_ascii(text)
        }
    } else {
        encode_utf16(text)
    }
}

fn encode_short_ascii(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + text.len());
    let prefix = u8::try_from((text.len() + 1) * 2 + 1).unwrap_or(0xFF);
    out.push(prefix);
    out.extend_from_slice(text.as_bytes());
    out
}

fn encode_long_ascii(text: &str) -> Vec<u8> {
    // The length field counts itself (2 bytes) plus the body, not the leading flag byte.
    let field_len = u16::try_from(2 + text.len() + 1).unwrap_or(u16::MAX);
    let mut out = Vec::with_capacity(1 + usize::from(field_len));
    out.push(0x40);
    out.extend_from_slice(&field_len.to_le_bytes());
    out.extend_from_slice(text.as_bytes());
    out.push(0);
    out
}

fn encode_utf16(text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let body_len = units.len() * 2;
    // The length field counts itself (2 bytes) plus the body, not the leading flag byte.
    let field_len = u16::try_from(2 + body_len).unwrap_or(u16::MAX);
    let mut out = Vec::with_capacity(1 + usize::from(field_len));
    out.push(0x90);
    out.extend_from_slice(&field_len.to_le_bytes());
    for unit in units {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decode a short-form prefix byte back to the original length, per the
    /// formula §4.6 gives for decoding: `(prefix - 1) / 2 - 1`.
    fn decoded_len(prefix: u8) -> usize {
        ((usize::from(prefix) - 1) / 2) - 1
    }

    #[test]
    fn short_ascii_form_for_plain_text() {
        let encoded = encode("Track");
        assert_eq!(decoded_len(encoded[0]), 5);
        assert_eq!(&encoded[1..], b"Track");
    }

    #[test]
    fn empty_string_is_shortest_short_form() {
        let encoded = encode("");
        assert_eq!(decoded_len(encoded[0]), 0);
        assert_eq!(encoded.len(), 1);
    }

    #[test]
    fn long_ascii_form_above_126_bytes() {
        let text = "a".repeat(127);
        let encoded = encode(&text);
        assert_eq!(encoded[0], 0x40);
        let field_len = u16::from_le_bytes([encoded[1], encoded[2]]);
        // Field counts itself (2 bytes) plus the 127-byte body plus the trailing nul,
        // not the leading flag byte: 2 + 127 + 1 = 130, one short of `encoded.len()`.
        assert_eq!(field_len, 130);
        assert_eq!(encoded.len(), 131);
        assert_eq!(encoded.last(), Some(&0u8));
    }

    #[test]
    fn non_ascii_uses_utf16_form() {
        // "title = Café" -> prefix 0x90, length field 10, body = UTF-16BE of Café.
        let encoded = encode("Café");
        assert_eq!(encoded[0], 0x90);
        let field_len = u16::from_le_bytes([encoded[1], encoded[2]]);
        assert_eq!(field_len, 10);
        assert_eq!(encoded.len(), 11);
    }

    #[test]
    fn chooses_short_form_at_the_126_byte_boundary() {
        let text = "a".repeat(126);
        let encoded = encode(&text);
        assert_eq!(encoded[0], 255);
        assert_eq!(encoded.len(), 127);
        assert_eq!(decoded_len(encoded[0]), 126);
    }
}
