// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Byte-level UTF-8 helpers.
//
//   Binary    Hex         Meaning
//   0xxxxxxx  0x00..0x7F  single byte character
//   10xxxxxx  0x80..0xBF  continuation byte
//   110xxxxx  0xC0..0xDF  lead of a 2-byte sequence
//   1110xxxx  0xE0..0xEF  lead of a 3-byte sequence
//   11110xxx  0xF0..0xF7  lead of a 4-byte sequence
//
// None of these validate; malformed input degrades to 1-byte steps.

/// Longest UTF-8 sequence.
pub const UTF8_MAX_LENGTH: usize = 4;

/// True for `10xxxxxx` bytes.
#[inline]
pub fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Length of the sequence introduced by `lead`.
///
/// Continuation bytes and invalid leads (`0xF8..=0xFF`) count as 1, so callers
/// stepping through a buffer always make progress.
pub fn codepoint_length(lead: u8) -> usize {
    match lead {
        b if b & 0x80 == 0x00 => 1,
        b if b & 0xE0 == 0xC0 => 2,
        b if b & 0xF0 == 0xE0 => 3,
        b if b & 0xF8 == 0xF0 => 4,
        _ => 1,
    }
}

/// Number of codepoints, counted as non-continuation bytes.
pub fn count_codepoints(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| !is_continuation(b)).count()
}

/// Largest prefix length `<= max_len` that does not split a codepoint.
///
/// If the first excluded byte continues a sequence, the partial sequence is
/// dropped as well. The backward walk stops after `UTF8_MAX_LENGTH - 1`
/// bytes; a longer run of continuation bytes is malformed and `max_len` is
/// returned unchanged.
pub fn safe_truncation_length(bytes: &[u8], max_len: usize) -> usize {
    if max_len >= bytes.len() {
        return bytes.len();
    }
    if !is_continuation(bytes[max_len]) {
        return max_len;
    }

    (1..UTF8_MAX_LENGTH)
        .take_while(|&back| back <= max_len)
        .map(|back| max_len - back)
        .find(|&i| !is_continuation(bytes[i]))
        .unwrap_or(max_len)
}
