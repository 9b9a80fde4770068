// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Character translation tables.
//
// A translation file maps source sequences (usually single characters the
// printer lacks) to replacement sequences (an ASCII fallback or the byte of
// the printer's own code page):
//
// ```ini
// ; Slovene letters on a 7-bit printer
// č = c
// Č = C
// š = 0x9A
// „ = "\""
// ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use copris_core::error::LoadError;
use tracing::{debug, info};

use crate::definition::{self, malformed};
use crate::utf8;

/// Loaded source → replacement mapping.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    /// File name or other label used in error messages and logs.
    origin: String,
    /// Where the table was read from, for [`TranslationTable::reload`].
    path: Option<PathBuf>,
    entries: HashMap<Vec<u8>, Vec<u8>>,
    /// Length of the longest key; bounds the lookahead in `apply`.
    max_key_len: usize,
}

impl TranslationTable {
    /// Load a translation file from disk.
    ///
    /// # Errors
    ///
    /// `NotFound` if the file cannot be read, `Malformed` on any unparsable
    /// line or duplicate key, `TooLarge` if a key or value exceeds
    /// [`definition::MAX_ELEMENT_LENGTH`]. No table is returned on error.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let origin = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::InvalidData => malformed(&origin, 0, "file is not valid UTF-8"),
            _ => LoadError::NotFound { path: path.to_path_buf(), source },
        })?;

        let mut table = Self::parse(&origin, &text)?;
        table.path = Some(path.to_path_buf());

        info!(file = %origin, entries = table.len(), "translation file loaded");
        Ok(table)
    }

    /// Parse translation definitions from memory.
    pub fn parse(origin: &str, text: &str) -> Result<Self, LoadError> {
        let mut entries = HashMap::new();
        let mut max_key_len = 0;

        for raw in definition::parse_entries(origin, text)? {
            let key = definition::decode_element(origin, raw.line, raw.key)?;
            let value = definition::decode_element(origin, raw.line, raw.value)?;

            if key.is_empty() {
                return Err(malformed(origin, raw.line, "empty source sequence"));
            }
            if value.is_empty() {
                return Err(malformed(origin, raw.line, "empty replacement sequence"));
            }

            max_key_len = max_key_len.max(key.len());
            if entries.insert(key, value).is_some() {
                return Err(malformed(
                    origin,
                    raw.line,
                    &format!("duplicate definition of '{}'", raw.key),
                ));
            }
        }

        Ok(Self {
            origin: origin.to_string(),
            path: None,
            entries,
            max_key_len,
        })
    }

    /// Re-read the table from the file it was loaded from.
    ///
    /// On error the current entries are kept.
    pub fn reload(&mut self) -> Result<(), LoadError> {
        if let Some(path) = self.path.clone() {
            *self = Self::load(&path)?;
        }
        Ok(())
    }

    /// Release all entries.
    pub fn unload(self) {
        debug!(file = %self.origin, entries = self.len(), "translation table unloaded");
    }

    /// Replacement for an exact source sequence.
    pub fn get(&self, source: &[u8]) -> Option<&[u8]> {
        self.entries.get(source).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translate `text`, left to right, taking the longest matching key at
    /// each position. Unmatched input is copied a whole codepoint at a time.
    pub fn apply(&self, text: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        let mut pos = 0;
        let mut replaced = 0usize;

        while pos < text.len() {
            let rest = &text[pos..];
            let longest = self.max_key_len.min(rest.len());

            let hit = (1..=longest)
                .rev()
                .find_map(|len| self.entries.get(&rest[..len]).map(|value| (len, value)));

            match hit {
                Some((len, value)) => {
                    out.extend_from_slice(value);
                    pos += len;
                    replaced += 1;
                }
                None => {
                    // A stray lead byte takes only the continuation bytes that follow it.
                    let width = utf8::codepoint_length(rest[0]).min(rest.len());
                    let step = 1 + rest[1..width]
                        .iter()
                        .take_while(|&&b| utf8::is_continuation(b))
                        .count();
                    out.extend_from_slice(&rest[..step]);
                    pos += step;
                }
            }
        }

        debug!(file = %self.origin, replaced, "translation applied");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn table(text: &str) -> TranslationTable {
        TranslationTable::parse("test", text).expect("parse")
    }

    #[test]
    fn replaces_single_characters() {
        let t = table("č = c\nš = s\nž = z\n");
        assert_eq!(t.apply("Češnja žuži".as_bytes()), "Česnja zuzi".as_bytes());
    }

    #[test]
    fn text_without_keys_is_unchanged() {
        let t = table("ä = ae\nö = oe\n");
        let input = "plain ASCII text, plus € and 😀".as_bytes();
        assert_eq!(t.apply(input), input);
    }

    #[test]
    fn longest_match_wins() {
        let t = table("a = 1\nab = 2\nabc = 3\n");
        assert_eq!(t.apply(b"abcabxa"), b"32x1");
    }

    #[test]
    fn replacements_are_not_rescanned() {
        let t = table("a = b\nb = c\n");
        assert_eq!(t.apply(b"ab"), b"bc");
    }

    #[test]
    fn hex_values_and_keys() {
        let t = table("š = 0x9A\n0xC8 = \"C\"\n");
        assert_eq!(t.get("š".as_bytes()), Some(&[0x9A][..]));
        assert_eq!(t.apply(&[0xC8, b'!']), b"C!");
    }

    #[test]
    fn does_not_match_inside_a_codepoint() {
        // 0xA9 is the trailing byte of "é" (0xC3 0xA9).
        let t = table("0xA9 = X\n");
        assert_eq!(t.apply("é".as_bytes()), "é".as_bytes());
    }

    #[test]
    fn stray_lead_byte_does_not_hide_following_keys() {
        // Latin-2 input: 0xE8 looks like a three-byte lead but is followed by
        // a lead byte and ASCII.
        let t = table("0xC8 = C\na = b\n");
        assert_eq!(t.apply(&[0xE8, 0xC8, b'a', b'a']), [0xE8, b'C', b'b', b'b']);
        assert_eq!(t.apply(&[0xF0, b'a']), [0xF0, b'b']);
    }

    #[test]
    fn duplicate_key_rejects_file() {
        let err = TranslationTable::parse("dup.ini", "a = b\nc = d\na = e\n").unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 3, .. }));
    }

    #[test]
    fn empty_value_is_malformed() {
        assert!(TranslationTable::parse("test", "a =\n").is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = TranslationTable::load(Path::new("/nonexistent/copris/tr.ini")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn load_and_reload_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "č = c").expect("write");
        let mut t = TranslationTable::load(file.path()).expect("load");
        assert_eq!(t.len(), 1);

        writeln!(file, "š = s").expect("write");
        t.reload().expect("reload");
        assert_eq!(t.len(), 2);
        assert_eq!(t.apply("čš".as_bytes()), b"cs");
    }

    #[test]
    fn failed_reload_keeps_entries() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "č = c").expect("write");
        let mut t = TranslationTable::load(file.path()).expect("load");

        writeln!(file, "this line is broken").expect("write");
        assert!(t.reload().is_err());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn unload_leaves_other_tables_alone() {
        let first = table("a = b\n");
        let second = table("x = y\n");
        first.unload();
        assert_eq!(second.apply(b"xa"), b"ya");
    }
}
