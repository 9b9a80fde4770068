// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// INI-style definition file lexer shared by translation files and printer
// feature sets.
//
// ```ini
// ; comment
// [section]            ; accepted, ignored
// key = value
// č = "c"
// C_BOLD_ON = 0x1B "E"
// ```
//
// A value is a whitespace separated list of tokens:
//
//   0xNN      one byte in hexadecimal
//   "text"    literal text, with \" \\ \n \r \t and \e (ESC) escapes
//   word      any other bare word, taken literally
//
// Keys use the same token grammar, so `0xC8 = "C"` maps a raw byte.
// A `;` opens a comment only at the start of a line or after a section
// header; inside an entry it is an ordinary character.

use copris_core::error::LoadError;

/// Maximum decoded length of a single key or value.
pub const MAX_ELEMENT_LENGTH: usize = 64;

/// One `key = value` line, still in source form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry<'a> {
    /// 1-based line number, for error reporting.
    pub line: usize,
    pub key: &'a str,
    pub value: &'a str,
}

/// Split definition text into entries, skipping comments, blank lines and
/// section headers.
pub fn parse_entries<'a>(origin: &str, text: &'a str) -> Result<Vec<RawEntry<'a>>, LoadError> {
    let mut entries = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[') {
            let Some((_, trailing)) = header.split_once(']') else {
                return Err(malformed(origin, line_no, "unterminated section header"));
            };
            let trailing = trailing.trim_start();
            if !trailing.is_empty() && !trailing.starts_with(';') {
                return Err(malformed(origin, line_no, "unexpected text after section header"));
            }
            continue;
        }

        let (key, value) =
            split_entry(line).ok_or_else(|| malformed(origin, line_no, "missing '=' separator"))?;
        if key.is_empty() {
            return Err(malformed(origin, line_no, "empty key"));
        }

        entries.push(RawEntry { line: line_no, key, value });
    }

    Ok(entries)
}

/// Decode a key or value into bytes, enforcing [`MAX_ELEMENT_LENGTH`].
pub fn decode_element(origin: &str, line: usize, source: &str) -> Result<Vec<u8>, LoadError> {
    let bytes = decode_tokens(source).map_err(|reason| malformed(origin, line, &reason))?;
    if bytes.len() > MAX_ELEMENT_LENGTH {
        return Err(LoadError::TooLarge {
            origin: origin.to_string(),
            line,
            length: bytes.len(),
            max: MAX_ELEMENT_LENGTH,
        });
    }
    Ok(bytes)
}

/// Render bytes as hex tokens, the inverse of [`decode_element`].
pub fn encode_element(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn malformed(origin: &str, line: usize, reason: &str) -> LoadError {
    LoadError::Malformed {
        origin: origin.to_string(),
        line,
        reason: reason.to_string(),
    }
}

/// Split at the first `=` outside a leading quoted key. The search starts
/// after the first character so that `=` itself can be a key.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let search_from = if line.starts_with('"') {
        closing_quote(line)? + 1
    } else {
        line.chars().next()?.len_utf8()
    };
    let eq = search_from + line[search_from..].find('=')?;
    Some((line[..eq].trim(), line[eq + 1..].trim()))
}

/// Byte index of the quote closing the string opened at index 0.
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

fn decode_tokens(source: &str) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => {
                        let (_, esc) = chars.next().ok_or("dangling '\\' in quoted text")?;
                        let byte = match esc {
                            '"' => b'"',
                            '\\' => b'\\',
                            'n' => b'\n',
                            'r' => b'\r',
                            't' => b'\t',
                            'e' => 0x1B,
                            other => return Err(format!("unknown escape '\\{other}'")),
                        };
                        out.push(byte);
                    }
                    other => {
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
                    }
                }
            }
            if !closed {
                return Err("unterminated quoted text".into());
            }
            continue;
        }

        let mut end = source.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() {
                end = i;
                break;
            }
            chars.next();
        }
        let word = &source[start..end];

        match word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
            Some(hex) => {
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|_| format!("invalid hex byte '{word}'"))?;
                out.push(byte);
            }
            None => out.extend_from_slice(word.as_bytes()),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_sections_and_blank_lines() {
        let text = "; header\n\n[general]\nč = c\n  ; indented comment\nš = s\n";
        let entries = parse_entries("test", text).expect("parse");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], RawEntry { line: 4, key: "č", value: "c" });
        assert_eq!(entries[1].line, 6);
    }

    #[test]
    fn equals_sign_can_be_a_key() {
        let entries = parse_entries("test", "= = 0x3D 0x3D").expect("parse");
        assert_eq!(entries[0].key, "=");
        assert_eq!(entries[0].value, "0x3D 0x3D");
    }

    #[test]
    fn quoted_key_may_contain_equals() {
        let entries = parse_entries("test", "\"a=b\" = x").expect("parse");
        assert_eq!(entries[0].key, "\"a=b\"");
        assert_eq!(decode_element("test", 1, entries[0].key).unwrap(), b"a=b");
    }

    #[test]
    fn missing_separator_is_malformed() {
        let err = parse_entries("trfile.ini", "ok = 1\nbroken line\n").unwrap_err();
        match err {
            LoadError::Malformed { origin, line, .. } => {
                assert_eq!(origin, "trfile.ini");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unterminated_section_is_malformed() {
        assert!(parse_entries("test", "[oops\n").is_err());
    }

    #[test]
    fn section_header_may_carry_a_comment() {
        let text = "[commands]   ; accepted, ignored\nC_BOLD_ON = 0x1B 0x45\n";
        let entries = parse_entries("test", text).expect("parse");
        assert_eq!(entries, vec![RawEntry { line: 2, key: "C_BOLD_ON", value: "0x1B 0x45" }]);

        let err = parse_entries("test", "[commands] stray\n").unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 1, .. }));
    }

    #[test]
    fn semicolon_inside_an_entry_is_literal() {
        let entries = parse_entries("test", "0x3B = semi;colon ;\n").expect("parse");
        assert_eq!(entries[0].key, "0x3B");
        assert_eq!(decode_element("test", 1, entries[0].value).expect("decode"), b"semi;colon;");
    }

    #[test]
    fn decodes_mixed_tokens() {
        let bytes = decode_element("test", 1, "0x1B \"E\" x 0x0a").expect("decode");
        assert_eq!(bytes, vec![0x1B, b'E', b'x', 0x0A]);
    }

    #[test]
    fn quoted_escapes() {
        let bytes = decode_element("test", 1, r#""\e@ \"q\"\\\n""#).expect("decode");
        assert_eq!(bytes, b"\x1b@ \"q\"\\\n");
    }

    #[test]
    fn bad_hex_and_unterminated_quote_are_malformed() {
        assert!(matches!(
            decode_element("test", 3, "0xZZ"),
            Err(LoadError::Malformed { line: 3, .. })
        ));
        assert!(decode_element("test", 1, "\"open").is_err());
        assert!(decode_element("test", 1, "\"\\q\"").is_err());
    }

    #[test]
    fn oversized_element_is_too_large() {
        let long = format!("\"{}\"", "x".repeat(MAX_ELEMENT_LENGTH + 1));
        match decode_element("test", 9, &long) {
            Err(LoadError::TooLarge { line, length, max, .. }) => {
                assert_eq!(line, 9);
                assert_eq!(length, MAX_ELEMENT_LENGTH + 1);
                assert_eq!(max, MAX_ELEMENT_LENGTH);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn encode_decodes_back() {
        let bytes = vec![0x1B, 0x2D, 0x01];
        let text = encode_element(&bytes);
        assert_eq!(text, "0x1B 0x2D 0x01");
        assert_eq!(decode_element("test", 1, &text).unwrap(), bytes);
    }
}
