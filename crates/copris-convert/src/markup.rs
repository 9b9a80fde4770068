// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lightweight markup → printer escape codes.
//
//   *bold*   _underline_   ~italic~
//   # H1 … #### H4          (at the start of a line, followed by a space)
//   \* \_ \~ \# \\          literal characters
//
// A delimiter opens a span only if an unescaped closing delimiter follows
// somewhere later in the buffer; otherwise it is kept as text. Markers the
// feature set leaves undefined are dropped without substitution.

use crate::printerset::{Command, PrinterSet};

const SPAN_COUNT: usize = 3;

/// Inline span delimiters with their on/off commands.
const SPANS: [(u8, Command, Command); SPAN_COUNT] = [
    (b'*', Command::BoldOn, Command::BoldOff),
    (b'_', Command::UnderlineOn, Command::UnderlineOff),
    (b'~', Command::ItalicOn, Command::ItalicOff),
];

const HEADINGS: [(Command, Command); 4] = [
    (Command::H1On, Command::H1Off),
    (Command::H2On, Command::H2Off),
    (Command::H3On, Command::H3Off),
    (Command::H4On, Command::H4Off),
];

fn is_escapable(byte: u8) -> bool {
    matches!(byte, b'*' | b'_' | b'~' | b'#' | b'\\')
}

fn span_index(byte: u8) -> Option<usize> {
    SPANS.iter().position(|(d, _, _)| *d == byte)
}

/// Index of the last unescaped occurrence of each span delimiter.
fn last_delimiters(text: &[u8]) -> [Option<usize>; SPAN_COUNT] {
    let mut last = [None; SPAN_COUNT];
    let mut i = 0;
    while i < text.len() {
        if text[i] == b'\\' && text.get(i + 1).copied().is_some_and(is_escapable) {
            i += 2;
            continue;
        }
        if let Some(k) = span_index(text[i]) {
            last[k] = Some(i);
        }
        i += 1;
    }
    last
}

/// Heading level (1..=4) if `rest` starts with `#`…`####` and a space.
fn heading_level(rest: &[u8]) -> Option<usize> {
    let hashes = rest.iter().take_while(|&&b| b == b'#').count();
    match (hashes, rest.get(hashes)) {
        (1..=4, Some(b' ')) => Some(hashes),
        _ => None,
    }
}

struct Emitter<'a> {
    set: &'a PrinterSet,
    out: Vec<u8>,
}

impl Emitter<'_> {
    fn command(&mut self, command: Command) {
        if let Some(code) = self.set.get(command) {
            self.out.extend_from_slice(code);
        }
    }
}

/// Convert markup in `text` using the escape sequences of `set`.
pub fn convert(set: &PrinterSet, text: &[u8]) -> Vec<u8> {
    let last = last_delimiters(text);
    let mut open = [false; SPAN_COUNT];
    let mut heading: Option<usize> = None;
    let mut em = Emitter { set, out: Vec::with_capacity(text.len()) };

    let mut i = 0;
    while i < text.len() {
        let byte = text[i];
        let line_start = i == 0 || text[i - 1] == b'\n';

        if line_start && heading.is_none() {
            if let Some(level) = heading_level(&text[i..]) {
                em.command(HEADINGS[level - 1].0);
                heading = Some(level);
                i += level + 1;
                continue;
            }
        }

        if byte == b'\\' && text.get(i + 1).copied().is_some_and(is_escapable) {
            em.out.push(text[i + 1]);
            i += 2;
            continue;
        }

        if byte == b'\n' {
            if let Some(level) = heading.take() {
                em.command(HEADINGS[level - 1].1);
            }
            em.out.push(byte);
            i += 1;
            continue;
        }

        match span_index(byte) {
            Some(k) if open[k] => {
                em.command(SPANS[k].2);
                open[k] = false;
            }
            Some(k) if last[k].is_some_and(|pos| pos > i) => {
                em.command(SPANS[k].1);
                open[k] = true;
            }
            _ => em.out.push(byte),
        }
        i += 1;
    }

    if let Some(level) = heading {
        em.command(HEADINGS[level - 1].1);
    }

    em.out
}
