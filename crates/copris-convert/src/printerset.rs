// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer feature sets: the escape sequences one printer model uses for each
// formatting command COPRIS knows about.
//
// Built-in sets are compiled into the binary from `sets/*.ini`; operators may
// also load their own file, typically written starting from `dump_ini()`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use copris_core::error::LoadError;
use tracing::{debug, info};

use crate::definition::{self, malformed};
use crate::markup;

// ---------------------------------------------------------------------------
// Command vocabulary
// ---------------------------------------------------------------------------

/// Every command a feature set may define, in declaration (dump) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    BeforeText,
    AfterText,
    BoldOn,
    BoldOff,
    ItalicOn,
    ItalicOff,
    UnderlineOn,
    UnderlineOff,
    H1On,
    H1Off,
    H2On,
    H2Off,
    H3On,
    H3Off,
    H4On,
    H4Off,
}

impl Command {
    pub const ALL: [Command; 16] = [
        Command::BeforeText,
        Command::AfterText,
        Command::BoldOn,
        Command::BoldOff,
        Command::ItalicOn,
        Command::ItalicOff,
        Command::UnderlineOn,
        Command::UnderlineOff,
        Command::H1On,
        Command::H1Off,
        Command::H2On,
        Command::H2Off,
        Command::H3On,
        Command::H3Off,
        Command::H4On,
        Command::H4Off,
    ];

    /// Key used in definition files.
    pub fn name(self) -> &'static str {
        match self {
            Command::BeforeText => "S_BEFORE_TEXT",
            Command::AfterText => "S_AFTER_TEXT",
            Command::BoldOn => "C_BOLD_ON",
            Command::BoldOff => "C_BOLD_OFF",
            Command::ItalicOn => "C_ITALIC_ON",
            Command::ItalicOff => "C_ITALIC_OFF",
            Command::UnderlineOn => "C_UNDERLINE_ON",
            Command::UnderlineOff => "C_UNDERLINE_OFF",
            Command::H1On => "C_H1_ON",
            Command::H1Off => "C_H1_OFF",
            Command::H2On => "C_H2_ON",
            Command::H2Off => "C_H2_OFF",
            Command::H3On => "C_H3_ON",
            Command::H3Off => "C_H3_OFF",
            Command::H4On => "C_H4_ON",
            Command::H4Off => "C_H4_OFF",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Session commands wrap a whole cycle instead of marking up text.
    pub fn is_session(self) -> bool {
        matches!(self, Command::BeforeText | Command::AfterText)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Built-in registry
// ---------------------------------------------------------------------------

const BUILTIN_SETS: &[(&str, &str)] = &[
    ("epson", include_str!("../sets/epson.ini")),
    ("escpos", include_str!("../sets/escpos.ini")),
    ("ibm", include_str!("../sets/ibm.ini")),
];

/// Names of the compiled-in feature sets.
pub fn registry() -> impl Iterator<Item = &'static str> {
    BUILTIN_SETS.iter().map(|(name, _)| *name)
}

// ---------------------------------------------------------------------------
// PrinterSet
// ---------------------------------------------------------------------------

/// A loaded command → escape sequence table.
#[derive(Debug, Clone, Default)]
pub struct PrinterSet {
    name: String,
    commands: HashMap<Command, Vec<u8>>,
}

impl PrinterSet {
    /// Load a compiled-in set by name.
    ///
    /// # Errors
    ///
    /// `UnknownSet` if no built-in set has this name.
    pub fn load(name: &str) -> Result<Self, LoadError> {
        let (_, text) = BUILTIN_SETS
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .ok_or_else(|| LoadError::UnknownSet { name: name.to_string() })?;

        let set = Self::parse(name, text)?;
        info!(set = name, commands = set.len(), "printer feature set selected");
        Ok(set)
    }

    /// Load an operator-authored set file.
    pub fn load_file(path: &Path) -> Result<Self, LoadError> {
        let origin = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::InvalidData => malformed(&origin, 0, "file is not valid UTF-8"),
            _ => LoadError::NotFound { path: path.to_path_buf(), source },
        })?;

        let set = Self::parse(&origin, &text)?;
        info!(file = %origin, commands = set.len(), "printer feature set loaded");
        Ok(set)
    }

    /// Resolve a built-in name first, then fall back to a file path.
    pub fn resolve(name_or_path: &str) -> Result<Self, LoadError> {
        match Self::load(name_or_path) {
            Err(LoadError::UnknownSet { .. }) if Path::new(name_or_path).is_file() => {
                Self::load_file(Path::new(name_or_path))
            }
            other => other,
        }
    }

    /// Parse set definitions from memory. Empty values leave a command unset.
    pub fn parse(origin: &str, text: &str) -> Result<Self, LoadError> {
        let mut commands = HashMap::new();

        for raw in definition::parse_entries(origin, text)? {
            let command = Command::from_name(raw.key).ok_or_else(|| {
                malformed(origin, raw.line, &format!("unknown command '{}'", raw.key))
            })?;
            let value = definition::decode_element(origin, raw.line, raw.value)?;

            if commands.contains_key(&command) {
                return Err(malformed(
                    origin,
                    raw.line,
                    &format!("duplicate definition of {command}"),
                ));
            }
            if !value.is_empty() {
                commands.insert(command, value);
            }
        }

        Ok(Self {
            name: origin.to_string(),
            commands,
        })
    }

    /// Escape sequence for `command`, if the set defines one.
    pub fn get(&self, command: Command) -> Option<&[u8]> {
        self.commands.get(&command).map(Vec::as_slice)
    }

    /// Number of defined commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every known command with its sequence (empty when unset), in
    /// declaration order.
    pub fn dump(&self) -> Vec<(Command, Vec<u8>)> {
        Command::ALL
            .into_iter()
            .map(|c| (c, self.get(c).map(<[u8]>::to_vec).unwrap_or_default()))
            .collect()
    }

    /// [`dump`](Self::dump) rendered as a definition file.
    pub fn dump_ini(&self) -> String {
        let width = Command::ALL.iter().map(|c| c.name().len()).max().unwrap_or(0);
        let mut out = format!(
            "; COPRIS printer feature set, generated from '{}'\n\
             ; Values are 0xNN bytes or \"quoted text\"; empty means unset.\n",
            self.name
        );

        let mut section = None;
        for (command, value) in self.dump() {
            let wanted = if command.is_session() { "session" } else { "commands" };
            if section != Some(wanted) {
                out.push_str(&format!("\n[{wanted}]\n"));
                section = Some(wanted);
            }
            let encoded = definition::encode_element(&value);
            out.push_str(format!("{:<width$} = {encoded}", command.name()).trim_end());
            out.push('\n');
        }
        out
    }

    /// Replace markup in `text` with this set's escape sequences.
    pub fn convert_markup(&self, text: &[u8]) -> Vec<u8> {
        markup::convert(self, text)
    }

    /// Surround a cycle's output with `S_BEFORE_TEXT` / `S_AFTER_TEXT`.
    pub fn wrap_session(&self, body: Vec<u8>) -> Vec<u8> {
        let before = self.get(Command::BeforeText).unwrap_or_default();
        let after = self.get(Command::AfterText).unwrap_or_default();
        if before.is_empty() && after.is_empty() {
            return body;
        }

        let mut out = Vec::with_capacity(before.len() + body.len() + after.len());
        out.extend_from_slice(before);
        out.extend_from_slice(&body);
        out.extend_from_slice(after);
        out
    }

    /// Release all entries.
    pub fn unload(self) {
        debug!(set = %self.name, "printer feature set unloaded");
    }
}
