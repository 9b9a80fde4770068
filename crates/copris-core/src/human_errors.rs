// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operator-facing error messages.
//
// Every terminal error is mapped to a one-line summary plus a concrete hint
// naming what to fix (file, line, limit, address).

use crate::error::{CoprisError, LoadError};

/// How the operator should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Connection dropped or device busy; the next cycle may succeed.
    Transient,
    /// A file, argument or permission needs fixing.
    ActionRequired,
}

/// A readable error with an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// One-line summary.
    pub message: String,
    /// What to try next.
    pub suggestion: String,
    /// Logged alongside the message by the CLI.
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

/// Convert a `CoprisError` into a `HumanError`.
pub fn humanize_error(err: &CoprisError) -> HumanError {
    match err {
        CoprisError::Load(load) => humanize_load_error(load),

        CoprisError::Read { origin, offset, source } => HumanError {
            message: format!("Reading from {origin} stopped after {offset} byte(s)."),
            suggestion: format!("The sender closed or reset the stream ({source}). Text received so far was not printed."),
            severity: Severity::Transient,
        },

        CoprisError::Write { target, source } => match source.kind() {
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: format!("Not allowed to write to {target}."),
                suggestion: "Check the permissions of the output file or printer device, or add the user to the printer's group.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::NotFound => HumanError {
                message: format!("Output {target} does not exist."),
                suggestion: "Is the printer connected and switched on? Check the device path.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: format!("Writing to {target} failed."),
                suggestion: format!("The printer may be offline or busy ({source})."),
                severity: Severity::Transient,
            },
        },

        CoprisError::Config(detail) => HumanError {
            message: "Invalid settings.".into(),
            suggestion: format!("Correct the argument and try again: {detail}."),
            severity: Severity::ActionRequired,
        },

        CoprisError::ConfigRead { path, source } => HumanError {
            message: format!("Configuration file {} could not be read.", path.display()),
            suggestion: format!("Check the path given with --config ({source})."),
            severity: Severity::ActionRequired,
        },

        CoprisError::ConfigFile { path, source } => HumanError {
            message: format!("Configuration file {} could not be parsed.", path.display()),
            suggestion: source.to_string(),
            severity: Severity::ActionRequired,
        },

        CoprisError::Io(detail) => HumanError {
            message: "An I/O error occurred.".into(),
            suggestion: detail.to_string(),
            severity: Severity::Transient,
        },
    }
}

fn humanize_load_error(err: &LoadError) -> HumanError {
    match err {
        LoadError::NotFound { path, .. } => HumanError {
            message: format!("Definition file {} could not be opened.", path.display()),
            suggestion: "Does it exist, with read permission for this user?".into(),
            severity: Severity::ActionRequired,
        },
        LoadError::Malformed { origin, line, reason } => HumanError {
            message: format!("{origin} has an error on line {line}."),
            suggestion: format!("{reason}. Entries look like `key = value`; values may be quoted text or 0xNN bytes."),
            severity: Severity::ActionRequired,
        },
        LoadError::TooLarge { origin, line, length, max } => HumanError {
            message: format!("{origin} line {line} holds an element of {length} bytes."),
            suggestion: format!("Shorten it to at most {max} bytes."),
            severity: Severity::ActionRequired,
        },
        LoadError::UnknownSet { name } => HumanError {
            message: format!("Printer feature set '{name}' does not exist."),
            suggestion: "Run with --version to list the built-in sets, or pass a path to a set file.".into(),
            severity: Severity::ActionRequired,
        },
    }
}
