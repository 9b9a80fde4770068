// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for COPRIS.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading a translation file or a printer feature set.
///
/// Loading is all-or-nothing: any of these means no table was produced.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("definition file {path} not found or unreadable: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}, line {line}: {reason}")]
    Malformed {
        origin: String,
        line: usize,
        reason: String,
    },

    #[error("{origin}, line {line}: element is {length} bytes long, maximum is {max}")]
    TooLarge {
        origin: String,
        line: usize,
        length: usize,
        max: usize,
    },

    #[error("printer feature set '{name}' does not exist")]
    UnknownSet { name: String },
}

/// Top-level error type for all COPRIS operations.
#[derive(Debug, Error)]
pub enum CoprisError {
    // -- Definition files --
    #[error(transparent)]
    Load(#[from] LoadError),

    // -- Pipeline I/O --
    #[error("read failed after {offset} bytes from {origin}: {source}")]
    Read {
        origin: String,
        offset: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("write to {target} failed: {source}")]
    Write {
        target: String,
        #[source]
        source: std::io::Error,
    },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot read configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CoprisError>;
