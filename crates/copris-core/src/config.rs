// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Server configuration.
//
// Settings come from an optional TOML file and are then overridden by the
// command line:
//
// ```toml
// port = 8080
// daemon = true
// trfile = "/etc/copris/slovene.ini"
// printer = "epson"
// limit = 2048
// policy = "cutoff"
// destination = "/dev/usb/lp0"
// ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CoprisError, Result};
use crate::types::{Destination, LimitPolicy};

/// Largest byte limit the server accepts.
pub const MAX_LIMIT: usize = 4096;

/// Run-time settings handed to the pipeline before the first cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// TCP port to listen on; `None` reads a single session from stdin.
    pub port: Option<u16>,
    /// Keep accepting connections after the first one.
    pub daemon: bool,
    /// Character translation definition file.
    pub trfile: Option<PathBuf>,
    /// Built-in printer feature set name, or a path to a set file.
    pub printer: Option<String>,
    /// Byte limit per cycle, 0 disables limiting.
    pub limit: usize,
    /// How the limit is enforced.
    pub policy: LimitPolicy,
    /// Output file, device or `host:port`; stdout when absent.
    pub destination: Option<String>,
}

impl ServerConfig {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| CoprisError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| CoprisError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.port == Some(0) {
            return Err(CoprisError::Config("port number out of range (1-65535)".into()));
        }
        if self.limit > MAX_LIMIT {
            return Err(CoprisError::Config(format!(
                "limit {} out of range (0-{MAX_LIMIT})",
                self.limit
            )));
        }
        if let Some(name) = &self.printer {
            if name.trim().is_empty() {
                return Err(CoprisError::Config("empty printer feature set name".into()));
            }
        }
        Ok(())
    }

    /// Reading from stdin is implied by the absence of a port.
    pub fn is_stdin(&self) -> bool {
        self.port.is_none()
    }

    /// Resolved output destination.
    pub fn destination(&self) -> Destination {
        self.destination
            .as_deref()
            .map(Destination::parse)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_reads_stdin_without_limit() {
        let config = ServerConfig::default();
        assert!(config.is_stdin());
        assert_eq!(config.limit, 0);
        assert_eq!(config.policy, LimitPolicy::Discard);
        assert_eq!(config.destination(), Destination::Stdout);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn limit_above_maximum_is_rejected() {
        let config = ServerConfig { limit: MAX_LIMIT + 1, ..Default::default() };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoprisError::Config(_)));
        assert!(err.to_string().contains("4097"));
    }

    #[test]
    fn port_zero_is_rejected() {
        let config = ServerConfig { port: Some(0), ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            "port = 9000\ndaemon = true\nlimit = 100\npolicy = \"cutoff\"\nprinter = \"epson\""
        )
        .expect("write");

        let config = ServerConfig::from_file(file.path()).expect("load");
        assert_eq!(config.port, Some(9000));
        assert!(config.daemon);
        assert_eq!(config.limit, 100);
        assert_eq!(config.policy, LimitPolicy::Cutoff);
        assert_eq!(config.printer.as_deref(), Some("epson"));
    }

    #[test]
    fn unknown_keys_in_file_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "colour = \"red\"").expect("write");
        let err = ServerConfig::from_file(file.path()).unwrap_err();
        match err {
            CoprisError::ConfigFile { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let path = Path::new("/nonexistent/copris.toml");
        let err = ServerConfig::from_file(path).unwrap_err();
        assert!(matches!(err, CoprisError::ConfigRead { .. }));
        assert!(err.to_string().contains("/nonexistent/copris.toml"));
    }
}
