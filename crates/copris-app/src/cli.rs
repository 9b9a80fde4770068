// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use copris_core::config::MAX_LIMIT;
use copris_core::{LimitPolicy, ServerConfig};

/// COPRIS, a converting printer server.
///
/// To read from stdin, omit the port argument. To echo data to stdout
/// (console/terminal), omit the destination.
#[derive(Debug, Parser)]
#[command(name = "copris", disable_version_flag = true)]
pub struct Cli {
    /// Listening port.
    #[arg(short, long, value_name = "NUMBER", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Keep accepting connections after the first one.
    #[arg(short, long)]
    pub daemon: bool,

    /// Character translation file.
    #[arg(short, long, value_name = "TRFILE")]
    pub trfile: Option<PathBuf>,

    /// Printer feature set: a built-in name or a path to a set file.
    #[arg(short = 'r', long, value_name = "PRSET")]
    pub printer: Option<String>,

    /// Limit number of received bytes per connection (0 disables).
    #[arg(short, long, value_name = "NUMBER",
          value_parser = clap::value_parser!(u64).range(0..=MAX_LIMIT as u64))]
    pub limit: Option<u64>,

    /// Cut text off at the limit instead of discarding the whole chunk.
    #[arg(long)]
    pub cutoff_limit: bool,

    /// Print all printer commands of the selected (or an empty) feature set
    /// in definition file format, then exit.
    #[arg(long)]
    pub dump_commands: bool,

    /// TOML configuration file; command-line options take precedence.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Be verbose (-vv more).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Display nothing except errors; a table that fails to load is disabled
    /// instead of aborting.
    #[arg(short, long)]
    pub quiet: bool,

    /// Show program version and included printer feature sets.
    #[arg(short = 'V', long)]
    pub version: bool,

    /// Output file, printer device or `host:port` of a network printer.
    pub destination: Option<String>,
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, _) => "debug",
        }
    }

    /// Overlay command-line options onto `base`.
    pub fn apply_to(&self, mut base: ServerConfig) -> ServerConfig {
        if self.port.is_some() {
            base.port = self.port;
        }
        if self.daemon {
            base.daemon = true;
        }
        if self.trfile.is_some() {
            base.trfile.clone_from(&self.trfile);
        }
        if self.printer.is_some() {
            base.printer.clone_from(&self.printer);
        }
        if let Some(limit) = self.limit {
            base.limit = limit as usize;
        }
        if self.cutoff_limit {
            base.policy = LimitPolicy::Cutoff;
        }
        if self.destination.is_some() {
            base.destination.clone_from(&self.destination);
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_full_socket_invocation() {
        let cli = Cli::try_parse_from([
            "copris", "-p", "8080", "-d", "-t", "sl.ini", "-r", "epson", "-l", "100",
            "--cutoff-limit", "-vv", "/dev/usb/lp0",
        ])
        .expect("parse");

        assert_eq!(cli.log_level(), "debug");
        let config = cli.apply_to(ServerConfig::default());
        assert_eq!(config.port, Some(8080));
        assert!(config.daemon);
        assert_eq!(config.trfile, Some(PathBuf::from("sl.ini")));
        assert_eq!(config.printer.as_deref(), Some("epson"));
        assert_eq!(config.limit, 100);
        assert_eq!(config.policy, LimitPolicy::Cutoff);
        assert_eq!(config.destination.as_deref(), Some("/dev/usb/lp0"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(Cli::try_parse_from(["copris", "-p", "0"]).is_err());
        assert!(Cli::try_parse_from(["copris", "-p", "70000"]).is_err());
        assert!(Cli::try_parse_from(["copris", "-l", "4097"]).is_err());
        assert!(Cli::try_parse_from(["copris", "-l", "-1"]).is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["copris", "-q", "-v"]).is_err());
    }

    #[test]
    fn command_line_overrides_file_settings() {
        let base = ServerConfig {
            port: Some(9000),
            printer: Some("ibm".into()),
            limit: 50,
            ..Default::default()
        };
        let cli = Cli::try_parse_from(["copris", "-r", "escpos"]).expect("parse");
        let config = cli.apply_to(base);
        assert_eq!(config.port, Some(9000));
        assert_eq!(config.printer.as_deref(), Some("escpos"));
        assert_eq!(config.limit, 50);
    }
}
