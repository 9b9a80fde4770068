// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the COPRIS pipeline.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// What to do with the chunk that pushes a cycle over its byte limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitPolicy {
    /// Drop the offending chunk entirely.
    #[default]
    Discard,
    /// Keep the chunk but truncate the text at the limit, never splitting a
    /// UTF-8 codepoint.
    Cutoff,
}

impl fmt::Display for LimitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discard => f.write_str("discard"),
            Self::Cutoff => f.write_str("cutoff"),
        }
    }
}

/// Per-cycle ingestion statistics.
///
/// `sum` counts every received byte until the limit is reached; from then on
/// it is clamped to the limit and the rest is accounted in `discarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Number of chunks pulled from the source.
    pub chunks: usize,
    /// Bytes received, clamped to the limit once it was exceeded.
    pub sum: usize,
    /// Bytes received but not kept in the text buffer.
    pub discarded: usize,
    /// Whether the configured limit was hit during this cycle.
    pub limited: bool,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} byte(s) in {} chunk(s)", self.sum, self.chunks)?;
        if self.limited {
            write!(f, ", limit reached, {} byte(s) dropped", self.discarded)?;
        }
        Ok(())
    }
}

/// Where converted text is written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Destination {
    /// Echo to the console.
    #[default]
    Stdout,
    /// Append to a file or character device (e.g. `/dev/usb/lp0`).
    File(PathBuf),
    /// Raw TCP printer (JetDirect style, usually port 9100), as `host:port`.
    /// The host is resolved when the sink is opened.
    Printer(String),
}

impl Destination {
    /// Interpret a command-line destination argument.
    ///
    /// `host:port` (hostname, IPv4 or bracketed IPv6, port 1-65535) is a
    /// network printer, everything else is a path.
    pub fn parse(arg: &str) -> Self {
        if is_host_port(arg) {
            Self::Printer(arg.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

fn is_host_port(arg: &str) -> bool {
    let Some((host, port)) = arg.rsplit_once(':') else {
        return false;
    };
    let port_ok = !port.is_empty()
        && port.bytes().all(|b| b.is_ascii_digit())
        && port.parse::<u16>().is_ok_and(|p| p != 0);
    let host_ok = if let Some(inner) = host.strip_prefix('[') {
        inner.strip_suffix(']').is_some_and(|ip| ip.parse::<std::net::Ipv6Addr>().is_ok())
    } else {
        !host.is_empty()
            && host
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_')
    };
    port_ok && host_ok
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Printer(addr) => write!(f, "printer at {addr}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_parse_socket_address() {
        let dest = Destination::parse("192.168.1.50:9100");
        assert_eq!(dest, Destination::Printer("192.168.1.50:9100".into()));
        assert_eq!(Destination::parse("[::1]:9100"), Destination::Printer("[::1]:9100".into()));
    }

    #[test]
    fn destination_parse_hostname_and_port() {
        let dest = Destination::parse("printer.local:9100");
        assert_eq!(dest, Destination::Printer("printer.local:9100".into()));
        assert_eq!(dest.to_string(), "printer at printer.local:9100");
    }

    #[test]
    fn destination_parse_path() {
        let dest = Destination::parse("/dev/usb/lp0");
        assert_eq!(dest, Destination::File(PathBuf::from("/dev/usb/lp0")));
        // Colons in paths, or ports out of range, do not make a printer.
        assert!(matches!(Destination::parse("out/job:1"), Destination::File(_)));
        assert!(matches!(Destination::parse("host:0"), Destination::File(_)));
        assert!(matches!(Destination::parse("host:99999"), Destination::File(_)));
        assert!(matches!(Destination::parse("notes.txt"), Destination::File(_)));
    }

    #[test]
    fn stats_display_mentions_limit_only_when_hit() {
        let plain = Stats { chunks: 2, sum: 13, discarded: 0, limited: false };
        assert_eq!(plain.to_string(), "13 byte(s) in 2 chunk(s)");

        let limited = Stats { chunks: 2, sum: 10, discarded: 6, limited: true };
        assert!(limited.to_string().contains("6 byte(s) dropped"));
    }
}
