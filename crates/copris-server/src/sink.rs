// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output sinks: console, file/device, or a raw TCP printer (JetDirect, port
// 9100).
//
// A sink is opened per cycle and only written to, never read. For network
// printers that means one TCP connection per job, which is what raw-port
// printers expect.

use std::io;
use std::time::Duration;

use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use copris_core::Destination;
use copris_core::error::{CoprisError, Result};

/// Timeout for connecting to a network printer.
const PRINTER_CONNECT_TIMEOUT_SECS: u64 = 30;

/// An opened, append-only destination.
pub struct Sink {
    target: String,
    writer: Box<dyn AsyncWrite + Unpin + Send>,
}

impl Sink {
    /// Open `destination` for writing.
    ///
    /// Files are opened in append mode and created if missing; device nodes
    /// such as `/dev/usb/lp0` are simply opened.
    pub async fn open(destination: &Destination) -> Result<Self> {
        let target = destination.to_string();
        let writer: Box<dyn AsyncWrite + Unpin + Send> = match destination {
            Destination::Stdout => Box::new(tokio::io::stdout()),
            Destination::File(path) => {
                let file = OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(path)
                    .await
                    .map_err(|source| CoprisError::Write { target: target.clone(), source })?;
                Box::new(file)
            }
            Destination::Printer(addr) => {
                let stream = tokio::time::timeout(
                    Duration::from_secs(PRINTER_CONNECT_TIMEOUT_SECS),
                    TcpStream::connect(addr.as_str()),
                )
                .await
                .map_err(|_| CoprisError::Write {
                    target: target.clone(),
                    source: io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no connection after {PRINTER_CONNECT_TIMEOUT_SECS}s"),
                    ),
                })?
                .map_err(|source| CoprisError::Write { target: target.clone(), source })?;
                info!(addr = %addr, peer = ?stream.peer_addr().ok(), "connected to network printer");
                Box::new(stream)
            }
        };

        debug!(target = %target, "sink opened");
        Ok(Self { target, writer })
    }

    /// Write `bytes` and close the sink, flushing everything.
    pub async fn finish(mut self, bytes: &[u8]) -> Result<()> {
        let target = self.target.clone();
        let to_write_error = |source| CoprisError::Write { target: target.clone(), source };

        self.writer.write_all(bytes).await.map_err(to_write_error)?;
        self.writer.shutdown().await.map_err(to_write_error)?;
        Ok(())
    }
}
