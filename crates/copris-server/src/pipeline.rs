// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline orchestrator. One cycle is:
//
//   read (limit / cutoff) → translate → convert markup → wrap session → write
//
// Cycles run strictly one after another; the tables are only read while a
// cycle is in flight.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use copris_convert::{PrinterSet, TranslationTable, utf8};
use copris_core::error::CoprisError;
use copris_core::{Destination, LimitPolicy, Stats};

use crate::ingest::IngestBuffer;
use crate::sink::Sink;

/// Result of a completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub stats: Stats,
    /// Bytes written to the sink after all conversions.
    pub written: usize,
}

/// A failed cycle, with whatever statistics were gathered before the failure.
#[derive(Debug, Error)]
#[error("{error} ({stats})")]
pub struct CycleError {
    #[source]
    pub error: CoprisError,
    pub stats: Stats,
}

/// Holds the loaded tables and the reusable ingestion buffer.
#[derive(Debug)]
pub struct Pipeline {
    buffer: IngestBuffer,
    translation: Option<TranslationTable>,
    printer_set: Option<PrinterSet>,
}

impl Pipeline {
    pub fn new(limit: usize, policy: LimitPolicy) -> Self {
        Self {
            buffer: IngestBuffer::new(limit, policy),
            translation: None,
            printer_set: None,
        }
    }

    pub fn with_translation(mut self, table: TranslationTable) -> Self {
        self.translation = Some(table);
        self
    }

    pub fn with_printer_set(mut self, set: PrinterSet) -> Self {
        self.printer_set = Some(set);
        self
    }

    pub fn translation_loaded(&self) -> bool {
        self.translation.is_some()
    }

    pub fn printer_set_loaded(&self) -> bool {
        self.printer_set.is_some()
    }

    pub fn unload_translation(&mut self) {
        if let Some(table) = self.translation.take() {
            table.unload();
        }
    }

    pub fn unload_printer_set(&mut self) {
        if let Some(set) = self.printer_set.take() {
            set.unload();
        }
    }

    /// Apply the loaded tables to one cycle's text.
    pub fn transform(&self, mut text: Vec<u8>) -> Vec<u8> {
        if let Some(table) = &self.translation {
            text = table.apply(&text);
        }
        if let Some(set) = &self.printer_set {
            text = set.wrap_session(set.convert_markup(&text));
        }
        text
    }

    /// Run one cycle from `source` to `destination`.
    ///
    /// The destination is only opened when there is something to write.
    pub async fn run_cycle<R>(
        &mut self,
        source: &mut R,
        origin: &str,
        destination: &Destination,
    ) -> Result<CycleReport, CycleError>
    where
        R: AsyncRead + Unpin,
    {
        let (text, stats) = self.ingest(source, origin).await?;
        if text.is_empty() {
            return Ok(CycleReport { stats, written: 0 });
        }

        let output = self.transform(text);
        let sink = Sink::open(destination)
            .await
            .map_err(|error| CycleError { error, stats })?;
        sink.finish(&output)
            .await
            .map_err(|error| CycleError { error, stats })?;

        Ok(Self::report(stats, output.len(), &destination.to_string()))
    }

    /// Run one cycle into an already open writer, which is flushed but left
    /// open.
    pub async fn run_cycle_into<R, W>(
        &mut self,
        source: &mut R,
        origin: &str,
        sink: &mut W,
        target: &str,
    ) -> Result<CycleReport, CycleError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (text, stats) = self.ingest(source, origin).await?;
        if text.is_empty() {
            return Ok(CycleReport { stats, written: 0 });
        }

        let output = self.transform(text);
        let write = async {
            sink.write_all(&output).await?;
            sink.flush().await
        };
        write.await.map_err(|source| CycleError {
            error: CoprisError::Write { target: target.to_string(), source },
            stats,
        })?;

        Ok(Self::report(stats, output.len(), target))
    }

    /// Read the whole cycle into the buffer and drain it.
    async fn ingest<R>(&mut self, source: &mut R, origin: &str) -> Result<(Vec<u8>, Stats), CycleError>
    where
        R: AsyncRead + Unpin,
    {
        self.buffer.reset();

        let stats = match self.buffer.fill(source, origin).await {
            Ok(stats) => stats,
            Err(error) => {
                let stats = self.buffer.stats();
                warn!(origin, %stats, "cycle aborted while reading");
                return Err(CycleError { error, stats });
            }
        };

        info!(origin, %stats, "received text");
        let text = self.buffer.drain();
        if text.is_empty() {
            warn!(origin, "no text has been read");
        } else {
            debug!(origin, codepoints = utf8::count_codepoints(&text), "text buffer drained");
        }
        Ok((text, stats))
    }

    fn report(stats: Stats, written: usize, target: &str) -> CycleReport {
        info!(target, bytes = written, "text sent");
        CycleReport { stats, written }
    }
}
