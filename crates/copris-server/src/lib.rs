// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// COPRIS Server — ingestion buffer, per-cycle conversion pipeline, output
// sinks and the sequential TCP listener. This crate connects the pure
// transformations in `copris-convert` to actual byte sources and printers.

pub mod ingest;
pub mod listener;
pub mod pipeline;
pub mod sink;

pub use ingest::{IngestBuffer, IngestState};
pub use listener::{Listener, ServeSummary};
pub use pipeline::{CycleError, CycleReport, Pipeline};
pub use sink::Sink;
