// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// COPRIS Convert — the text transformations applied to every cycle: UTF-8
// safe truncation, character translation and markup to printer escape code
// conversion. Everything here is pure and synchronous; I/O lives in
// `copris-server`.

pub mod definition;
pub mod markup;
pub mod printerset;
pub mod translate;
pub mod utf8;

pub use printerset::{Command, PrinterSet};
pub use translate::TranslationTable;
