// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ingestion buffer: pulls bounded chunks from a byte source into the cycle's
// text buffer, keeping statistics and enforcing the byte limit.
//
//   Idle → Reading → Limited | Complete → Drained
//                  ↘ Failed (read error; buffer discarded)

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

use copris_convert::utf8;
use copris_core::error::CoprisError;
use copris_core::{LimitPolicy, Stats};

/// Size of the scratch region each read fills.
pub const CHUNK_CAPACITY: usize = 1024;

/// Lifecycle of one ingestion cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Idle,
    Reading,
    /// The limit was hit; remaining input is ignored.
    Limited,
    /// The source reached end-of-stream within the limit.
    Complete,
    /// Text was handed to the next stage.
    Drained,
    /// The source failed mid-cycle.
    Failed,
}

/// Per-cycle text buffer with limit enforcement.
#[derive(Debug)]
pub struct IngestBuffer {
    text: Vec<u8>,
    stats: Stats,
    state: IngestState,
    /// 0 disables limiting.
    limit: usize,
    policy: LimitPolicy,
}

impl IngestBuffer {
    pub fn new(limit: usize, policy: LimitPolicy) -> Self {
        Self {
            text: Vec::new(),
            stats: Stats::default(),
            state: IngestState::Idle,
            limit,
            policy,
        }
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Account for one received chunk.
    ///
    /// Returns `false` once the limit has been reached and reading must stop.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> bool {
        self.state = IngestState::Reading;
        self.stats.chunks += 1;

        let limited = self.limit > 0 && self.stats.sum + chunk.len() > self.limit;
        if !limited {
            self.text.extend_from_slice(chunk);
            self.stats.sum += chunk.len();
            return true;
        }

        match self.policy {
            LimitPolicy::Discard => {
                self.stats.discarded += chunk.len();
                warn!(limit = self.limit, dropped = chunk.len(), "byte limit exceeded, discarding chunk");
            }
            LimitPolicy::Cutoff => {
                self.text.extend_from_slice(chunk);
                let keep = utf8::safe_truncation_length(&self.text, self.limit);
                self.stats.discarded += self.text.len() - keep;
                self.text.truncate(keep);
                warn!(limit = self.limit, kept = keep, "byte limit exceeded, cutting text off");
            }
        }

        self.stats.sum = self.limit;
        self.stats.limited = true;
        self.state = IngestState::Limited;
        false
    }

    /// Read `source` until end-of-stream or the limit.
    ///
    /// On a read error the buffer is discarded and the partial statistics stay
    /// available through [`stats`](Self::stats).
    pub async fn fill<R>(&mut self, source: &mut R, origin: &str) -> Result<Stats, CoprisError>
    where
        R: AsyncRead + Unpin,
    {
        let mut scratch = [0u8; CHUNK_CAPACITY];

        loop {
            let n = match source.read(&mut scratch).await {
                Ok(n) => n,
                Err(source) => {
                    self.text.clear();
                    self.state = IngestState::Failed;
                    return Err(CoprisError::Read {
                        origin: origin.to_string(),
                        offset: self.stats.sum,
                        source,
                    });
                }
            };

            if n == 0 {
                self.state = IngestState::Complete;
                break;
            }
            debug!(origin, bytes = n, "chunk received");

            if !self.push_chunk(&scratch[..n]) {
                break;
            }
        }

        Ok(self.stats)
    }

    /// Hand the text over to the next stage, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<u8> {
        self.state = IngestState::Drained;
        std::mem::take(&mut self.text)
    }

    /// Prepare for the next cycle.
    pub fn reset(&mut self) {
        self.text.clear();
        self.stats = Stats::default();
        self.state = IngestState::Idle;
    }
}
