// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sequential TCP listener.
//
// Each accepted connection is one cycle, awaited to completion before the
// next `accept`. There are no per-connection tasks: while a cycle runs, new
// clients wait in the kernel backlog. The shutdown signal is only observed
// between cycles.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use copris_core::Destination;
use copris_core::error::CoprisError;

use crate::pipeline::{CycleError, Pipeline};

/// Summary of a finished listening session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServeSummary {
    /// Connections processed successfully.
    pub cycles: usize,
    /// Total bytes written to the destination.
    pub written: usize,
}

/// Bound listening socket.
pub struct Listener {
    listener: TcpListener,
    port: u16,
}

impl Listener {
    /// Bind `0.0.0.0:{port}`. Port 0 picks a free port.
    pub async fn bind(port: u16) -> Result<Self, CoprisError> {
        let bind_addr: SocketAddr = ([0, 0, 0, 0], port).into();
        let listener = TcpListener::bind(bind_addr).await.map_err(|e| {
            CoprisError::Config(format!("cannot listen on {bind_addr}: {e}"))
        })?;
        let port = listener.local_addr()?.port();

        info!(port, "server is listening");
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Accept connections and run one pipeline cycle for each.
    ///
    /// Returns after the first connection unless `daemon` is set. In daemon
    /// mode the loop ends when `shutdown` resolves or a cycle fails; the
    /// failure is returned.
    pub async fn serve<F>(
        &self,
        pipeline: &mut Pipeline,
        destination: &Destination,
        daemon: bool,
        shutdown: F,
    ) -> Result<ServeSummary, CycleError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = ServeSummary::default();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(port = self.port, cycles = summary.cycles, "shutdown requested, closing listener");
                    break;
                }

                accepted = self.listener.accept() => {
                    let (mut stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                            continue;
                        }
                    };

                    info!(peer = %peer, "connection accepted");
                    let report = pipeline
                        .run_cycle(&mut stream, &peer.to_string(), destination)
                        .await?;
                    debug!(peer = %peer, written = report.written, "connection closed");

                    summary.cycles += 1;
                    summary.written += report.written;

                    if !daemon {
                        debug!("not running as a daemon, stopping after one connection");
                        break;
                    }
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copris_core::LimitPolicy;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;

    async fn send(port: u16, data: &'static [u8]) {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).await.expect("connect");
        stream.write_all(data).await.expect("send");
        stream.shutdown().await.expect("shutdown");
    }

    #[tokio::test]
    async fn single_connection_without_daemon() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        let dest = Destination::File(path.clone());

        let listener = Listener::bind(0).await.expect("bind");
        let port = listener.port();
        assert_ne!(port, 0);

        let client = tokio::spawn(send(port, b"hello printer"));
        let mut pipeline = Pipeline::new(0, LimitPolicy::Discard);
        let summary = listener
            .serve(&mut pipeline, &dest, false, std::future::pending())
            .await
            .expect("serve");
        client.await.expect("client");

        assert_eq!(summary, ServeSummary { cycles: 1, written: 13 });
        assert_eq!(std::fs::read(&path).expect("read"), b"hello printer");
    }

    #[tokio::test]
    async fn daemon_processes_connections_in_order_until_shutdown() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        let dest = Destination::File(path.clone());

        let listener = Listener::bind(0).await.expect("bind");
        let port = listener.port();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let written = path.clone();
        let clients = tokio::spawn(async move {
            send(port, b"one;").await;
            send(port, b"two;").await;
            // Stop only once the second cycle has reached the file.
            let finished = async {
                while tokio::fs::read(&written).await.unwrap_or_default() != b"one;two;" {
                    tokio::task::yield_now().await;
                }
            };
            tokio::time::timeout(std::time::Duration::from_secs(10), finished)
                .await
                .expect("both cycles written");
            let _ = stop_tx.send(());
        });

        let mut pipeline = Pipeline::new(0, LimitPolicy::Discard);
        let summary = listener
            .serve(&mut pipeline, &dest, true, async {
                let _ = stop_rx.await;
            })
            .await
            .expect("serve");
        clients.await.expect("clients");

        assert_eq!(summary.cycles, 2);
        assert_eq!(std::fs::read(&path).expect("read"), b"one;two;");
    }

    #[tokio::test]
    async fn cycle_failure_stops_the_loop() {
        let dest = Destination::File("/nonexistent/copris/out".into());
        let listener = Listener::bind(0).await.expect("bind");
        let port = listener.port();

        let client = tokio::spawn(send(port, b"data"));
        let mut pipeline = Pipeline::new(0, LimitPolicy::Discard);
        let err = listener
            .serve(&mut pipeline, &dest, true, std::future::pending())
            .await
            .unwrap_err();
        client.await.expect("client");

        assert!(matches!(err.error, CoprisError::Write { .. }));
        assert_eq!(err.stats.sum, 4);
    }
}
