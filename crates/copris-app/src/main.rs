// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// COPRIS — a converting printer server
//
// Entry point. Parses arguments, initialises logging, loads the translation
// file and printer feature set, then serves stdin or a TCP port.

mod cli;

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};

use copris_convert::{PrinterSet, TranslationTable, definition, printerset};
use copris_core::error::{CoprisError, LoadError, Result};
use copris_core::human_errors::humanize_error;
use copris_core::ServerConfig;
use copris_server::ingest::CHUNK_CAPACITY;
use copris_server::{Listener, Pipeline};

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    // Logs go to stderr: stdout may be the print destination.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level())),
        )
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let human = humanize_error(&e);
            error!(severity = ?human.severity, "{human}");
            debug!(error = ?e, "error detail");
            ExitCode::FAILURE
        }
    }
}

fn print_version() {
    println!("COPRIS version {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Compiled options:");
    println!("  Buffer size:          {CHUNK_CAPACITY:4} bytes");
    println!("  Max. element length:  {:4} bytes", definition::MAX_ELEMENT_LENGTH);
    println!("Included printer feature sets:");
    println!("  {}", printerset::registry().collect::<Vec<_>>().join("  "));
}

async fn run(cli: Cli) -> Result<()> {
    if std::env::args_os().len() < 2 {
        warn!("COPRIS won't do much without any arguments. Try using the '--help' option.");
    }

    let base = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    let mut config = cli.apply_to(base);
    config.validate()?;

    if cli.dump_commands {
        let set = match &config.printer {
            Some(name) => PrinterSet::resolve(name)?,
            None => PrinterSet::default(),
        };
        print!("{}", set.dump_ini());
        return Ok(());
    }

    let mut pipeline = Pipeline::new(config.limit, config.policy);

    if let Some(name) = &config.printer {
        if let Some(set) = load_or_disable(PrinterSet::resolve(name), cli.quiet, "printer feature set")? {
            pipeline = pipeline.with_printer_set(set);
        }
    }
    if let Some(path) = &config.trfile {
        if let Some(table) = load_or_disable(TranslationTable::load(path), cli.quiet, "translation")? {
            pipeline = pipeline.with_translation(table);
        }
    }

    if config.daemon && config.is_stdin() {
        warn!("daemon mode not available while reading from stdin");
        config.daemon = false;
    }
    if config.limit > 0 {
        debug!(limit = config.limit, policy = %config.policy, "limiting incoming data");
    }

    let destination = config.destination();
    info!("data stream will be sent to {destination}");

    match config.port {
        None => {
            if std::io::stdin().is_terminal() {
                warn!("reading from stdin in text input mode; to stop reading, press Ctrl+D");
            }
            let mut stdin = tokio::io::stdin();
            let report = pipeline
                .run_cycle(&mut stdin, "stdin", &destination)
                .await
                .map_err(|e| {
                    warn!(stats = %e.stats, "cycle failed");
                    e.error
                })?;
            info!(stats = %report.stats, written = report.written, "done");
        }
        Some(port) => {
            let listener = Listener::bind(port).await?;
            if config.daemon {
                debug!("daemon mode enabled");
            }
            let shutdown = async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            let summary = listener
                .serve(&mut pipeline, &destination, config.daemon, shutdown)
                .await
                .map_err(|e| {
                    warn!(stats = %e.stats, "cycle failed");
                    e.error
                })?;
            info!(cycles = summary.cycles, written = summary.written, "server stopped");
        }
    }

    Ok(())
}

/// Quiet mode turns a failed table load into a warning and disables the
/// feature; otherwise the error aborts the run.
fn load_or_disable<T>(
    loaded: std::result::Result<T, LoadError>,
    quiet: bool,
    feature: &str,
) -> Result<Option<T>> {
    match loaded {
        Ok(table) => Ok(Some(table)),
        Err(e) if quiet => {
            error!(error = %e, "disabling {feature}");
            Ok(None)
        }
        Err(e) => Err(CoprisError::Load(e)),
    }
}
