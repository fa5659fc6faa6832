// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # txwire
//!
//! Entry point for the `txwire` binary. Parses CLI arguments, initializes
//! logging, assembles the codec set, and runs one subcommand:
//!
//! - `encode`  — JSON transaction file to base64 binary
//! - `decode`  — base64 (or hex) binary to JSON
//! - `hash`    — transaction hash of an encoded transaction
//! - `version` — print build version information
//!
//! Encoding and decoding run on a blocking worker. Ctrl+C cancels the run
//! before anything is written to stdout; a run stuck reading stdin is
//! abandoned and the process exits with status 130.

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::fmt;
use std::future::Future;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

use txwire_protocol::config::{CodecConfig, PROTOCOL_VERSION, WIRE_FORMAT_VERSION};
use txwire_protocol::CodecSet;

use cli::{Commands, TxwireCli};
use logging::LogFormat;

/// How long an interrupted job gets to reach its next stage boundary before
/// it is abandoned. A job blocked on stdin never gets there.
const CANCEL_GRACE: Duration = Duration::from_millis(500);

/// Exit status for a run abandoned on Ctrl+C (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = TxwireCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    let config = CodecConfig::default().with_max_tx_bytes(cli.max_tx_bytes);
    tracing::debug!(max_tx_bytes = config.max_tx_bytes, "codec configuration loaded");
    let codecs = CodecSet::standard(config);

    let result = match cli.command {
        Commands::Encode(args) => {
            run_cancellable(move |cancel| {
                let mut stdout = io::stdout().lock();
                commands::encode(&args, &codecs, cancel, &mut stdout)
            })
            .await
        }
        Commands::Decode(args) => {
            run_cancellable(move |cancel| {
                let mut stdout = io::stdout().lock();
                commands::decode(&args, &codecs, cancel, &mut stdout)
            })
            .await
        }
        Commands::Hash(args) => {
            run_cancellable(move |cancel| {
                let mut stdout = io::stdout().lock();
                commands::hash(&args, &codecs, cancel, &mut stdout)?;
                stdout.flush().context("failed to flush stdout")
            })
            .await
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    };

    // The runtime waits for blocking tasks on shutdown, so a job stuck in a
    // read has to be left behind by exiting the process directly.
    if let Err(ref e) = result {
        if let Some(Interrupted::Abandoned) = e.downcast_ref::<Interrupted>() {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_INTERRUPTED);
        }
    }
    result
}

/// Why a run ended early on interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupted {
    /// The job saw the cancellation flag and stopped without output.
    Stopped,
    /// The job did not stop within [`CANCEL_GRACE`] and was left running.
    Abandoned,
}

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupted::Stopped => f.write_str("interrupted"),
            Interrupted::Abandoned => f.write_str("interrupted while waiting for input"),
        }
    }
}

impl std::error::Error for Interrupted {}

/// Runs `job` on the blocking pool and races it against Ctrl+C.
async fn run_cancellable<F>(job: F) -> Result<()>
where
    F: FnOnce(Arc<AtomicBool>) -> Result<()> + Send + 'static,
{
    run_until_interrupted(job, interrupt_signal(), CANCEL_GRACE).await
}

/// Runs `job` on the blocking pool until it finishes or `interrupt`
/// resolves.
///
/// On interrupt the cancellation flag is raised and the job gets `grace` to
/// stop at its next stage boundary. Either way its result is discarded and
/// nothing it would have written has been written.
async fn run_until_interrupted<F, I>(job: F, interrupt: I, grace: Duration) -> Result<()>
where
    F: FnOnce(Arc<AtomicBool>) -> Result<()> + Send + 'static,
    I: Future<Output = ()>,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let mut task = tokio::task::spawn_blocking({
        let cancel = Arc::clone(&cancel);
        move || job(cancel)
    });

    tokio::select! {
        joined = &mut task => joined.context("worker task failed")?,
        _ = interrupt => {
            tracing::info!("interrupt received, cancelling");
            cancel.store(true, Ordering::SeqCst);
            match tokio::time::timeout(grace, &mut task).await {
                Ok(_) => Err(Interrupted::Stopped.into()),
                Err(_) => {
                    tracing::warn!(
                        grace_ms = grace.as_millis() as u64,
                        "job did not stop, abandoning it"
                    );
                    Err(Interrupted::Abandoned.into())
                }
            }
        }
    }
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn interrupt_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

fn print_version() {
    println!("txwire   {}", env!("CARGO_PKG_VERSION"));
    println!("protocol {}", PROTOCOL_VERSION);
    println!("wire     v{}", WIRE_FORMAT_VERSION);
}
