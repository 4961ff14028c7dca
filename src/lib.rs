// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{Settings, resolve_settings};
use crate::engine::Supervisor;
use crate::exec::ProcessGroupRunner;
use crate::watch::ChangeDetector;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (file + CLI flags + defaults)
/// - the polling change detector
/// - the process-group runner
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = resolve_settings(&args)?;

    if args.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    let cancel = CancellationToken::new();

    // Ctrl-C → cancel the top-level token.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("shutdown requested");
            cancel.cancel();
        });
    }

    let (command, target) = settings.into_parts();
    info!(
        root = ?target.root(),
        interval = ?target.poll_interval(),
        "watching for changes"
    );

    let detector = ChangeDetector::new(target);
    let mut supervisor = Supervisor::new(command, detector, ProcessGroupRunner::new());
    let report = supervisor.run(&cancel).await?;

    info!(runs = report.runs, restarts = report.triggers, "dux exiting");
    Ok(())
}

/// Simple dry-run output: print the resolved command and watch target.
fn print_dry_run(settings: &Settings) {
    let command = settings.command();
    let target = settings.target();

    println!("dux dry-run");
    println!("  command: {}", command.display());
    println!("  stop_signal: {}", command.stop_signal);
    println!();
    println!("watch:");
    println!("  root: {}", target.root().display());
    println!("  poll_interval: {:?}", target.poll_interval());
    if !target.patterns().include().is_empty() {
        println!("  include: {:?}", target.patterns().include());
    }
    if !target.patterns().exclude().is_empty() {
        println!("  exclude: {:?}", target.patterns().exclude());
    }

    debug!("dry-run complete (no execution)");
}
