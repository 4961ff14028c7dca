// src/exec/process_group.rs

//! Real process runner built on POSIX process groups.
//!
//! Every command is spawned as the leader of its own process group, and
//! stopping always signals the *group* (`killpg`), never just the leader.
//! Killing only the leader lets its children be reparented and outlive the
//! run; signalling the group takes the whole tree down together.
//!
//! Exit statuses are collected by a detached reaper task per run, so `stop`
//! never blocks on the child actually exiting.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{DuxError, Result};

use super::backend::{CommandSpec, ProcessRunner};
use super::handle::ProcessHandle;

/// Production [`ProcessRunner`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessGroupRunner;

impl ProcessGroupRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for ProcessGroupRunner {
    fn start(&mut self, spec: &CommandSpec, scope: CancellationToken) -> Result<ProcessHandle> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .process_group(0);

        let child = cmd.spawn().map_err(|source| DuxError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        let pgid = child
            .id()
            .and_then(|id| i32::try_from(id).ok())
            .ok_or_else(|| DuxError::Spawn {
                program: spec.program.clone(),
                source: io::Error::other("spawned process has no usable pid"),
            })?;

        info!(program = %spec.display(), pgid, "started process group");

        tokio::spawn(reap(child, pgid, spec.stop_signal.signal(), scope));

        Ok(ProcessHandle::new(pgid).with_stop_signal(spec.stop_signal))
    }

    fn stop(&mut self, handle: &mut ProcessHandle) {
        if !handle.begin_termination() {
            debug!(pgid = handle.pgid(), "process group already stopped");
            return;
        }

        let signal = handle.stop_signal().signal();
        if signal_group(handle.pgid(), signal) {
            info!(pgid = handle.pgid(), signal = signal.as_str(), "signalled process group");
        }
        handle.finish_termination();
    }
}

/// How long a group gets to exit after a catchable stop signal before it is
/// sent `SIGKILL`.
pub const STOP_GRACE: Duration = Duration::from_secs(2);

/// Collect the leader's exit status, then clean up the group once the run's
/// scope ends.
///
/// The group is signalled here as well as in `stop`, so it never outlives
/// its run even when `stop` was skipped. A stop signal other than `SIGKILL`
/// can be caught or ignored, so whatever is left of the group after
/// [`STOP_GRACE`] is killed outright. While the leader is unreaped its pid
/// cannot be recycled, so the pgid stays valid for these signals.
async fn reap(mut child: Child, pgid: i32, signal: Signal, scope: CancellationToken) {
    let mut exited = tokio::select! {
        status = child.wait() => {
            log_exit(pgid, status);
            true
        }
        _ = scope.cancelled() => false,
    };

    scope.cancelled().await;
    signal_group(pgid, signal);
    if signal == Signal::SIGKILL {
        if !exited {
            log_exit(pgid, child.wait().await);
        }
        return;
    }

    let deadline = Instant::now() + STOP_GRACE;
    if !exited {
        if let Ok(status) = time::timeout_at(deadline, child.wait()).await {
            log_exit(pgid, status);
            exited = true;
        }
    }
    while exited && group_exists(pgid) && Instant::now() < deadline {
        time::sleep(Duration::from_millis(20)).await;
    }

    if !exited || group_exists(pgid) {
        warn!(pgid, signal = signal.as_str(), "process group outlived stop signal; killing it");
        signal_group(pgid, Signal::SIGKILL);
    }
    if !exited {
        log_exit(pgid, child.wait().await);
    }
}

fn log_exit(pgid: i32, status: io::Result<ExitStatus>) {
    match status {
        Ok(status) => debug!(pgid, status = %status, "process group leader exited"),
        Err(err) => debug!(pgid, error = %err, "failed to collect exit status"),
    }
}

/// Send `signal` to every process in group `pgid`.
///
/// Returns false when nothing was signalled. A group that no longer exists
/// (`ESRCH`) is not an error.
pub fn signal_group(pgid: i32, signal: Signal) -> bool {
    match killpg(Pid::from_raw(pgid), signal) {
        Ok(()) => true,
        Err(Errno::ESRCH) => {
            debug!(pgid, "process group already gone");
            false
        }
        Err(err) => {
            debug!(pgid, error = %err, "failed to signal process group");
            false
        }
    }
}

/// True while at least one process in group `pgid` exists (zombies count).
pub fn group_exists(pgid: i32) -> bool {
    match killpg(Pid::from_raw(pgid), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}
