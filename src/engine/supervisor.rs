// src/engine/supervisor.rs

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::{CommandSpec, ProcessRunner};
use crate::types::WaitOutcome;
use crate::watch::Trigger;

/// Counters returned when a supervisor shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    /// Number of times the command was started.
    pub runs: usize,
    /// Number of waits that ended because of a trigger rather than shutdown.
    pub triggers: usize,
}

/// Runs a command, waits on a trigger, kills the command, and starts over.
///
/// At most one [`ProcessHandle`](crate::exec::ProcessHandle) is alive at any
/// time: each run's group is stopped before the next `start`.
pub struct Supervisor<T: Trigger, R: ProcessRunner> {
    spec: CommandSpec,
    trigger: T,
    runner: R,
}

impl<T: Trigger, R: ProcessRunner> fmt::Debug for Supervisor<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl<T: Trigger, R: ProcessRunner> Supervisor<T, R> {
    pub fn new(spec: CommandSpec, trigger: T, runner: R) -> Self {
        Self {
            spec,
            trigger,
            runner,
        }
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Main loop. Returns once `cancel` has fired.
    ///
    /// The only error is a command that cannot be started at all; there is
    /// nothing to supervise in that case, so it is handed straight back.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<SupervisorReport> {
        info!(program = %self.spec.display(), "supervisor started");
        let mut report = SupervisorReport::default();

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let iteration = cancel.child_token();
            let mut handle = self.runner.start(&self.spec, iteration.clone())?;
            report.runs += 1;
            debug!(run = report.runs, pgid = handle.pgid(), "waiting for trigger");

            // Wait on the outer token so shutdown always wins over the watch.
            let outcome = self.trigger.wait(cancel).await;

            self.runner.stop(&mut handle);
            iteration.cancel();

            match outcome {
                WaitOutcome::Changed { path } => {
                    report.triggers += 1;
                    info!(path = ?path, run = report.runs, "file changed; restarting");
                }
                WaitOutcome::Elapsed => {
                    report.triggers += 1;
                    info!(run = report.runs, "timer elapsed; restarting");
                }
                WaitOutcome::Cancelled => {
                    debug!(run = report.runs, "wait cancelled");
                }
            }
        }

        info!(runs = report.runs, "supervisor stopped");
        Ok(report)
    }
}
