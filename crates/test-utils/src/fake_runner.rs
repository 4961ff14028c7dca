use std::sync::{Arc, Mutex};

use dux::errors::{DuxError, Result};
use dux::exec::{CommandSpec, ProcessHandle, ProcessRunner};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct LogInner {
    started: Vec<i32>,
    stopped: Vec<i32>,
    live: usize,
    max_live: usize,
    scopes: Vec<CancellationToken>,
}

/// Shared record of everything a [`FakeRunner`] was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RunnerLog {
    inner: Arc<Mutex<LogInner>>,
}

impl RunnerLog {
    pub fn starts(&self) -> usize {
        self.inner.lock().unwrap().started.len()
    }

    pub fn stops(&self) -> usize {
        self.inner.lock().unwrap().stopped.len()
    }

    /// Handles started but not yet stopped.
    pub fn live(&self) -> usize {
        self.inner.lock().unwrap().live
    }

    /// Highest number of simultaneously live handles ever seen.
    pub fn max_live(&self) -> usize {
        self.inner.lock().unwrap().max_live
    }

    /// True once every per-run scope handed to `start` has been cancelled.
    pub fn all_scopes_cancelled(&self) -> bool {
        self.inner
            .lock()
            .unwrap()
            .scopes
            .iter()
            .all(CancellationToken::is_cancelled)
    }
}

/// A runner that never spawns anything.
///
/// - records which fake pgids were started and stopped
/// - can be told to fail on the n-th start (1-based)
#[derive(Debug, Default)]
pub struct FakeRunner {
    log: RunnerLog,
    next_pgid: i32,
    fail_on_start: Option<usize>,
}

impl FakeRunner {
    pub fn new() -> (Self, RunnerLog) {
        let runner = Self {
            next_pgid: 1000,
            ..Self::default()
        };
        let log = runner.log.clone();
        (runner, log)
    }

    pub fn failing_on_start(mut self, nth: usize) -> Self {
        self.fail_on_start = Some(nth);
        self
    }
}

impl ProcessRunner for FakeRunner {
    fn start(&mut self, spec: &CommandSpec, scope: CancellationToken) -> Result<ProcessHandle> {
        let mut inner = self.log.inner.lock().unwrap();

        if self.fail_on_start == Some(inner.started.len() + 1) {
            return Err(DuxError::Spawn {
                program: spec.program.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        self.next_pgid += 1;
        inner.started.push(self.next_pgid);
        inner.live += 1;
        inner.max_live = inner.max_live.max(inner.live);
        inner.scopes.push(scope);

        Ok(ProcessHandle::new(self.next_pgid).with_stop_signal(spec.stop_signal))
    }

    fn stop(&mut self, handle: &mut ProcessHandle) {
        if !handle.begin_termination() {
            return;
        }
        let mut inner = self.log.inner.lock().unwrap();
        inner.stopped.push(handle.pgid());
        inner.live -= 1;
        handle.finish_termination();
    }
}
