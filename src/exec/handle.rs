// src/exec/handle.rs

use crate::types::StopSignal;

/// Lifecycle of a supervised process group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Terminating,
    Idle,
}

/// Identity of one started command: the id of the process group it leads.
///
/// Handles are not `Clone`; exactly one owner can stop a group.
#[derive(Debug, PartialEq, Eq)]
pub struct ProcessHandle {
    pgid: i32,
    stop_signal: StopSignal,
    state: RunState,
}

impl ProcessHandle {
    /// A handle for a freshly started group.
    pub fn new(pgid: i32) -> Self {
        Self {
            pgid,
            stop_signal: StopSignal::default(),
            state: RunState::Running,
        }
    }

    pub fn with_stop_signal(mut self, stop_signal: StopSignal) -> Self {
        self.stop_signal = stop_signal;
        self
    }

    pub fn pgid(&self) -> i32 {
        self.pgid
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop_signal
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// `Running → Terminating`. Returns false (and changes nothing) in any
    /// other state, which is what makes stopping idempotent.
    pub fn begin_termination(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        self.state = RunState::Terminating;
        true
    }

    /// `Terminating → Idle`.
    pub fn finish_termination(&mut self) {
        if self.state == RunState::Terminating {
            self.state = RunState::Idle;
        }
    }
}
