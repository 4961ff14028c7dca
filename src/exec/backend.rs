// src/exec/backend.rs

//! Pluggable process runner abstraction.
//!
//! The supervision loop talks to a `ProcessRunner` instead of spawning
//! processes itself. Production code uses
//! [`ProcessGroupRunner`](super::ProcessGroupRunner); tests can provide a
//! runner that only records what it was asked to do.

use tokio_util::sync::CancellationToken;

use crate::errors::Result;
use crate::types::StopSignal;

use super::handle::ProcessHandle;

/// The command to supervise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stop_signal: StopSignal,
}

impl CommandSpec {
    pub fn new<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            stop_signal: StopSignal::default(),
        }
    }

    pub fn with_stop_signal(mut self, stop_signal: StopSignal) -> Self {
        self.stop_signal = stop_signal;
        self
    }

    /// `program arg1 arg2`, for logs and dry runs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Starts and stops the supervised command.
pub trait ProcessRunner: Send {
    /// Launch `spec` as the leader of a new process group.
    ///
    /// `scope` is cancelled by the caller when this run is over; runners may
    /// hang cleanup work off it.
    fn start(&mut self, spec: &CommandSpec, scope: CancellationToken) -> Result<ProcessHandle>;

    /// Terminate the whole group behind `handle`.
    ///
    /// Must be a no-op for handles that are already stopped, and must never
    /// fail because the group is already gone.
    fn stop(&mut self, handle: &mut ProcessHandle);
}
