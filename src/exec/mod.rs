// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `ProcessRunner` trait and `CommandSpec`; the
//!   supervision loop only ever sees the trait, so tests can swap in a fake.
//! - [`handle`] holds `ProcessHandle` and its `Running → Terminating → Idle`
//!   state machine.
//! - [`process_group`] is the real runner: one POSIX process group per run,
//!   killed as a whole on stop.

pub mod backend;
pub mod handle;
pub mod process_group;

pub use backend::{CommandSpec, ProcessRunner};
pub use handle::{ProcessHandle, RunState};
pub use process_group::{ProcessGroupRunner, group_exists, signal_group};
