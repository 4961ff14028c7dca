// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling `include` / `exclude` glob patterns for the watched tree.
//! - Polling every watched file's modification time, one task per file.
//! - The [`Trigger`] abstraction that the supervision loops wait on.
//!
//! There is no OS-level notification here; everything is polled.

pub mod detector;
pub mod patterns;
pub mod poller;
pub mod trigger;

pub use detector::{ChangeDetector, CycleReport, DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL, WatchTarget};
pub use patterns::WatchPatterns;
pub use poller::{ChangeSignal, FileRecord, PollerExit};
pub use trigger::{TimeTrigger, Trigger};
