#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dux::config::{RawConfig, Settings};
use dux::engine::Closer;
use dux::types::StopSignal;

/// Builder for `Settings` to simplify test setup.
pub struct SettingsBuilder {
    raw: RawConfig,
}

impl SettingsBuilder {
    /// Start from a bare command watching `root`.
    pub fn new(program: &str, root: impl AsRef<Path>) -> Self {
        let mut raw = RawConfig::default();
        raw.command.program = Some(program.to_string());
        raw.watch.root = Some(root.as_ref().to_path_buf());
        Self { raw }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.raw.command.args.push(arg.to_string());
        self
    }

    pub fn poll_interval(mut self, interval: &str) -> Self {
        self.raw.watch.poll_interval = Some(interval.to_string());
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.raw.watch.include.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.raw.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn stop_signal(mut self, signal: StopSignal) -> Self {
        self.raw.command.stop_signal = Some(signal);
        self
    }

    pub fn raw(self) -> RawConfig {
        self.raw
    }

    pub fn build(self) -> Settings {
        Settings::try_from(self.raw).expect("Failed to build valid settings from builder")
    }
}

/// A [`Closer`] that bumps a shared counter when closed.
#[derive(Debug)]
pub struct CountingCloser(Arc<AtomicUsize>);

impl CountingCloser {
    pub fn new(closed: &Arc<AtomicUsize>) -> Self {
        Self(Arc::clone(closed))
    }
}

impl Closer for CountingCloser {
    fn close(self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
