// src/watch/poller.rs

//! Per-file polling task.
//!
//! Each watched file gets its own poller. A poller remembers the modification
//! time it saw first and re-reads it every tick; the first poller to see a
//! difference claims the cycle's [`ChangeSignal`] and fires the cycle token,
//! which stops every sibling.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, SystemTime};

use anyhow::Result;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::fs::FileSystem;

/// A file's path and the modification times observed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: PathBuf,
    initial: SystemTime,
    last_seen: SystemTime,
}

impl FileRecord {
    /// Read the current modification time of `path`.
    pub fn observe(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let modified = fs.modified(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            initial: modified,
            last_seen: modified,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn initial(&self) -> SystemTime {
        self.initial
    }

    pub fn last_seen(&self) -> SystemTime {
        self.last_seen
    }

    /// Re-read the modification time. Returns true when it no longer matches
    /// the value captured when the record was created.
    pub fn refresh(&mut self, fs: &dyn FileSystem) -> Result<bool> {
        self.last_seen = fs.modified(&self.path)?;
        Ok(self.last_seen != self.initial)
    }
}

/// One-shot "something changed" signal shared by all pollers of a cycle.
#[derive(Debug)]
pub struct ChangeSignal {
    token: CancellationToken,
    first: OnceLock<PathBuf>,
}

impl ChangeSignal {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            first: OnceLock::new(),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Record `path` as the cause and fire the token.
    ///
    /// Returns true only for the first caller; later callers change nothing.
    pub fn fire(&self, path: PathBuf) -> bool {
        let won = self.first.set(path).is_ok();
        self.token.cancel();
        won
    }

    /// The path recorded by the winning [`fire`](Self::fire), if any.
    pub fn changed_path(&self) -> Option<&PathBuf> {
        self.first.get()
    }
}

/// How a poller ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerExit {
    /// This poller saw the change first and fired the cycle.
    Fired,
    /// This poller saw a change but a sibling had already fired.
    Outraced,
    /// The cycle token fired (sibling change or caller cancellation).
    Cancelled,
    /// A metadata read failed mid-watch (usually a deleted file).
    Vanished,
    /// The first metadata read failed; the file was never monitored.
    Unreadable,
}

/// Watch a single file until it changes, disappears, or the cycle fires.
pub async fn poll_file(
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    interval: Duration,
    signal: Arc<ChangeSignal>,
) -> PollerExit {
    let mut record = match FileRecord::observe(fs.as_ref(), &path) {
        Ok(record) => record,
        Err(err) => {
            debug!(path = ?path, error = %err, "initial metadata read failed; not watching file");
            return PollerExit::Unreadable;
        }
    };

    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = signal.token().cancelled() => {
                trace!(path = ?record.path(), "poller cancelled");
                return PollerExit::Cancelled;
            }

            _ = ticker.tick() => match record.refresh(fs.as_ref()) {
                Ok(false) => {}
                Ok(true) => {
                    let path = record.path().to_path_buf();
                    if signal.fire(path) {
                        debug!(
                            path = ?record.path(),
                            initial = ?record.initial(),
                            now = ?record.last_seen(),
                            "modification time changed"
                        );
                        return PollerExit::Fired;
                    }
                    return PollerExit::Outraced;
                }
                Err(err) => {
                    warn!(path = ?record.path(), error = %err, "stopped watching file");
                    return PollerExit::Vanished;
                }
            },
        }
    }
}
