// src/watch/detector.rs

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{DuxError, Result};
use crate::fs::{FileSystem, RealFileSystem, walk_files};
use crate::types::WaitOutcome;
use crate::watch::patterns::WatchPatterns;
use crate::watch::poller::{ChangeSignal, PollerExit, poll_file};
use crate::watch::trigger::Trigger;

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Longest accepted poll interval (one day).
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// What to watch and how often to look at it.
#[derive(Debug, Clone)]
pub struct WatchTarget {
    root: PathBuf,
    poll_interval: Duration,
    patterns: WatchPatterns,
}

impl WatchTarget {
    /// Build a target. The poll interval must be non-zero and at most
    /// [`MAX_POLL_INTERVAL`].
    pub fn new(
        root: impl Into<PathBuf>,
        poll_interval: Duration,
        patterns: WatchPatterns,
    ) -> Result<Self> {
        if poll_interval.is_zero() {
            return Err(DuxError::ConfigError(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if poll_interval > MAX_POLL_INTERVAL {
            return Err(DuxError::ConfigError(format!(
                "poll interval {:?} exceeds the maximum of {:?}",
                poll_interval, MAX_POLL_INTERVAL
            )));
        }
        Ok(Self {
            root: root.into(),
            poll_interval,
            patterns,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn patterns(&self) -> &WatchPatterns {
        &self.patterns
    }
}

/// Result of one watch cycle, including how every poller ended.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub outcome: WaitOutcome,
    pub exits: Vec<PollerExit>,
}

impl CycleReport {
    /// Number of pollers that fired the cycle. Never more than one.
    pub fn fired(&self) -> usize {
        self.exits
            .iter()
            .filter(|e| matches!(e, PollerExit::Fired))
            .count()
    }
}

/// Polling change detector over a file tree.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    target: WatchTarget,
    fs: Arc<dyn FileSystem>,
}

impl ChangeDetector {
    pub fn new(target: WatchTarget) -> Self {
        Self::with_filesystem(target, Arc::new(RealFileSystem))
    }

    pub fn with_filesystem(target: WatchTarget, fs: Arc<dyn FileSystem>) -> Self {
        Self { target, fs }
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    /// Files that a cycle started now would watch.
    ///
    /// Walks the tree on the calling thread; async callers should go through
    /// a watch cycle instead, which runs the walk on the blocking pool.
    pub fn watched_files(&self) -> Vec<PathBuf> {
        list_watched(self.fs.as_ref(), &self.target)
    }

    async fn watched_files_blocking(&self) -> Vec<PathBuf> {
        let fs = Arc::clone(&self.fs);
        let target = self.target.clone();
        match tokio::task::spawn_blocking(move || list_watched(fs.as_ref(), &target)).await {
            Ok(files) => files,
            Err(err) => {
                warn!(error = %err, "listing watched files failed; watching nothing");
                Vec::new()
            }
        }
    }

    /// Block until a watched file changes or `cancel` fires.
    pub async fn wait(&self, cancel: &CancellationToken) -> WaitOutcome {
        self.wait_cycle(cancel).await.outcome
    }

    /// Like [`wait`](Self::wait), but also reports how each poller exited.
    pub async fn wait_cycle(&self, cancel: &CancellationToken) -> CycleReport {
        let signal = Arc::new(ChangeSignal::new(cancel.child_token()));
        let files = self.watched_files_blocking().await;
        let interval = self.target.poll_interval();

        debug!(
            root = ?self.target.root(),
            files = files.len(),
            interval = ?interval,
            "starting watch cycle"
        );

        let mut pollers = JoinSet::new();
        for path in files {
            pollers.spawn(poll_file(
                Arc::clone(&self.fs),
                path,
                interval,
                Arc::clone(&signal),
            ));
        }

        // Pollers that hit read errors exit on their own without firing, so
        // the cycle only ends through the token.
        signal.token().cancelled().await;

        let mut exits = Vec::with_capacity(pollers.len());
        while let Some(joined) = pollers.join_next().await {
            match joined {
                Ok(exit) => exits.push(exit),
                Err(err) => warn!(error = %err, "poller task failed"),
            }
        }

        let outcome = match signal.changed_path() {
            Some(path) => {
                info!(path = ?path, "change detected");
                WaitOutcome::Changed { path: path.clone() }
            }
            None => WaitOutcome::Cancelled,
        };

        CycleReport { outcome, exits }
    }
}

fn list_watched(fs: &dyn FileSystem, target: &WatchTarget) -> Vec<PathBuf> {
    let root = target.root();
    match walk_files(fs, root) {
        Ok(files) => target.patterns().filter(root, files),
        Err(err) => {
            warn!(root = ?root, error = %err, "cannot list watch root; watching nothing");
            Vec::new()
        }
    }
}

impl Trigger for ChangeDetector {
    fn wait<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = WaitOutcome> + Send + 'a>> {
        Box::pin(ChangeDetector::wait(self, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use tokio::time::{self, Instant};

    const TICK: Duration = Duration::from_millis(50);

    fn detector(mock: &MockFileSystem, patterns: WatchPatterns) -> ChangeDetector {
        let target = WatchTarget::new(".", TICK, patterns).unwrap();
        ChangeDetector::with_filesystem(target, Arc::new(mock.clone()))
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = WatchTarget::new(".", Duration::ZERO, WatchPatterns::default()).unwrap_err();
        assert!(matches!(err, DuxError::ConfigError(_)));
    }

    #[test]
    fn huge_interval_is_rejected() {
        let err = WatchTarget::new(".", Duration::from_secs(u64::MAX), WatchPatterns::default())
            .unwrap_err();
        assert!(matches!(err, DuxError::ConfigError(_)));
        assert!(WatchTarget::new(".", MAX_POLL_INTERVAL, WatchPatterns::default()).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn single_change_fires_exactly_once() {
        let mock = MockFileSystem::new();
        for name in ["./a.txt", "./b.txt", "./c.txt", "./sub/d.txt"] {
            mock.add_file(name);
        }
        let detector = detector(&mock, WatchPatterns::default());
        let cancel = CancellationToken::new();

        let cycle = {
            let detector = detector.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { detector.wait_cycle(&cancel).await })
        };

        time::sleep(Duration::from_millis(120)).await;
        mock.touch("./sub/d.txt").unwrap();

        let report = cycle.await.unwrap();
        assert_eq!(
            report.outcome,
            WaitOutcome::Changed {
                path: PathBuf::from("./sub/d.txt")
            }
        );
        assert_eq!(report.fired(), 1);
        assert_eq!(report.exits.len(), 4);
        assert!(!cancel.is_cancelled(), "a change must not cancel the parent");
    }

    #[tokio::test(start_paused = true)]
    async fn simultaneous_changes_still_fire_once() {
        let mock = MockFileSystem::new();
        mock.add_file("./a.txt");
        mock.add_file("./b.txt");
        let detector = detector(&mock, WatchPatterns::default());

        let cycle = {
            let detector = detector.clone();
            tokio::spawn(async move { detector.wait_cycle(&CancellationToken::new()).await })
        };

        time::sleep(TICK / 2).await;
        mock.touch("./a.txt").unwrap();
        mock.touch("./b.txt").unwrap();

        let report = cycle.await.unwrap();
        assert!(report.outcome.is_trigger());
        assert_eq!(report.fired(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_tree_waits_for_cancel() {
        let mock = MockFileSystem::new();
        let detector = detector(&mock, WatchPatterns::default());
        let cancel = CancellationToken::new();

        let waited = time::timeout(Duration::from_secs(10), detector.wait(&cancel)).await;
        assert!(waited.is_err(), "wait must not return on its own");

        cancel.cancel();
        assert_eq!(detector.wait(&cancel).await, WaitOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_returns_within_one_interval() {
        let mock = MockFileSystem::new();
        mock.add_file("./a.txt");
        let detector = detector(&mock, WatchPatterns::default());
        let cancel = CancellationToken::new();

        let cycle = {
            let detector = detector.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { detector.wait(&cancel).await })
        };

        time::sleep(TICK * 3).await;
        let fired_at = Instant::now();
        cancel.cancel();

        assert_eq!(cycle.await.unwrap(), WaitOutcome::Cancelled);
        assert!(fired_at.elapsed() <= TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn deleted_file_does_not_count_as_change() {
        let mock = MockFileSystem::new();
        mock.add_file("./keep.txt");
        mock.add_file("./drop.txt");
        let detector = detector(&mock, WatchPatterns::default());
        let cancel = CancellationToken::new();

        let cycle = {
            let detector = detector.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { detector.wait_cycle(&cancel).await })
        };

        time::sleep(TICK / 2).await;
        mock.remove("./drop.txt");
        time::sleep(TICK * 4).await;
        assert!(!cycle.is_finished());

        mock.touch("./keep.txt").unwrap();
        let report = cycle.await.unwrap();
        assert_eq!(
            report.outcome,
            WaitOutcome::Changed {
                path: PathBuf::from("./keep.txt")
            }
        );
        assert!(report.exits.contains(&PollerExit::Vanished));
    }

    #[tokio::test(start_paused = true)]
    async fn excluded_files_are_not_watched() {
        let mock = MockFileSystem::new();
        mock.add_file("./src/main.rs");
        mock.add_file("./target/out.bin");
        let patterns = WatchPatterns::new(&[], &["target/**".to_string()]).unwrap();
        let detector = detector(&mock, patterns);

        assert_eq!(detector.watched_files(), vec![PathBuf::from("./src/main.rs")]);

        let cancel = CancellationToken::new();
        let cycle = {
            let detector = detector.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { detector.wait(&cancel).await })
        };

        time::sleep(TICK / 2).await;
        mock.touch("./target/out.bin").unwrap();
        time::sleep(TICK * 4).await;
        assert!(!cycle.is_finished());

        cancel.cancel();
        assert_eq!(cycle.await.unwrap(), WaitOutcome::Cancelled);
    }

    /// Records which threads listed directories.
    #[derive(Debug)]
    struct ThreadTracking {
        inner: MockFileSystem,
        listed_on: std::sync::Mutex<Vec<std::thread::ThreadId>>,
    }

    impl FileSystem for ThreadTracking {
        fn is_file(&self, path: &Path) -> bool {
            self.inner.is_file(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.inner.is_dir(path)
        }

        fn is_symlink(&self, path: &Path) -> bool {
            self.inner.is_symlink(path)
        }

        fn read_dir(&self, path: &Path) -> anyhow::Result<Vec<PathBuf>> {
            self.listed_on
                .lock()
                .unwrap()
                .push(std::thread::current().id());
            self.inner.read_dir(path)
        }

        fn modified(&self, path: &Path) -> anyhow::Result<std::time::SystemTime> {
            self.inner.modified(path)
        }
    }

    #[tokio::test]
    async fn cycle_walks_the_tree_off_the_runtime_thread() {
        let mock = MockFileSystem::new();
        mock.add_file("./src/lib.rs");
        let tracking = Arc::new(ThreadTracking {
            inner: mock,
            listed_on: std::sync::Mutex::new(Vec::new()),
        });
        let target = WatchTarget::new(".", TICK, WatchPatterns::default()).unwrap();
        let detector = ChangeDetector::with_filesystem(target, tracking.clone());

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(detector.wait(&cancel).await, WaitOutcome::Cancelled);

        let runtime_thread = std::thread::current().id();
        let listed_on = tracking.listed_on.lock().unwrap();
        assert!(!listed_on.is_empty());
        assert!(listed_on.iter().all(|id| *id != runtime_thread));
    }

    #[tokio::test]
    async fn missing_root_watches_nothing() {
        let mock = MockFileSystem::new();
        let target = WatchTarget::new("./absent", TICK, WatchPatterns::default()).unwrap();
        let detector = ChangeDetector::with_filesystem(target, Arc::new(mock));

        assert!(detector.watched_files().is_empty());
    }
}
