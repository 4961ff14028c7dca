use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use dux::types::WaitOutcome;
use dux::watch::Trigger;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

/// Sending side of a [`ScriptedTrigger`].
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    tx: mpsc::UnboundedSender<PathBuf>,
}

impl TriggerHandle {
    /// Make the next (or current) `wait` report a change to `path`.
    pub fn fire(&self, path: impl Into<PathBuf>) {
        let _ = self.tx.send(path.into());
    }
}

/// A trigger that fires only when the test says so.
///
/// If every [`TriggerHandle`] is dropped, `wait` blocks until cancelled.
#[derive(Debug)]
pub struct ScriptedTrigger {
    rx: Mutex<mpsc::UnboundedReceiver<PathBuf>>,
}

impl ScriptedTrigger {
    pub fn new() -> (TriggerHandle, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TriggerHandle { tx }, Self { rx: Mutex::new(rx) })
    }
}

impl Trigger for ScriptedTrigger {
    fn wait<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = WaitOutcome> + Send + 'a>> {
        Box::pin(async move {
            let mut rx = self.rx.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => WaitOutcome::Cancelled,
                Some(path) = rx.recv() => WaitOutcome::Changed { path },
            }
        })
    }
}
