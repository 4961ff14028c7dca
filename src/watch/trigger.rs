// src/watch/trigger.rs

//! The seam between "what causes a restart" and the loops that restart things.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::types::WaitOutcome;

/// Something that blocks until a restart is wanted or `cancel` fires.
///
/// Production code uses [`ChangeDetector`](crate::watch::ChangeDetector);
/// tests can plug in a scripted implementation instead.
pub trait Trigger: Send + Sync {
    fn wait<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = WaitOutcome> + Send + 'a>>;
}

/// Trigger that fires a fixed delay after each `wait` begins.
#[derive(Debug, Clone, Copy)]
pub struct TimeTrigger {
    delay: Duration,
}

impl TimeTrigger {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Trigger for TimeTrigger {
    fn wait<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = WaitOutcome> + Send + 'a>> {
        let delay = self.delay;
        Box::pin(async move {
            tokio::select! {
                _ = cancel.cancelled() => WaitOutcome::Cancelled,
                _ = tokio::time::sleep(delay) => WaitOutcome::Elapsed,
            }
        })
    }
}
