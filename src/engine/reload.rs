// src/engine/reload.rs

//! In-process counterpart of the supervisor: instead of an OS process, a
//! function is re-invoked every time the trigger fires, and whatever it
//! returned last time is closed first.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::watch::Trigger;

/// A value that must be shut down before its producer runs again.
pub trait Closer {
    fn close(self);
}

/// Calls `func`, waits on `trigger`, closes the result, repeats.
pub struct Reloader<F, T> {
    func: F,
    trigger: T,
}

impl<F, C, T> Reloader<F, T>
where
    F: FnMut() -> C + Send,
    C: Closer + Send,
    T: Trigger,
{
    pub fn new(func: F, trigger: T) -> Self {
        Self { func, trigger }
    }

    /// Returns the number of times `func` was invoked once `cancel` fires.
    pub async fn run(&mut self, cancel: &CancellationToken) -> usize {
        let mut invocations = 0;

        while !cancel.is_cancelled() {
            let value = (self.func)();
            invocations += 1;

            let outcome = self.trigger.wait(cancel).await;
            value.close();
            debug!(invocations, outcome = ?outcome, "closed reloaded value");
        }

        invocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::TimeTrigger;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Tracked(Arc<AtomicUsize>);

    impl Closer for Tracked {
        fn close(self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn every_invocation_is_closed() {
        let closed = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(250)).await;
                cancel.cancel();
            });
        }

        let closed_by_func = Arc::clone(&closed);
        let mut reloader = Reloader::new(
            move || Tracked(Arc::clone(&closed_by_func)),
            TimeTrigger::new(Duration::from_millis(100)),
        );

        let invocations = reloader.run(&cancel).await;

        assert_eq!(invocations, 3);
        assert_eq!(closed.load(Ordering::SeqCst), 3);
    }
}
