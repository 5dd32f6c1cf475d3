//! Outstanding-work accounting.
//!
//! Every job pushed to the outbox, and every poll cycle while it runs, holds
//! one `WorkUnit`. Dropping the unit releases it, so each unit is released
//! exactly once no matter how the work ends.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::error;

/// Counter of unresolved work units.
#[derive(Clone)]
pub struct WorkTracker {
    count: Arc<watch::Sender<usize>>,
}

impl WorkTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            count: Arc::new(tx),
        }
    }

    /// Register one unit of outstanding work.
    #[must_use = "the unit is released as soon as it is dropped"]
    pub fn acquire(&self) -> WorkUnit {
        self.count.send_modify(|n| *n += 1);
        WorkUnit {
            tracker: self.clone(),
        }
    }

    /// Units acquired and not yet released.
    pub fn outstanding(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolves when no unit is outstanding.
    pub async fn wait_idle(&self) {
        let mut rx = self.count.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    fn release(&self) {
        self.count.send_modify(|n| match n.checked_sub(1) {
            Some(next) => *n = next,
            None => error!(area = "lifecycle", "work unit released with no outstanding work"),
        });
    }
}

impl Default for WorkTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WorkTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkTracker")
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

/// One unit of outstanding work. Released on drop.
pub struct WorkUnit {
    tracker: WorkTracker,
}

impl WorkUnit {
    /// Release explicitly; same as dropping.
    pub fn complete(self) {}
}

impl Drop for WorkUnit {
    fn drop(&mut self) {
        self.tracker.release();
    }
}

impl fmt::Debug for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WorkUnit")
    }
}
