//! Bounded FIFO of notification jobs.
//!
//! Each entry carries the `WorkUnit` registered when it was produced. The
//! unit travels with the job and is released when the worker is done with it
//! (or when the entry is dropped for any other reason).

use tokio::sync::mpsc;

use crate::domain::{EngineError, NotificationJob};
use crate::lifecycle::WorkUnit;

/// Default queue capacity.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// A job plus its outstanding-work registration.
#[derive(Debug)]
pub struct QueuedJob {
    pub job: NotificationJob,
    pub unit: WorkUnit,
}

/// Producer handle. Clone it for every producer.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::Sender<QueuedJob>,
}

/// Consumer handle. There is exactly one.
#[derive(Debug)]
pub struct OutboxReceiver {
    rx: mpsc::Receiver<QueuedJob>,
}

impl Outbox {
    pub fn bounded(capacity: usize) -> (Outbox, OutboxReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (Outbox { tx }, OutboxReceiver { rx })
    }

    /// Push a job. Waits while the queue is full.
    pub async fn push(&self, job: NotificationJob, unit: WorkUnit) -> Result<(), EngineError> {
        self.tx
            .send(QueuedJob { job, unit })
            .await
            // the rejected entry (and its unit) is dropped here
            .map_err(|_| EngineError::OutboxClosed)
    }

    /// Jobs waiting to be picked up.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

impl OutboxReceiver {
    /// Next job in FIFO order; `None` once every producer is gone and the queue is empty.
    pub async fn pop(&mut self) -> Option<QueuedJob> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LogContext;
    use crate::lifecycle::WorkTracker;
    use std::time::Duration;

    fn job(body: &str) -> NotificationJob {
        NotificationJob::new("https://hooks.example", body, "", LogContext::new())
    }

    #[tokio::test]
    async fn push_pop_is_fifo() {
        let tracker = WorkTracker::new();
        let (outbox, mut rx) = Outbox::bounded(8);
        for body in ["a", "b", "c"] {
            outbox.push(job(body), tracker.acquire()).await.unwrap();
        }
        assert_eq!(outbox.pending(), 3);

        let bodies: Vec<String> = vec![
            rx.pop().await.unwrap().job.body().to_string(),
            rx.pop().await.unwrap().job.body().to_string(),
            rx.pop().await.unwrap().job.body().to_string(),
        ];
        assert_eq!(bodies, vec!["a", "b", "c"]);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test]
    async fn full_queue_makes_producer_wait() {
        let tracker = WorkTracker::new();
        let (outbox, mut rx) = Outbox::bounded(1);
        outbox.push(job("first"), tracker.acquire()).await.unwrap();

        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            outbox.push(job("second"), tracker.acquire()),
        )
        .await;
        assert!(blocked.is_err(), "push should wait while the queue is full");

        let _ = rx.pop().await.unwrap();
        outbox.push(job("third"), tracker.acquire()).await.unwrap();
        assert_eq!(rx.pop().await.unwrap().job.body(), "third");
    }

    #[tokio::test]
    async fn push_to_closed_outbox_releases_unit() {
        let tracker = WorkTracker::new();
        let (outbox, rx) = Outbox::bounded(4);
        drop(rx);

        let err = outbox.push(job("late"), tracker.acquire()).await.unwrap_err();
        assert!(matches!(err, EngineError::OutboxClosed));
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test]
    async fn pop_ends_when_producers_are_gone() {
        let (outbox, mut rx) = Outbox::bounded(4);
        drop(outbox);
        assert!(rx.pop().await.is_none());
    }
}
