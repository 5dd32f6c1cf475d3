//! Engine - 起動・停止と問い合わせ窓口
//!
//! - `Engine`: 組み立て済みで未起動。`run_cycle()` で 1 サイクルだけ手動実行できる
//! - `RunningEngine`: poll loop と outbox worker が動いている状態。`stop()` で止める
//! - `EngineHandle`: HTTP 層などから呼ぶ窓口（clone して配れる）

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::poll_loop::{CycleOutcome, PollLoop};
use super::state::EngineContext;
use crate::domain::{EngineError, LogContext, NotificationJob, Recipient, RecipientId};
use crate::lifecycle::ShutdownSignal;
use crate::outbox::{DeliveryCounts, OutboxWorker};

/// Built but not yet running.
pub struct Engine {
    handle: EngineHandle,
    poll: PollLoop,
    worker: OutboxWorker,
    halt: ShutdownSignal,
}

impl Engine {
    pub(crate) fn new(
        ctx: Arc<EngineContext>,
        poll: PollLoop,
        worker: OutboxWorker,
        halt: ShutdownSignal,
    ) -> Self {
        Self {
            handle: EngineHandle { ctx },
            poll,
            worker,
            halt,
        }
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Run a single poll cycle on the caller's task.
    ///
    /// Jobs it produces stay queued until the engine is started.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.poll.run_cycle().await
    }

    /// Launch the poll loop and the outbox worker.
    pub fn start(self) -> RunningEngine {
        let recipients = self
            .handle
            .ctx
            .state
            .try_lock()
            .map(|s| s.store.len())
            .unwrap_or_default();
        info!(recipients, "starting engine");
        let worker_task = tokio::spawn(self.worker.run());
        let poll_task = tokio::spawn(self.poll.run());
        RunningEngine {
            handle: self.handle,
            halt: self.halt,
            poll_task: Some(poll_task),
            worker_task,
        }
    }

    /// Launch only the outbox worker, with the quit signal already set.
    ///
    /// No further poll cycle runs; `stop()` returns once the jobs queued so far
    /// (for example by `run_cycle`) are resolved.
    pub fn start_draining(self) -> RunningEngine {
        self.handle.ctx.shutdown.trigger();
        info!(pending = self.handle.pending_jobs(), "draining outbox");
        let worker_task = tokio::spawn(self.worker.run());
        RunningEngine {
            handle: self.handle,
            halt: self.halt,
            poll_task: None,
            worker_task,
        }
    }
}

/// Poll loop and outbox worker are running.
pub struct RunningEngine {
    handle: EngineHandle,
    halt: ShutdownSignal,
    poll_task: Option<JoinHandle<()>>,
    worker_task: JoinHandle<DeliveryCounts>,
}

impl RunningEngine {
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Signal quit and wait until every outstanding unit of work is resolved.
    ///
    /// Returns the outbox worker's delivery counts.
    pub async fn stop(self) -> DeliveryCounts {
        let ctx = &self.handle.ctx;
        ctx.shutdown.trigger();
        info!(outstanding = ctx.work.outstanding(), "waiting for all work to be done");
        ctx.work.wait_idle().await;

        // nothing is queued any more; let the worker go
        self.halt.trigger();

        if let Some(poll_task) = self.poll_task {
            if let Err(e) = poll_task.await {
                error!(error = %e, "poll loop task failed");
            }
        }
        let counts = match self.worker_task.await {
            Ok(counts) => counts,
            Err(e) => {
                error!(error = %e, "outbox worker task failed");
                DeliveryCounts::default()
            }
        };
        info!("work is done");
        counts
    }
}

/// Inbound operations: query, reply, register.
#[derive(Clone)]
pub struct EngineHandle {
    ctx: Arc<EngineContext>,
}

impl EngineHandle {
    /// Last successfully fetched value (zero before the first fetch).
    pub async fn current_value(&self) -> f64 {
        self.ctx.state.lock().await.current_value
    }

    /// Answer a query: read the current value and, after `reply_delay`, enqueue
    /// a status message to `response_url`.
    ///
    /// One unit of work is registered right away so `stop()` waits for the reply.
    pub async fn reply_to(
        &self,
        response_url: impl Into<String>,
        context: LogContext,
    ) -> Result<f64, EngineError> {
        let unit = self.ctx.work.acquire();
        if self.ctx.shutdown.is_triggered() {
            return Err(EngineError::ShuttingDown);
        }

        let value = self.current_value().await;
        let body = self.ctx.template.status_message(value);
        let job = NotificationJob::new(
            response_url,
            body,
            self.ctx.content.next_content(),
            context.with("area", "query").with("value", value),
        );
        info!(area = "query", value, job = %job.id(), "received query");

        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            tokio::time::sleep(ctx.reply_delay).await;
            let id = job.id();
            if let Err(e) = ctx.outbox.push(job, unit).await {
                error!(area = "query", job = %id, error = %e, "could not enqueue reply");
            }
        });
        Ok(value)
    }

    /// Add or overwrite a recipient and persist the store immediately.
    ///
    /// A failed save is returned, but the recipient stays registered in memory
    /// and is written by the next successful save.
    pub async fn register_recipient(&self, recipient: Recipient) -> Result<(), EngineError> {
        if self.ctx.shutdown.is_triggered() {
            return Err(EngineError::ShuttingDown);
        }
        recipient.validate()?;

        let id = recipient.id.clone();
        let mut state = self.ctx.state.lock().await;
        if state.store.upsert(recipient).is_some() {
            warn!(area = "db", recipient = %id, "replaced existing recipient");
        } else {
            info!(area = "db", recipient = %id, "registered recipient");
        }
        state
            .store
            .save(&self.ctx.data_file, self.ctx.clock.as_ref())
            .map_err(EngineError::from)
    }

    pub async fn recipient(&self, id: &RecipientId) -> Option<Recipient> {
        self.ctx.state.lock().await.store.get(id).cloned()
    }

    pub async fn recipients(&self) -> Vec<Recipient> {
        self.ctx.state.lock().await.store.iter().cloned().collect()
    }

    /// Units of work not yet resolved.
    pub fn outstanding_work(&self) -> usize {
        self.ctx.work.outstanding()
    }

    /// Jobs sitting in the outbox.
    pub fn pending_jobs(&self) -> usize {
        self.ctx.outbox.pending()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.ctx.shutdown.is_triggered()
    }

    #[cfg(test)]
    pub(crate) fn ctx_for_tests(&self) -> &EngineContext {
        &self.ctx
    }
}
