//! OutboxWorker - 配送ループ
//!
//! # フロー
//! 1. OutboxReceiver::pop() でジョブを 1 件取得（FIFO）
//! 2. RetryPolicy に従って Transport::deliver() を試行
//! 3. 成功 or 試行回数切れでジョブを捨て、WorkUnit を解放
//!
//! ワーカーは 1 本だけ。同時に処理するジョブは常に 1 件。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, error, info, info_span};

use super::queue::{OutboxReceiver, QueuedJob};
use super::retry::RetryPolicy;
use crate::lifecycle::ShutdownListener;
use crate::ports::Transport;

/// Final outcome counts, returned when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryCounts {
    pub delivered: usize,
    pub exhausted: usize,
}

pub struct OutboxWorker {
    rx: OutboxReceiver,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    halt: ShutdownListener,
    counts: DeliveryCounts,
}

impl OutboxWorker {
    /// `halt` is raised by the engine once all outstanding work is resolved;
    /// the worker also stops when every producer handle is dropped.
    pub fn new(
        rx: OutboxReceiver,
        transport: Arc<dyn Transport>,
        retry: RetryPolicy,
        halt: ShutdownListener,
    ) -> Self {
        Self {
            rx,
            transport,
            retry,
            halt,
            counts: DeliveryCounts::default(),
        }
    }

    pub async fn run(mut self) -> DeliveryCounts {
        loop {
            let mut halt = self.halt.clone();
            let next = tokio::select! {
                // drain before honoring halt
                biased;
                next = self.rx.pop() => next,
                _ = halt.triggered() => None,
            };
            let Some(queued) = next else {
                break;
            };
            self.process(queued).await;
        }
        info!(
            area = "outbox",
            delivered = self.counts.delivered,
            exhausted = self.counts.exhausted,
            "outbox worker stopped"
        );
        self.counts
    }

    /// Deliver one job with retries, then release its work unit.
    pub async fn process(&mut self, queued: QueuedJob) {
        let QueuedJob { job, unit } = queued;
        let span = info_span!("delivery", area = "outbox", job = %job.context());

        let transport = &self.transport;
        let (endpoint, payload) = (job.endpoint(), job.payload());
        let result = async {
            debug!(endpoint, "sending message");
            self.retry
                .run(|_attempt| transport.deliver(endpoint, payload))
                .await
        }
        .instrument(span.clone())
        .await;

        let _entered = span.enter();
        match result {
            Ok(response) => {
                self.counts.delivered += 1;
                debug!(response = %String::from_utf8_lossy(&response), "delivery response");
                info!("sent message");
            }
            Err(exhausted) => {
                self.counts.exhausted += 1;
                error!(
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    "giving up on message"
                );
            }
        }
        unit.complete();
    }
}
