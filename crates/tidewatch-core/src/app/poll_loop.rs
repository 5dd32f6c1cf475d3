//! PollLoop - 定期取得と差分通知
//!
//! # フロー（1 サイクル）
//! 1. quit シグナルを確認（立っていれば終了）
//! 2. ValueFetcher::fetch()（失敗、または有限でない値ならログだけ出して sleep へ）
//! 3. ロックを取り current_value を更新
//! 4. 値が変わった購読者ごとにジョブを作り Outbox へ push、baseline を先に進める
//! 5. 変更があれば store を保存（ロック内）
//! 6. poll_interval だけ sleep

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use super::state::EngineContext;
use crate::domain::{LogContext, NotificationJob};
use crate::lifecycle::ShutdownListener;
use crate::ports::ValueFetcher;

/// What one cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Quit signal was set; nothing was fetched.
    Stopped,
    /// Fetch failed; state untouched.
    FetchFailed,
    /// Every recipient already had this value.
    Unchanged,
    /// `jobs` notifications were enqueued; `saved` is false if persisting failed.
    Notified { jobs: usize, saved: bool },
}

pub struct PollLoop {
    ctx: Arc<EngineContext>,
    fetcher: Arc<dyn ValueFetcher>,
    interval: Duration,
    shutdown: ShutdownListener,
}

impl PollLoop {
    pub(crate) fn new(
        ctx: Arc<EngineContext>,
        fetcher: Arc<dyn ValueFetcher>,
        interval: Duration,
    ) -> Self {
        let shutdown = ctx.shutdown.subscribe();
        Self {
            ctx,
            fetcher,
            interval,
            shutdown,
        }
    }

    /// Run cycles until the quit signal is seen at the top of one.
    pub async fn run(mut self) {
        loop {
            if self.run_cycle().await == CycleOutcome::Stopped {
                break;
            }
            // wake early on quit; the next cycle's check then stops the loop
            let mut shutdown = self.shutdown.clone();
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.triggered() => {}
            }
        }
    }

    /// One fetch-diff-enqueue-persist pass.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        // the cycle itself counts as outstanding work while it runs
        let _cycle = self.ctx.work.acquire();

        if self.shutdown.is_triggered() {
            info!(area = "poll", "received quit signal, stopping poll loop");
            return CycleOutcome::Stopped;
        }

        let value = match self.fetcher.fetch().await {
            Ok(value) if value.is_finite() => value,
            Ok(value) => {
                // NaN never equals a baseline and is stored as null
                error!(area = "fetch", value, "fetched value is not a finite number");
                return CycleOutcome::FetchFailed;
            }
            Err(e) => {
                error!(area = "fetch", error = %e, "error fetching value");
                return CycleOutcome::FetchFailed;
            }
        };
        debug!(area = "data", value, "value fetched");

        let ctx = &self.ctx;
        let mut state = ctx.state.lock().await;
        state.current_value = value;

        let mut jobs = 0;
        for recipient in state.store.iter_mut() {
            if !recipient.needs_update(value) {
                debug!(
                    area = "data",
                    recipient = %recipient.id,
                    value,
                    "value unchanged for recipient"
                );
                continue;
            }

            let message = ctx.template.change_message(value, recipient.baseline());
            let content = ctx.content.next_content();
            let context = LogContext::new()
                .with("area", "notify")
                .with("recipient", &recipient.id)
                .with("recipient_name", &recipient.display_name)
                .with("previous", recipient.last_reported_value)
                .with("value", value)
                .with("message", &message);
            let job = NotificationJob::new(&recipient.endpoint, message, content, context);

            if let Err(e) = ctx.outbox.push(job, ctx.work.acquire()).await {
                error!(
                    area = "notify",
                    recipient = %recipient.id,
                    error = %e,
                    "could not enqueue notification"
                );
                continue;
            }

            // assume the message gets through and move the baseline now
            recipient.last_reported_value = value;
            jobs += 1;
        }

        if jobs == 0 {
            return CycleOutcome::Unchanged;
        }

        info!(area = "db", jobs, "saving recipient data");
        let saved = match state.store.save(&ctx.data_file, ctx.clock.as_ref()) {
            Ok(()) => true,
            Err(e) => {
                error!(area = "db", error = %e, "error saving recipient data");
                false
            }
        };
        CycleOutcome::Notified { jobs, saved }
    }
}
