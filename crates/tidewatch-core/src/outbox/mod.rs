//! Outbox - 通知ジョブの非同期配送
//!
//! - **Outbox / OutboxReceiver**: 容量制限付き FIFO（満杯なら push 側が待つ）
//! - **OutboxWorker**: 単一の消費者。リトライ付きで配送する
//! - **RetryPolicy**: 再試行回数と待ち時間の方針

mod queue;
mod retry;
mod worker;

pub use queue::{DEFAULT_CAPACITY, Outbox, OutboxReceiver, QueuedJob};
pub use retry::{RetryExhausted, RetryPolicy};
pub use worker::{DeliveryCounts, OutboxWorker};
