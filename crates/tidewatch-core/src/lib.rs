//! tidewatch-core
//!
//! Polls a value source on a fixed cadence and notifies every subscribed
//! recipient whose last-reported value differs, through a bounded outbox with
//! retried webhook delivery.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（recipient, notification job, message, errors）
//! - **ports**: 抽象化レイヤー（ValueFetcher, Transport, ContentSource, Clock）
//! - **store**: 購読者レコードの永続化
//! - **outbox**: 配送キュー・リトライ・worker
//! - **lifecycle**: 停止シグナルと未完了作業のカウント
//! - **app**: エンジン（builder, poll loop, handle）
//! - **impls**: ports の実装（HTTP, インメモリ）

pub mod app;
pub mod domain;
pub mod impls;
pub mod lifecycle;
pub mod outbox;
pub mod ports;
pub mod store;

pub use app::{CycleOutcome, Engine, EngineBuilder, EngineConfig, EngineHandle, RunningEngine};
pub use domain::{EngineError, LogContext, MessageTemplate, NotificationJob, Recipient, RecipientId};
pub use outbox::{DeliveryCounts, RetryPolicy};
