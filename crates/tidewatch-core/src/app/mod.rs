//! App - アプリケーション層
//!
//! ports・store・outbox・lifecycle を組み合わせてエンジンを実装します。
//!
//! # 主要コンポーネント
//! - **EngineBuilder**: 構築とワイヤリング（起動時検証）
//! - **Engine / RunningEngine**: 起動と停止
//! - **EngineHandle**: 問い合わせ・返信・購読登録
//! - **PollLoop**: 定期取得と差分通知

pub mod builder;
pub mod config;
pub mod engine;
pub mod poll_loop;
pub mod state;

pub use self::builder::{BuildError, EngineBuilder};
pub use self::config::EngineConfig;
pub use self::engine::{Engine, EngineHandle, RunningEngine};
pub use self::poll_loop::{CycleOutcome, PollLoop};
pub use self::state::SharedState;
