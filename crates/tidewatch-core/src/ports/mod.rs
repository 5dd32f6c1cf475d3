//! Ports - 外部コラボレータの抽象化
//!
//! エンジンは具体的な取得元・配送先・文面生成を知らない。
//! 各 trait は差し替え可能な境界（テストではインメモリ実装を使う）。
//!
//! - **ValueFetcher**: 監視対象の値を 1 つ取得する
//! - **Transport**: エンドポイントへ payload を配送する
//! - **ContentSource**: 通知に添える補助テキストを選ぶ
//! - **Clock**: 現在時刻（バックアップ名のタイムスタンプ用）

pub mod clock;
pub mod content;
pub mod fetcher;
pub mod transport;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::content::ContentSource;
pub use self::fetcher::ValueFetcher;
pub use self::transport::Transport;
