//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **HttpTransport**: webhook へ JSON を POST する（本番用）
//! - **JsonPointerFetcher**: JSON API から値を 1 つ取り出す（本番用）
//! - **QuipBook**: 補助テキストをランダムに選ぶ
//! - **inmem**: テスト・開発用のインメモリ実装

pub mod http_fetcher;
pub mod http_transport;
pub mod inmem;
pub mod quips;

pub use self::http_fetcher::JsonPointerFetcher;
pub use self::http_transport::HttpTransport;
pub use self::inmem::{FixedContent, RecordingTransport, ScriptedFetcher};
pub use self::quips::QuipBook;
