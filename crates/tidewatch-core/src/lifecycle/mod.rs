//! Lifecycle - 停止シグナルと未完了作業のカウント
//!
//! - `ShutdownSignal`: quit フラグ（poll loop が各サイクルの先頭で確認する）
//! - `WorkTracker` / `WorkUnit`: 未完了作業の数。`Engine::stop` はこれが 0 になるまで待つ

mod shutdown;
mod work;

pub use shutdown::{ShutdownListener, ShutdownSignal};
pub use work::{WorkTracker, WorkUnit};
