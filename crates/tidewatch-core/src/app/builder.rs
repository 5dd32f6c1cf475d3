//! EngineBuilder - エンジンの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 設定値は build() 時に検証する（EngineConfig::validate）
//! - 必須のコラボレータ（fetcher, transport）が無ければ BuildError
//! - store はここで 1 度だけ読み込む（無い・壊れている場合は空で始める）

use std::sync::Arc;

use tokio::sync::Mutex;

use super::config::EngineConfig;
use super::engine::Engine;
use super::poll_loop::PollLoop;
use super::state::{EngineContext, SharedState};
use crate::domain::ConfigError;
use crate::impls::QuipBook;
use crate::lifecycle::{ShutdownSignal, WorkTracker};
use crate::outbox::{Outbox, OutboxWorker};
use crate::ports::{Clock, ContentSource, SystemClock, Transport, ValueFetcher};
use crate::store::RecipientStore;

/// BuildError はエンジン構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}

/// Wires collaborators and configuration into an `Engine`.
///
/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new(EngineConfig::new("db.json"))
///     .fetcher(Arc::new(my_fetcher))
///     .transport(Arc::new(HttpTransport::new(Duration::from_secs(10))?))
///     .build()?;
/// let running = engine.start();
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    fetcher: Option<Arc<dyn ValueFetcher>>,
    transport: Option<Arc<dyn Transport>>,
    content: Option<Arc<dyn ContentSource>>,
    clock: Option<Arc<dyn Clock>>,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            fetcher: None,
            transport: None,
            content: None,
            clock: None,
        }
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn ValueFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Defaults to the built-in `QuipBook`.
    pub fn content(mut self, content: Arc<dyn ContentSource>) -> Self {
        self.content = Some(content);
        self
    }

    /// Defaults to `SystemClock`.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate, load the store and assemble the engine (not started).
    pub fn build(self) -> Result<Engine, BuildError> {
        self.config.validate()?;
        let fetcher = self
            .fetcher
            .ok_or(BuildError::MissingCollaborator("fetcher"))?;
        let transport = self
            .transport
            .ok_or(BuildError::MissingCollaborator("transport"))?;
        let content = self
            .content
            .unwrap_or_else(|| Arc::new(QuipBook::builtin()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let config = self.config;
        let store = RecipientStore::load(&config.data_file);
        let (outbox, rx) = Outbox::bounded(config.outbox_capacity);
        let halt = ShutdownSignal::new();

        let ctx = Arc::new(EngineContext {
            state: Mutex::new(SharedState {
                current_value: 0.0,
                store,
            }),
            outbox,
            work: WorkTracker::new(),
            shutdown: ShutdownSignal::new(),
            content,
            clock,
            data_file: config.data_file,
            template: config.message,
            reply_delay: config.reply_delay,
        });

        let poll = PollLoop::new(Arc::clone(&ctx), fetcher, config.poll_interval);
        let worker = OutboxWorker::new(rx, transport, config.retry, halt.subscribe());
        Ok(Engine::new(ctx, poll, worker, halt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{RecordingTransport, ScriptedFetcher};
    use tempfile::TempDir;

    #[test]
    fn build_success() {
        let dir = TempDir::new().unwrap();
        let engine = EngineBuilder::new(EngineConfig::new(dir.path().join("db.json")))
            .fetcher(Arc::new(ScriptedFetcher::new()))
            .transport(Arc::new(RecordingTransport::new()))
            .build();
        assert!(engine.is_ok());
    }

    #[test]
    fn build_missing_fetcher() {
        let dir = TempDir::new().unwrap();
        let engine = EngineBuilder::new(EngineConfig::new(dir.path().join("db.json")))
            .transport(Arc::new(RecordingTransport::new()))
            .build();
        assert!(matches!(
            engine,
            Err(BuildError::MissingCollaborator("fetcher"))
        ));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let engine = EngineBuilder::new(EngineConfig::default())
            .fetcher(Arc::new(ScriptedFetcher::new()))
            .transport(Arc::new(RecordingTransport::new()))
            .build();
        assert!(matches!(
            engine,
            Err(BuildError::Config(ConfigError::MissingDataFile))
        ));
    }
}
