//! Errors - エラー型と分類
//!
//! 定常運転中のエラー（fetch 失敗・配送失敗・保存失敗）はループの中でログに落とす。
//! 呼び出し元へ返すのは起動時と、明示的な操作（登録など）の失敗だけ。

use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce a value from the external source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("value not found: {0}")]
    NotFound(String),

    #[error("invalid value {raw:?}: {message}")]
    Parse { raw: String, message: String },
}

/// Failure of a single delivery attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("error posting to {endpoint}: {message}")]
    Request { endpoint: String, message: String },

    #[error("{endpoint} answered with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("error encoding payload: {0}")]
    Encode(String),
}

/// Failure to persist the recipient store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("error serializing recipients: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid engine configuration, detected before anything starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("data file path is required")]
    MissingDataFile,

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("outbox capacity must be greater than zero")]
    ZeroOutboxCapacity,

    #[error("retry policy must allow at least one attempt")]
    ZeroMaxAttempts,

    #[error("retry multiplier must be a finite number >= 1.0")]
    InvalidMultiplier,
}

/// Errors surfaced by the engine's inbound operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine is shutting down")]
    ShuttingDown,

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("outbox is closed")]
    OutboxClosed,
}
