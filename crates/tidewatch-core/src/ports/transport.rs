//! Transport port - 通知の配送

use async_trait::async_trait;

use crate::domain::{Payload, TransportError};

/// Delivers one payload to one endpoint.
///
/// A single call is a single attempt; retrying is the caller's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, endpoint: &str, payload: &Payload) -> Result<Vec<u8>, TransportError>;
}
