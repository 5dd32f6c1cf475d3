//! ValueFetcher port - 監視対象の値の取得

use async_trait::async_trait;

use crate::domain::FetchError;

/// Produces the current scalar value, or fails.
///
/// Failures are informational: the poll loop logs them and waits for the
/// next cycle.
#[async_trait]
pub trait ValueFetcher: Send + Sync {
    async fn fetch(&self) -> Result<f64, FetchError>;
}
