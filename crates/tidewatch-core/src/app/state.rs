//! State shared by the poll loop, the outbox producers and the query path.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::domain::MessageTemplate;
use crate::lifecycle::{ShutdownSignal, WorkTracker};
use crate::outbox::Outbox;
use crate::ports::{Clock, ContentSource};
use crate::store::RecipientStore;

/// `current_value` and the recipient store, always locked together.
///
/// Never hold the lock across a fetch or a delivery. Saving the store happens
/// inside the lock.
#[derive(Debug, Default)]
pub struct SharedState {
    pub current_value: f64,
    pub store: RecipientStore,
}

/// Everything the engine's running units share.
pub(crate) struct EngineContext {
    pub state: Mutex<SharedState>,
    pub outbox: Outbox,
    pub work: WorkTracker,
    pub shutdown: ShutdownSignal,
    pub content: Arc<dyn ContentSource>,
    pub clock: Arc<dyn Clock>,
    pub data_file: PathBuf,
    pub template: MessageTemplate,
    pub reply_delay: Duration,
}
