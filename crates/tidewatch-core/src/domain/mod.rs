//! Domain model (recipients, jobs, messages, errors).

pub mod errors;
pub mod ids;
pub mod message;
pub mod notification;
pub mod recipient;

pub use self::errors::{ConfigError, EngineError, FetchError, StoreError, TransportError};
pub use self::ids::{JobId, RecipientId};
pub use self::message::MessageTemplate;
pub use self::notification::{LogContext, NotificationJob, Payload};
pub use self::recipient::Recipient;
