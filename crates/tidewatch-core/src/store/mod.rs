//! Store - 購読者レコードの永続化
//!
//! 形式は JSON。キーは RecipientId、値は Recipient。

mod recipient_store;

pub use recipient_store::{RecipientStore, backup_path};
