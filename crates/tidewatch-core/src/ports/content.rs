//! ContentSource port - 補助テキストの選択

/// Picks the auxiliary content attached to each notification.
pub trait ContentSource: Send + Sync {
    fn next_content(&self) -> String;
}
