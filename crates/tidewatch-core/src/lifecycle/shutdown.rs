//! Quit signal built on `tokio::sync::watch`.

use std::sync::Arc;

use tokio::sync::watch;

/// Owner side of the quit flag. Cheap to clone; every clone flips the same flag.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Set the flag. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side, for use inside `tokio::select!`.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the flag is set (immediately if it already is).
    pub async fn triggered(&mut self) {
        // sender lives in an Arc held by the engine; Err only means it was dropped
        let _ = self.rx.wait_for(|quit| *quit).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn listener_wakes_on_trigger() {
        let signal = ShutdownSignal::new();
        let mut listener = signal.subscribe();
        assert!(!listener.is_triggered());

        let waiter = tokio::spawn(async move {
            listener.triggered().await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.trigger();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn late_listener_sees_trigger() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        signal.trigger();
        let mut listener = signal.subscribe();
        tokio::time::timeout(Duration::from_millis(100), listener.triggered())
            .await
            .unwrap();
    }
}
