//! In-memory collaborators for development and tests.
//!
//! - `ScriptedFetcher` returns a scripted sequence of values and failures
//! - `RecordingTransport` records every attempt and can be told to fail
//! - `FixedContent` always returns the same string

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{FetchError, Payload, TransportError};
use crate::ports::{ContentSource, Transport, ValueFetcher};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fetcher that plays back a script.
///
/// Once the script runs out it keeps returning the last successful value,
/// so a loop polling it settles instead of failing.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<f64, String>>>,
    last: Mutex<Option<f64>>,
    calls: AtomicU32,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: impl IntoIterator<Item = f64>) -> Self {
        let fetcher = Self::new();
        for v in values {
            fetcher.push_value(v);
        }
        fetcher
    }

    pub fn push_value(&self, value: f64) {
        lock(&self.script).push_back(Ok(value));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Err(message.into()));
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ValueFetcher for ScriptedFetcher {
    async fn fetch(&self) -> Result<f64, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = lock(&self.script).pop_front();
        match next {
            Some(Ok(value)) => {
                *lock(&self.last) = Some(value);
                Ok(value)
            }
            Some(Err(message)) => Err(FetchError::NotFound(message)),
            None => {
                (*lock(&self.last)).ok_or_else(|| FetchError::NotFound("script is empty".into()))
            }
        }
    }
}

/// One recorded delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub endpoint: String,
    pub payload: Payload,
    pub succeeded: bool,
}

/// Transport that records attempts instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    attempts: Mutex<Vec<Attempt>>,
    failures_left: AtomicU32,
    always_fail: AtomicBool,
    latency: Option<Duration>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` attempts, then succeed.
    pub fn failing_first(n: u32) -> Self {
        let t = Self::new();
        t.failures_left.store(n, Ordering::SeqCst);
        t
    }

    pub fn always_failing() -> Self {
        let t = Self::new();
        t.always_fail.store(true, Ordering::SeqCst);
        t
    }

    /// Sleep this long inside every attempt.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        lock(&self.attempts).clone()
    }

    pub fn attempt_count(&self) -> usize {
        lock(&self.attempts).len()
    }

    /// Successful deliveries, in order.
    pub fn delivered(&self) -> Vec<Attempt> {
        lock(&self.attempts)
            .iter()
            .filter(|a| a.succeeded)
            .cloned()
            .collect()
    }

    fn should_fail(&self) -> bool {
        if self.always_fail.load(Ordering::SeqCst) {
            return true;
        }
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn deliver(&self, endpoint: &str, payload: &Payload) -> Result<Vec<u8>, TransportError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let fail = self.should_fail();
        lock(&self.attempts).push(Attempt {
            endpoint: endpoint.to_string(),
            payload: payload.clone(),
            succeeded: !fail,
        });
        if fail {
            Err(TransportError::Request {
                endpoint: endpoint.to_string(),
                message: "intentional failure".into(),
            })
        } else {
            Ok(b"ok".to_vec())
        }
    }
}

/// Content source that always answers with the same text.
#[derive(Debug, Clone, Default)]
pub struct FixedContent(pub String);

impl FixedContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl ContentSource for FixedContent {
    fn next_content(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Payload {
        Payload {
            body: "b".into(),
            content: "c".into(),
        }
    }

    #[tokio::test]
    async fn scripted_fetcher_repeats_last_value() {
        let f = ScriptedFetcher::with_values([60.0]);
        f.push_failure("down");
        assert_eq!(f.fetch().await.unwrap(), 60.0);
        assert!(f.fetch().await.is_err());
        assert_eq!(f.fetch().await.unwrap(), 60.0);
        assert_eq!(f.calls(), 3);
    }

    #[tokio::test]
    async fn empty_script_fails() {
        assert!(ScriptedFetcher::new().fetch().await.is_err());
    }

    #[tokio::test]
    async fn failing_first_then_succeeds() {
        let t = RecordingTransport::failing_first(2);
        assert!(t.deliver("u", &payload()).await.is_err());
        assert!(t.deliver("u", &payload()).await.is_err());
        assert!(t.deliver("u", &payload()).await.is_ok());
        assert_eq!(t.attempt_count(), 3);
        assert_eq!(t.delivered().len(), 1);
    }
}
