//! NotificationJob - Outbox に積まれる 1 件の通知
//!
//! ジョブは生成後に変更されない。worker が 1 度だけ取り出して配送を試みる。

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::ids::JobId;

/// What gets posted to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Main message text.
    pub body: String,
    /// Auxiliary content shown alongside the body (a quip).
    pub content: String,
}

/// Ordered key/value pairs attached to every log line about a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogContext(Vec<(String, String)>);

impl LogContext {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{k}={v:?}")?;
        }
        Ok(())
    }
}

/// One pending notification bound for one destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationJob {
    id: JobId,
    endpoint: String,
    payload: Payload,
    context: LogContext,
}

impl NotificationJob {
    pub fn new(
        endpoint: impl Into<String>,
        body: impl Into<String>,
        content: impl Into<String>,
        context: LogContext,
    ) -> Self {
        let id = JobId::from_ulid(Ulid::new());
        Self {
            id,
            endpoint: endpoint.into(),
            payload: Payload {
                body: body.into(),
                content: content.into(),
            },
            context: context.with("job_id", id),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn body(&self) -> &str {
        &self.payload.body
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }
}
