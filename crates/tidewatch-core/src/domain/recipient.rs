//! Recipient - 変更通知を受け取る購読者のレコード

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::EngineError;
use super::ids::RecipientId;

/// A registered destination that wants change notifications.
///
/// `last_reported_value` is the baseline the poll loop diffs against. It is
/// advanced as soon as a change notification is enqueued, not when it is
/// delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub display_name: String,
    /// Webhook URL notifications are posted to.
    pub endpoint: String,
    /// Zero means "never reported".
    #[serde(default)]
    pub last_reported_value: f64,
    /// Whatever else the upstream subscription flow handed us (channel, scopes, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Recipient {
    pub fn new(
        id: impl Into<RecipientId>,
        display_name: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            endpoint: endpoint.into(),
            last_reported_value: 0.0,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_last_reported(mut self, value: f64) -> Self {
        self.last_reported_value = value;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The value a change is measured against, if this recipient has ever
    /// been told one. Zero counts as "never reported".
    pub fn baseline(&self) -> Option<f64> {
        (self.last_reported_value > 0.0).then_some(self.last_reported_value)
    }

    /// Does `value` differ from what we last told this recipient?
    pub fn needs_update(&self, value: f64) -> bool {
        self.last_reported_value != value
    }

    /// A recipient needs an id to be stored under and an endpoint to post to.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.id.is_empty() {
            return Err(EngineError::InvalidRecipient("empty id".into()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(EngineError::InvalidRecipient(format!(
                "{} has no endpoint",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_recipient_has_no_baseline() {
        let r = Recipient::new("T1", "Team One", "https://hooks.example/T1");
        assert_eq!(r.baseline(), None);
        assert!(r.needs_update(70.0));
    }

    #[test]
    fn same_value_needs_no_update() {
        let r = Recipient::new("T1", "Team One", "https://hooks.example/T1")
            .with_last_reported(60.0);
        assert_eq!(r.baseline(), Some(60.0));
        assert!(!r.needs_update(60.0));
        assert!(r.needs_update(60.1));
    }

    #[test]
    fn validate_rejects_missing_id_or_endpoint() {
        let ok = Recipient::new("T1", "Team One", "https://hooks.example/T1");
        assert!(ok.validate().is_ok());
        assert!(matches!(
            Recipient::new("", "Nobody", "https://hooks.example/x").validate(),
            Err(EngineError::InvalidRecipient(_))
        ));
        assert!(matches!(
            Recipient::new("T2", "Team Two", "  ").validate(),
            Err(EngineError::InvalidRecipient(_))
        ));
    }

    #[test]
    fn missing_last_reported_defaults_to_zero() {
        let r: Recipient = serde_json::from_value(json!({
            "id": "T1",
            "display_name": "Team One",
            "endpoint": "https://hooks.example/T1",
        }))
        .unwrap();
        assert_eq!(r.last_reported_value, 0.0);
        assert!(r.metadata.is_empty());
    }

    #[test]
    fn metadata_survives_serialization() {
        let r = Recipient::new("T1", "Team One", "https://hooks.example/T1")
            .with_metadata("channel", json!("#general"));
        let back: Recipient = serde_json::from_value(serde_json::to_value(&r).unwrap()).unwrap();
        assert_eq!(back, r);
    }
}
