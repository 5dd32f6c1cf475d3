//! Message formatting for value notifications.

use serde::{Deserialize, Serialize};

/// How a value is rendered into a human-readable message.
///
/// ```text
/// Chance of rain: 65.0% (+5.0%) https://forecast.example
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub headline: String,
    /// Appended after the value when set.
    #[serde(default)]
    pub link: Option<String>,
}

impl MessageTemplate {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Message for a value that changed since `previous`.
    ///
    /// The signed delta suffix is only added when there is a baseline to
    /// compare against (see `Recipient::baseline`).
    pub fn change_message(&self, value: f64, previous: Option<f64>) -> String {
        let delta = match previous {
            Some(previous) => format!(" ({:+.1}%)", value - previous),
            None => String::new(),
        };
        self.render(value, &delta)
    }

    /// Message answering an on-demand query. Never carries a delta.
    pub fn status_message(&self, value: f64) -> String {
        self.render(value, "")
    }

    fn render(&self, value: f64, delta: &str) -> String {
        match &self.link {
            Some(link) => format!("{}: {:.1}%{} {}", self.headline, value, delta, link),
            None => format!("{}: {:.1}%{}", self.headline, value, delta),
        }
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self::new("Current value")
    }
}
