//! HttpTransport - webhook への JSON POST
//!
//! 送る形は incoming-webhook 互換のテキストメッセージ:
//! `{"response_type":"in_channel","text":..., "attachments":[{"text":...}]}`

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::domain::{Payload, TransportError};
use crate::ports::Transport;

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    response_type: &'static str,
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<TextAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct TextAttachment<'a> {
    text: &'a str,
}

impl<'a> From<&'a Payload> for TextMessage<'a> {
    fn from(payload: &'a Payload) -> Self {
        let attachments = if payload.content.is_empty() {
            Vec::new()
        } else {
            vec![TextAttachment {
                text: &payload.content,
            }]
        };
        Self {
            response_type: "in_channel",
            text: &payload.body,
            attachments,
        }
    }
}

/// Posts payloads as JSON over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Client with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request {
                endpoint: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn deliver(&self, endpoint: &str, payload: &Payload) -> Result<Vec<u8>, TransportError> {
        let request_err = |e: reqwest::Error| TransportError::Request {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        };

        let body = serde_json::to_vec(&TextMessage::from(payload))
            .map_err(|e| TransportError::Encode(e.to_string()))?;

        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(request_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(request_err)?;
        debug!(endpoint, status = status.as_u16(), bytes = bytes.len(), "posted message");
        Ok(bytes.to_vec())
    }
}
