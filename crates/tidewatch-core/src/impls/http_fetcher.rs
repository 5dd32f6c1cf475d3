//! JsonPointerFetcher - JSON API から監視対象の値を取り出す

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::FetchError;
use crate::ports::ValueFetcher;

/// GETs `url` and reads the value at `pointer` (RFC 6901).
///
/// The value may be a JSON number or a string such as `"65.3%"`.
#[derive(Debug, Clone)]
pub struct JsonPointerFetcher {
    client: reqwest::Client,
    url: String,
    pointer: String,
}

impl JsonPointerFetcher {
    pub fn new(
        url: impl Into<String>,
        pointer: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            url,
            pointer: pointer.into(),
        })
    }

    fn request_err(&self, e: reqwest::Error) -> FetchError {
        FetchError::Request {
            url: self.url.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl ValueFetcher for JsonPointerFetcher {
    async fn fetch(&self) -> Result<f64, FetchError> {
        let doc: Value = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.request_err(e))?
            .json()
            .await
            .map_err(|e| self.request_err(e))?;

        let found = doc
            .pointer(&self.pointer)
            .ok_or_else(|| FetchError::NotFound(self.pointer.clone()))?;
        parse_value(found)
    }
}

/// Accepts `65.3`, `"65.3"` and `"65.3%"`. `NaN` and infinities are rejected.
pub fn parse_value(value: &Value) -> Result<f64, FetchError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| FetchError::Parse {
            raw: n.to_string(),
            message: "not representable as f64".into(),
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
            number.trim().parse::<f64>().map_err(|e| FetchError::Parse {
                raw: s.clone(),
                message: e.to_string(),
            })
        }
        other => Err(FetchError::Parse {
            raw: other.to_string(),
            message: "expected a number or a percentage string".into(),
        }),
    }?;
    if !parsed.is_finite() {
        return Err(FetchError::Parse {
            raw: value.to_string(),
            message: "value is not a finite number".into(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[rstest]
    #[case(json!(65.3), 65.3)]
    #[case(json!("65.3"), 65.3)]
    #[case(json!(" 28.6% "), 28.6)]
    #[case(json!(70), 70.0)]
    fn parses_numbers_and_percentages(#[case] raw: Value, #[case] expected: f64) {
        assert_eq!(parse_value(&raw).unwrap(), expected);
    }

    #[rstest]
    #[case(json!("n/a"))]
    #[case(json!(null))]
    #[case(json!({"value": 1}))]
    #[case(json!("NaN"))]
    #[case(json!("NaN%"))]
    #[case(json!("inf"))]
    #[case(json!("-infinity"))]
    fn rejects_non_numeric(#[case] raw: Value) {
        assert!(matches!(parse_value(&raw), Err(FetchError::Parse { .. })));
    }

    #[tokio::test]
    async fn fetches_value_at_pointer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "forecast": { "winprob": { "R": "28.6%", "D": "71.4%" } }
            })))
            .mount(&server)
            .await;

        let fetcher = JsonPointerFetcher::new(
            format!("{}/forecast", server.uri()),
            "/forecast/winprob/R",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(fetcher.fetch().await.unwrap(), 28.6);
    }

    #[tokio::test]
    async fn missing_pointer_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let fetcher =
            JsonPointerFetcher::new(server.uri(), "/nope", Duration::from_secs(5)).unwrap();
        assert!(matches!(fetcher.fetch().await, Err(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn server_error_is_request_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = JsonPointerFetcher::new(server.uri(), "/x", Duration::from_secs(5)).unwrap();
        assert!(matches!(fetcher.fetch().await, Err(FetchError::Request { .. })));
    }
}
