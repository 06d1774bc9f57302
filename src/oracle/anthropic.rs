//! HTTP oracle backed by the Anthropic Messages API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::ScoringOracle;
use super::error::{OracleError, OracleResult};
use super::parse::parse_response;
use super::prompt::ScreeningPrompt;
use super::types::{OracleResponse, ScoreRequest, TokenUsage};
use crate::constants::DEFAULT_ORACLE_MAX_TOKENS;

pub const DEFAULT_ORACLE_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_ORACLE_MODEL: &str = "claude-3-5-sonnet-20241022";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Sends the rubric as a cacheable system block and the record as the user
/// message.
pub struct AnthropicOracle {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
}

impl AnthropicOracle {
    pub fn new(
        api_key: impl Into<String>,
        url: impl Into<String>,
        model: impl Into<String>,
    ) -> OracleResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("litscreen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OracleError::Transport {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
            api_key: api_key.into(),
            max_tokens: DEFAULT_ORACLE_MAX_TOKENS,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ScoringOracle for AnthropicOracle {
    async fn score(
        &self,
        prompt: &ScreeningPrompt,
        request: ScoreRequest<'_>,
    ) -> OracleResult<OracleResponse> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": [{
                "type": "text",
                "text": prompt.system_text(),
                "cache_control": {"type": "ephemeral"},
            }],
            "messages": [{
                "role": "user",
                "content": prompt.user_text(request.title, request.abstract_text),
            }],
        });

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let message = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), retry_after, message));
        }

        let envelope: MessagesResponse = response
            .json()
            .await
            .map_err(|e| OracleError::malformed(e.to_string()))?;

        let text: String = envelope
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();

        debug!(
            input_tokens = envelope.usage.input_tokens,
            output_tokens = envelope.usage.output_tokens,
            cache_read_tokens = envelope.usage.cache_read_input_tokens,
            "Oracle replied"
        );

        let mut parsed = parse_response(&text)?;
        parsed.usage = envelope.usage;
        Ok(parsed)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// Maps an unsuccessful HTTP status to the error taxonomy.
pub fn classify_status(status: u16, retry_after: Option<Duration>, message: String) -> OracleError {
    match status {
        429 => OracleError::RateLimited { retry_after },
        401 | 403 => OracleError::Auth { status },
        500..=599 => OracleError::Server { status },
        _ => OracleError::InvalidRequest { status, message },
    }
}

/// Reads a `retry-after` header given in whole seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_classify_status() {
        assert!(classify_status(429, None, String::new()).is_transient());
        assert!(classify_status(500, None, String::new()).is_transient());
        assert!(classify_status(529, None, String::new()).is_transient());
        assert!(!classify_status(401, None, String::new()).is_transient());
        assert!(!classify_status(403, None, String::new()).is_transient());
        assert!(!classify_status(400, None, "bad".into()).is_transient());
    }

    #[test]
    fn test_rate_limit_keeps_retry_after() {
        let err = classify_status(429, Some(Duration::from_secs(7)), String::new());
        assert!(matches!(
            err,
            OracleError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(7)
        ));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(12)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_messages_envelope_parses_usage() {
        let raw = r#"{
            "content": [{"type": "text", "text": "{\"scores\": {}}"}],
            "usage": {"input_tokens": 1200, "output_tokens": 300, "cache_read_input_tokens": 1100}
        }"#;
        let envelope: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.usage.input_tokens, 1200);
        assert_eq!(envelope.usage.cache_read_input_tokens, 1100);
        assert_eq!(envelope.usage.cache_creation_input_tokens, 0);
        assert_eq!(envelope.content[0].kind, "text");
    }
}
