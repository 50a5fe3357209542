use super::ContentGenerator;
use crate::config::ClaudeConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct TokenUsage {
    input_tokens: u64,
    output_tokens: u64,
}

/// Claude Messages API 客户端
#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    config: ClaudeConfig,
}

impl ClaudeClient {
    pub fn new(config: ClaudeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ContentGenerator for ClaudeClient {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> AppResult<String> {
        if self.config.api_key.is_empty() {
            return Err(AppError::ConfigError("Claude API key is not configured".to_string()));
        }

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: (!system_prompt.is_empty()).then_some(system_prompt),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        log::info!("Calling Claude API (model={})", self.config.model);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Claude API returned {status}: {error_text}"
            )));
        }

        let parsed: MessagesResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            log::info!(
                "Claude API call succeeded. Tokens used - input: {}, output: {}",
                usage.input_tokens,
                usage.output_tokens
            );
        }

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text" && !block.text.is_empty())
            .map(|block| block.text)
            .ok_or_else(|| AppError::ExternalApiError("Claude API returned no text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_empty_system_prompt() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 10,
            system: None,
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_takes_first_text_block() {
        let raw = r#"{"content":[{"type":"text","text":"hello"}],"usage":{"input_tokens":3,"output_tokens":1}}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.content[0].text, "hello");
        assert_eq!(parsed.usage.unwrap().output_tokens, 1);
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let client = ClaudeClient::new(ClaudeConfig::default());
        let err = client.generate("", "hi").await.unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
