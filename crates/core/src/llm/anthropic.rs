use crate::config::Settings;
use crate::error::AnalyzeError;
use crate::llm::CompletionClient;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

pub const MODEL: &str = "claude-sonnet-4-20250514";
pub const MAX_TOKENS: u32 = 4000;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let base_url = settings
            .anthropic_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = settings.anthropic_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
        })
    }

    async fn create_message(
        &self,
        req: &CreateMessageRequest<'_>,
    ) -> Result<CreateMessageResponse, AnalyzeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).map_err(AnalyzeError::internal)?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(req)
            .send()
            .await
            .map_err(|e| AnalyzeError::internal(format!("Anthropic request failed: {e}")))?;

        let status = res.status();
        tracing::info!(status = status.as_u16(), "Anthropic API responded");

        let text = res.text().await.map_err(|e| {
            AnalyzeError::internal(format!("failed to read Anthropic response body: {e}"))
        })?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %text, "Anthropic API error");
            return Err(AnalyzeError::UpstreamError {
                status: status.as_u16(),
                body: text,
            });
        }

        let raw_json = serde_json::from_str::<serde_json::Value>(&text).map_err(|e| {
            AnalyzeError::internal(format!("failed to parse Anthropic response JSON: {e}"))
        })?;
        serde_json::from_value::<CreateMessageResponse>(raw_json).map_err(|e| {
            tracing::warn!(error = %e, body = %text, "unexpected Anthropic response structure");
            AnalyzeError::MalformedUpstreamResponse
        })
    }

    /// Text of the first content block. Anything else is contract drift.
    fn response_text(res: CreateMessageResponse) -> Result<String, AnalyzeError> {
        match res.content.into_iter().next() {
            Some(ContentBlock::Text { text }) if !text.is_empty() => Ok(text),
            first => {
                tracing::warn!(first_block = ?first, "Anthropic response has no leading text block");
                Err(AnalyzeError::MalformedUpstreamResponse)
            }
        }
    }
}

#[async_trait::async_trait]
impl CompletionClient for AnthropicClient {
    fn provider_name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String, AnalyzeError> {
        let req = CreateMessageRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let res = self.create_message(&req).await?;
        if matches!(res.stop_reason.as_deref(), Some("max_tokens")) {
            tracing::warn!(
                max_tokens = MAX_TOKENS,
                "Anthropic stop_reason=max_tokens; output is likely truncated"
            );
        }
        Self::response_text(res)
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest<'a> {
    model: &'static str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Clone, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(other)]
    Unknown,
}
