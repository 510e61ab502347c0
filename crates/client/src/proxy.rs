use crate::error::ClientError;
use anyhow::Context;
use equity_core::domain::analysis::AnalysisResult;
use equity_core::domain::contract::{AnalysisRequest, ErrorBody, HealthStatus};

/// The analysis backend as seen from the dashboard.
#[async_trait::async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(
        &self,
        ticker: &str,
        research_prompt: &str,
    ) -> Result<AnalysisResult, ClientError>;

    async fn health(&self) -> Result<HealthStatus, ClientError>;
}

/// HTTP client for the proxy service.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .with_context(|| format!("invalid backend URL: {base_url}"))?;
        anyhow::ensure!(
            matches!(base_url.scheme(), "http" | "https"),
            "backend URL must use http or https (got {base_url})"
        );

        let http = reqwest::Client::builder()
            .build()
            .context("failed to build backend http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn error_from(res: reqwest::Response) -> ClientError {
        let status = res.status().as_u16();
        let message = res
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| "Unknown error".to_string());
        ClientError::Status { status, message }
    }
}

#[async_trait::async_trait]
impl AnalysisBackend for ProxyClient {
    async fn analyze(
        &self,
        ticker: &str,
        research_prompt: &str,
    ) -> Result<AnalysisResult, ClientError> {
        let res = self
            .http
            .post(self.url("/api/analyze"))
            .json(&AnalysisRequest::new(ticker, research_prompt))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        tracing::debug!(status = res.status().as_u16(), "backend responded");
        if !res.status().is_success() {
            return Err(Self::error_from(res).await);
        }

        res.json::<AnalysisResult>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        let res = self
            .http
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            return Err(Self::error_from(res).await);
        }
        res.json::<HealthStatus>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}
