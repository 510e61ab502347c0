use crate::domain::analysis::AnalysisResult;
use crate::domain::contract::{AnalysisRequest, HealthStatus};
use crate::error::AnalyzeError;
use crate::llm::{json, CompletionClient};
use chrono::Utc;
use std::sync::Arc;

/// Stateless request handler behind `POST /api/analyze`.
///
/// `client` is `None` when no upstream credential is configured; every valid
/// request is then rejected with [`AnalyzeError::ConfigurationError`].
#[derive(Clone)]
pub struct AnalysisService {
    client: Option<Arc<dyn CompletionClient>>,
}

impl AnalysisService {
    pub fn new(client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { client }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus::running()
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalyzeError> {
        let request = request.validate()?;
        tracing::info!(ticker = %request.ticker, "analysis request received");

        let Some(client) = &self.client else {
            tracing::error!("no upstream API key configured");
            return Err(AnalyzeError::ConfigurationError);
        };

        let text = client.complete(&request.research_prompt).await?;
        let body = json::parse_analysis_object(&text)?;
        let result = AnalysisResult::stamp(body, Utc::now());

        tracing::info!(
            ticker = %request.ticker,
            provider = client.provider_name(),
            id = result.id,
            "analysis completed"
        );
        Ok(result)
    }
}

impl std::fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisService")
            .field("configured", &self.is_configured())
            .finish()
    }
}
