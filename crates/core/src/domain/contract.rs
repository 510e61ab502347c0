use crate::error::AnalyzeError;
use serde::{Deserialize, Serialize};

pub const HEALTH_STATUS: &str = "Backend is running!";

/// Body of `POST /api/analyze`.
///
/// Both fields are optional on the wire so that a missing field is reported as
/// [`AnalyzeError::InvalidRequest`] rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default, rename = "researchPrompt")]
    pub research_prompt: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub ticker: String,
    pub research_prompt: String,
}

impl AnalysisRequest {
    pub fn new(ticker: impl Into<String>, research_prompt: impl Into<String>) -> Self {
        Self {
            ticker: Some(ticker.into()),
            research_prompt: Some(research_prompt.into()),
        }
    }

    pub fn validate(self) -> Result<ValidatedRequest, AnalyzeError> {
        let ticker = self
            .ticker
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(AnalyzeError::InvalidRequest)?;
        // The prompt is forwarded verbatim, so only check it, never trim it.
        let research_prompt = self
            .research_prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or(AnalyzeError::InvalidRequest)?;

        Ok(ValidatedRequest {
            ticker,
            research_prompt,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn running() -> Self {
        Self {
            status: HEALTH_STATUS.to_string(),
        }
    }
}

/// JSON error body returned by the proxy for every failure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, rename = "rawResponse", skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&AnalyzeError> for ErrorBody {
    fn from(err: &AnalyzeError) -> Self {
        let mut body = ErrorBody {
            error: err.public_message(),
            ..Default::default()
        };
        match err {
            AnalyzeError::UpstreamError { body: details, .. } => {
                body.details = Some(details.clone());
            }
            AnalyzeError::ResultParseError { raw } => body.raw_response = Some(raw.clone()),
            AnalyzeError::InternalError(message) => body.message = Some(message.clone()),
            AnalyzeError::InvalidRequest
            | AnalyzeError::ConfigurationError
            | AnalyzeError::MalformedUpstreamResponse => {}
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_rejects_missing_and_blank_fields() {
        let missing_ticker: AnalysisRequest =
            serde_json::from_value(json!({"researchPrompt": "x"})).unwrap();
        assert!(matches!(
            missing_ticker.validate(),
            Err(AnalyzeError::InvalidRequest)
        ));

        let empty_ticker = AnalysisRequest::new("", "x");
        assert!(matches!(
            empty_ticker.validate(),
            Err(AnalyzeError::InvalidRequest)
        ));

        let blank_prompt = AnalysisRequest::new("NVDA", "  \n ");
        assert!(matches!(
            blank_prompt.validate(),
            Err(AnalyzeError::InvalidRequest)
        ));
    }

    #[test]
    fn validate_keeps_prompt_verbatim() {
        let req = AnalysisRequest::new(" NVDA ", "\n  analyze NVDA\n");
        let validated = req.validate().unwrap();
        assert_eq!(validated.ticker, "NVDA");
        assert_eq!(validated.research_prompt, "\n  analyze NVDA\n");
    }

    #[test]
    fn error_body_uses_wire_field_names() {
        let err = AnalyzeError::ResultParseError {
            raw: "not json".to_string(),
        };
        let v = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(
            v,
            json!({
                "error": "Failed to parse analysis result as JSON",
                "rawResponse": "not json",
            })
        );

        let err = AnalyzeError::UpstreamError {
            status: 429,
            body: "rate limited".to_string(),
        };
        let v = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(
            v,
            json!({"error": "Anthropic API error: 429", "details": "rate limited"})
        );
    }

    #[test]
    fn internal_error_body_carries_message() {
        let err = AnalyzeError::internal("boom");
        let body = ErrorBody::from(&err);
        assert_eq!(body.error, "Internal server error");
        assert_eq!(body.message.as_deref(), Some("boom"));
    }
}
