use thiserror::Error;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Everything that can go wrong while serving one analysis request.
///
/// Each variant maps to exactly one HTTP status at the API boundary; see
/// [`AnalyzeError::status_code`].
#[derive(Debug, Clone, Error)]
pub enum AnalyzeError {
    #[error("Missing ticker or research prompt")]
    InvalidRequest,

    #[error("API key not configured")]
    ConfigurationError,

    /// Non-success status from the upstream API, passed through untouched.
    #[error("Anthropic API error: {status}")]
    UpstreamError { status: u16, body: String },

    #[error("Invalid response structure from Anthropic API")]
    MalformedUpstreamResponse,

    /// `raw` is already truncated for diagnostics.
    #[error("Failed to parse analysis result as JSON")]
    ResultParseError { raw: String },

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AnalyzeError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::InternalError(err.to_string())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::UpstreamError { status, .. } => *status,
            Self::ConfigurationError
            | Self::MalformedUpstreamResponse
            | Self::ResultParseError { .. }
            | Self::InternalError(_) => 500,
        }
    }

    /// The `error` field of the JSON body returned to callers.
    pub fn public_message(&self) -> String {
        match self {
            Self::InternalError(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_passes_through() {
        let err = AnalyzeError::UpstreamError {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.status_code(), 429);
        assert_eq!(err.public_message(), "Anthropic API error: 429");
    }

    #[test]
    fn internal_error_hides_detail_from_public_message() {
        let err = AnalyzeError::internal("connection reset");
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn only_invalid_request_is_a_client_error() {
        assert!(AnalyzeError::InvalidRequest.is_client_error());
        assert_eq!(AnalyzeError::InvalidRequest.status_code(), 400);
        assert!(!AnalyzeError::ConfigurationError.is_client_error());
        assert_eq!(AnalyzeError::ConfigurationError.status_code(), 500);
    }
}
