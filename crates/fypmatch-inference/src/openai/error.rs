//! OpenAI-specific error handling.
//!
//! Maps provider responses onto [`fypmatch_core::Error`]. Only
//! [`Error::ScoringUnavailable`] is recovered by the matching loop, so the
//! mapping decides which failures cost one batch and which fail the job.

use fypmatch_core::Error;

/// OpenAI-compatible error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAIErrorCode {
    /// Invalid authentication credentials.
    AuthenticationError,
    /// Rate limit or token quota exceeded.
    RateLimitExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Request too large for the model context.
    ContextLengthExceeded,
    /// Provider-side failure.
    ServerError,
    /// Anything else.
    Unknown,
}

impl OpenAIErrorCode {
    /// Determine error code from HTTP status and error type.
    pub fn from_response(status: u16, error_type: &str) -> Self {
        match (status, error_type) {
            (401 | 403, _) => Self::AuthenticationError,
            (429, _) => Self::RateLimitExceeded,
            (404, _) | (_, "model_not_found") => Self::ModelNotFound,
            (400, _) if error_type.contains("context_length") => Self::ContextLengthExceeded,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Whether the failure is expected to clear up on a later request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded | Self::ServerError)
    }
}

/// Convert a provider error to a fypmatch Error.
pub fn to_fypmatch_error(code: OpenAIErrorCode, message: &str) -> Error {
    match code {
        OpenAIErrorCode::RateLimitExceeded => {
            Error::ScoringUnavailable(format!("Rate limit exceeded: {}", message))
        }
        OpenAIErrorCode::ServerError => {
            Error::ScoringUnavailable(format!("Server error: {}", message))
        }
        OpenAIErrorCode::AuthenticationError => {
            Error::Config(format!("Authentication failed: {}", message))
        }
        OpenAIErrorCode::ModelNotFound => Error::Config(format!("Model not found: {}", message)),
        OpenAIErrorCode::ContextLengthExceeded => {
            Error::Inference(format!("Context too long: {}", message))
        }
        OpenAIErrorCode::Unknown => Error::Inference(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_401() {
        let code = OpenAIErrorCode::from_response(401, "invalid_api_key");
        assert_eq!(code, OpenAIErrorCode::AuthenticationError);
    }

    #[test]
    fn test_error_code_from_429() {
        let code = OpenAIErrorCode::from_response(429, "tokens");
        assert_eq!(code, OpenAIErrorCode::RateLimitExceeded);
    }

    #[test]
    fn test_error_code_from_404() {
        let code = OpenAIErrorCode::from_response(404, "");
        assert_eq!(code, OpenAIErrorCode::ModelNotFound);
    }

    #[test]
    fn test_error_code_from_503() {
        let code = OpenAIErrorCode::from_response(503, "service_unavailable");
        assert_eq!(code, OpenAIErrorCode::ServerError);
    }

    #[test]
    fn test_error_code_context_length() {
        let code = OpenAIErrorCode::from_response(400, "context_length_exceeded");
        assert_eq!(code, OpenAIErrorCode::ContextLengthExceeded);
    }

    #[test]
    fn test_error_code_from_unknown() {
        let code = OpenAIErrorCode::from_response(418, "im_a_teapot");
        assert_eq!(code, OpenAIErrorCode::Unknown);
    }

    #[test]
    fn test_retryable_codes_become_transient() {
        for code in [
            OpenAIErrorCode::RateLimitExceeded,
            OpenAIErrorCode::ServerError,
        ] {
            assert!(code.is_retryable());
            assert!(to_fypmatch_error(code, "x").is_transient());
        }
    }

    #[test]
    fn test_hard_codes_are_not_transient() {
        for code in [
            OpenAIErrorCode::AuthenticationError,
            OpenAIErrorCode::ModelNotFound,
            OpenAIErrorCode::ContextLengthExceeded,
            OpenAIErrorCode::Unknown,
        ] {
            assert!(!code.is_retryable());
            assert!(!to_fypmatch_error(code, "x").is_transient());
        }
    }

    #[test]
    fn test_auth_error_message() {
        let err = to_fypmatch_error(OpenAIErrorCode::AuthenticationError, "Invalid key");
        assert!(err.to_string().contains("Authentication failed"));
    }
}
