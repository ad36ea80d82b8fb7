//! Chat completions transport shared by the scorer and the generator.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use fypmatch_core::{Error, Result};

use super::error::{to_fypmatch_error, OpenAIErrorCode};
use super::types::*;

/// Model and sampling parameters for one completion.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sampling<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub top_p: f32,
}

/// Authenticated HTTP client for one OpenAI-compatible endpoint.
pub(crate) struct ChatClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ChatClient {
    pub(crate) fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self.http.post(&url);

        if let Some(ref api_key) = self.api_key {
            req = req.bearer_auth(api_key);
        }

        req.header("Content-Type", "application/json")
    }

    /// Send `messages` in JSON mode and return the first choice's content.
    ///
    /// An unusable response body maps to [`Error::MalformedScores`].
    pub(crate) async fn complete(
        &self,
        sampling: Sampling<'_>,
        messages: Vec<ChatMessage>,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: sampling.model.to_string(),
            messages,
            temperature: Some(sampling.temperature),
            top_p: Some(sampling.top_p),
            response_format: Some(ResponseFormat::json_object()),
            stream: false,
        };

        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: OpenAIErrorResponse =
                response.json().await.unwrap_or(OpenAIErrorResponse {
                    error: OpenAIError {
                        message: status
                            .canonical_reason()
                            .unwrap_or("Unknown error")
                            .to_string(),
                        error_type: String::new(),
                        code: None,
                    },
                });
            let code = OpenAIErrorCode::from_response(status.as_u16(), &body.error.error_type);
            return Err(to_fypmatch_error(
                code,
                &format!("{}: {}", status, body.error.message),
            ));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedScores(format!("Failed to parse response: {}", e)))?;

        if let Some(usage) = &result.usage {
            debug!(
                subsystem = "inference",
                component = "openai",
                model = %sampling.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Token usage"
            );
        }

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::MalformedScores("response has no choices".to_string()))
    }
}
