//! `OpenAI`-compatible chat completions provider.
//!
//! `DeepSeek` speaks the same wire format, so one implementation covers
//! both along with any local server reachable through `AI_BASE_URL`.

use serde::{Deserialize, Serialize};

use super::{ChatRequest, LlmProvider};
use crate::AiError;

/// `DeepSeek` chat completions endpoint.
pub const DEEPSEEK_URL: &str = "https://api.deepseek.com/chat/completions";
/// Default `DeepSeek` model.
pub const DEEPSEEK_MODEL: &str = "deepseek-chat";
/// `OpenAI` chat completions endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Default `OpenAI` model.
pub const OPENAI_MODEL: &str = "gpt-4o";

const TOP_P: f32 = 0.9;

/// Chat completions provider.
pub struct OpenAiProvider {
    name: &'static str,
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a provider for an arbitrary compatible endpoint.
    #[must_use]
    pub fn new(name: &'static str, api_key: String, model: String, endpoint: String) -> Self {
        Self {
            name,
            api_key,
            model,
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    /// Creates a `DeepSeek` provider.
    #[must_use]
    pub fn deepseek(api_key: String, model: Option<String>, endpoint: Option<String>) -> Self {
        Self::new(
            "deepseek",
            api_key,
            model.unwrap_or_else(|| DEEPSEEK_MODEL.to_string()),
            endpoint.unwrap_or_else(|| DEEPSEEK_URL.to_string()),
        )
    }

    /// Creates an `OpenAI` provider.
    #[must_use]
    pub fn openai(api_key: String, model: Option<String>, endpoint: Option<String>) -> Self {
        Self::new(
            "openai",
            api_key,
            model.unwrap_or_else(|| OPENAI_MODEL.to_string()),
            endpoint.unwrap_or_else(|| OPENAI_URL.to_string()),
        )
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [CompletionMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AiError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: [
                CompletionMessage {
                    role: "system",
                    content: &request.system,
                },
                CompletionMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: TOP_P,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err: ApiError = serde_json::from_str(&body).unwrap_or_else(|_| ApiError {
                error: ApiErrorDetail {
                    message: format!("HTTP {status}: {body}"),
                },
            });
            return Err(AiError::Provider {
                message: err.error.message,
            });
        }

        let response: CompletionResponse = serde_json::from_str(&body)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AiError::Provider {
                message: format!("Empty response from {}", self.name),
            })
    }

    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }
}
