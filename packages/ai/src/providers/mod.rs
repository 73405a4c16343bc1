//! LLM provider abstraction and implementations.
//!
//! Supports `DeepSeek` and other `OpenAI`-compatible chat servers, `OpenAI`
//! itself, and Anthropic Claude via a common trait.

pub mod anthropic;
pub mod openai;

use serde::{Deserialize, Serialize};

use crate::AiError;

/// Default completion length.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// System prompt.
    pub system: String,
    /// User prompt.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion length limit.
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Creates a request with the default completion length.
    #[must_use]
    pub fn new(system: impl Into<String>, prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a completion request and returns the generated text.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the response is empty.
    async fn complete(&self, request: &ChatRequest) -> Result<String, AiError>;

    /// Short provider name, e.g. `deepseek`.
    fn name(&self) -> &str;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;
}

/// Creates an LLM provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `DEEPSEEK_API_KEY` set -> `DeepSeek`
/// 2. `ANTHROPIC_API_KEY` set -> Anthropic Claude
/// 3. `OPENAI_API_KEY` set -> `OpenAI`
///
/// `AI_MODEL` overrides the model and `AI_BASE_URL` the chat completions
/// endpoint of the `OpenAI`-compatible providers.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no credentials are found or the
/// explicitly requested provider is not configured.
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, AiError> {
    let provider = match std::env::var("AI_PROVIDER") {
        Ok(name) => name,
        Err(_) => detect_provider().ok_or_else(|| AiError::Config {
            message: "No AI credentials found. Set DEEPSEEK_API_KEY, ANTHROPIC_API_KEY \
                      or OPENAI_API_KEY, or set AI_PROVIDER explicitly."
                .to_string(),
        })?,
    };
    let model = std::env::var("AI_MODEL").ok();
    let base_url = std::env::var("AI_BASE_URL").ok();

    match provider.to_lowercase().as_str() {
        "deepseek" => {
            let api_key = require_env("DEEPSEEK_API_KEY")?;
            Ok(Box::new(openai::OpenAiProvider::deepseek(
                api_key, model, base_url,
            )))
        }
        "openai" | "gpt" => {
            let api_key = require_env("OPENAI_API_KEY")?;
            Ok(Box::new(openai::OpenAiProvider::openai(
                api_key, model, base_url,
            )))
        }
        "anthropic" | "claude" => {
            let api_key = require_env("ANTHROPIC_API_KEY")?;
            let model = model.unwrap_or_else(|| anthropic::DEFAULT_MODEL.to_string());
            Ok(Box::new(anthropic::AnthropicProvider::new(api_key, model)))
        }
        other => Err(AiError::Config {
            message: format!(
                "Unknown AI provider: {other}. Use 'deepseek', 'openai', or 'anthropic'."
            ),
        }),
    }
}

fn require_env(name: &str) -> Result<String, AiError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AiError::Config {
            message: format!("{name} environment variable not set"),
        })
}

/// Auto-detects which provider to use based on available credentials.
fn detect_provider() -> Option<String> {
    let present = |name: &str| std::env::var(name).is_ok_and(|v| !v.trim().is_empty());

    if present("DEEPSEEK_API_KEY") {
        log::info!("Auto-detected AI provider: DeepSeek (DEEPSEEK_API_KEY found)");
        return Some("deepseek".to_string());
    }

    if present("ANTHROPIC_API_KEY") {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return Some("anthropic".to_string());
    }

    if present("OPENAI_API_KEY") {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return Some("openai".to_string());
    }

    log::warn!(
        "No AI credentials detected. Set one of: DEEPSEEK_API_KEY, \
         ANTHROPIC_API_KEY, OPENAI_API_KEY. AI narratives are disabled."
    );
    None
}
