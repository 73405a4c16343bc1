#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! AI narrative generation for neighborhood analysis.
//!
//! Prompt builders turn location records and derived metrics into
//! analysis requests; a [`narrator::Narrator`] sends them to whichever
//! LLM provider is configured. Supports `DeepSeek` (the default), `OpenAI`
//! and any `OpenAI`-compatible server via `AI_BASE_URL`, and Anthropic
//! Claude. Narratives are optional: when no provider is configured or a
//! call fails or times out, callers get [`AiError::Unavailable`] and
//! carry on with the numeric results alone.

pub mod narrator;
pub mod prompt;
pub mod providers;

use thiserror::Error;

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },

    /// A prompt could not be built from the given input.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description.
        message: String,
    },

    /// No narrative could be produced.
    #[error("AI narrative unavailable: {reason}")]
    Unavailable {
        /// Why.
        reason: String,
    },
}
