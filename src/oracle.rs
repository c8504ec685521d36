//! Challenge oracle gateway.
//!
//! Challenge spaces ask an external text-generation service for a short
//! physical challenge tailored to the player's age and language. The
//! oracle is the only asynchronous collaborator in the game core. A
//! failed request never surfaces to gameplay: the turn engine substitutes
//! the locale's fallback challenge and the turn proceeds normally.

use crate::locale::Language;
use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

/// Text-generation provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleProvider {
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

/// Source of challenge text for Challenge spaces.
///
/// Implementations are consulted at most once per Challenge visit, with
/// no retry. The error branch exists so the engine can substitute the
/// locale fallback; it never propagates further.
#[async_trait]
pub trait ChallengeOracle: Send + Sync {
    /// Generates one challenge for a player of the given age.
    async fn generate(&self, age: u8, language: Language) -> Result<String, OracleError>;
}

/// Configuration for the LLM-backed oracle.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct OracleConfig {
    /// Provider (openai or anthropic).
    #[serde(default = "default_provider")]
    #[getter(copy)]
    provider: OracleProvider,

    /// Model name (e.g., "gpt-4o-mini", "claude-3-5-haiku-20241022").
    #[serde(default = "default_model")]
    model: String,

    /// Maximum tokens for the generated challenge.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Sampling temperature; challenges want variety.
    #[serde(default = "default_temperature")]
    temperature: f32,
}

fn default_provider() -> OracleProvider {
    OracleProvider::OpenAI
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    100
}

fn default_temperature() -> f32 {
    0.9
}

impl OracleConfig {
    /// Creates an oracle configuration.
    #[instrument(skip(model), fields(provider = ?provider, model = %model))]
    pub fn new(provider: OracleProvider, model: String, max_tokens: u32, temperature: f32) -> Self {
        debug!("Creating oracle config");
        Self {
            provider,
            model,
            max_tokens,
            temperature,
        }
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OracleError> {
        debug!("Loading oracle config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| OracleError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| OracleError::new(format!("Failed to parse config: {}", e)))?;

        info!(model = %config.model, "Oracle config loaded");
        Ok(config)
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// LLM-backed challenge oracle.
///
/// Holds the API credential resolved once at construction. A missing
/// credential is not an error: the oracle degrades to the locale's
/// no-credential fallback so a game without API access still plays.
#[derive(Debug, Clone)]
pub struct LlmOracle {
    config: OracleConfig,
    api_key: Option<String>,
}

impl LlmOracle {
    /// Creates an oracle with an explicit credential.
    #[instrument(skip(config, api_key), fields(provider = ?config.provider()))]
    pub fn new(config: OracleConfig, api_key: Option<String>) -> Self {
        info!(credential = api_key.is_some(), "Creating LLM oracle");
        Self { config, api_key }
    }

    /// Creates an oracle reading the provider's credential from the
    /// environment (`OPENAI_API_KEY` or `ANTHROPIC_API_KEY`).
    #[instrument(skip(config), fields(provider = ?config.provider()))]
    pub fn from_env(config: OracleConfig) -> Self {
        let var = match config.provider {
            OracleProvider::OpenAI => "OPENAI_API_KEY",
            OracleProvider::Anthropic => "ANTHROPIC_API_KEY",
        };
        let api_key = std::env::var(var).ok();
        if api_key.is_none() {
            warn!(var, "No oracle credential; fallback challenges will be used");
        }
        Self::new(config, api_key)
    }

    /// Requests challenge text from the configured provider.
    #[instrument(skip(self, api_key))]
    async fn request(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, OracleError> {
        match self.config.provider {
            OracleProvider::OpenAI => self.request_openai(api_key, prompt).await,
            OracleProvider::Anthropic => self.request_anthropic(api_key, prompt).await,
        }
    }

    /// Requests a completion from OpenAI.
    #[instrument(skip(self, api_key, prompt))]
    async fn request_openai(&self, api_key: &str, prompt: &str) -> Result<String, OracleError> {
        debug!("Building OpenAI challenge request");
        let client =
            OpenAIClient::with_config(OpenAIConfig::new().with_api_key(api_key.to_string()));

        let messages = vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| {
                    error!(error = ?e, "Failed to build user message");
                    OracleError::new(format!("Failed to build user message: {}", e))
                })?,
        )];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build request");
                OracleError::new(format!("Failed to build request: {}", e))
            })?;

        debug!("Sending challenge request to OpenAI");
        let response = client.chat().create(request).await.map_err(|e| {
            error!(error = ?e, "OpenAI API error");
            OracleError::new(format!("OpenAI API error: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                error!("No content in OpenAI response");
                OracleError::new("No content in OpenAI response".to_string())
            })?;

        Ok(content)
    }

    /// Requests a completion from Anthropic.
    #[instrument(skip(self, api_key, prompt))]
    async fn request_anthropic(&self, api_key: &str, prompt: &str) -> Result<String, OracleError> {
        debug!("Building Anthropic challenge request");
        let client = reqwest::Client::new();

        let request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        debug!("Sending challenge request to Anthropic");
        let response = client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Anthropic API request failed");
                OracleError::new(format!("Anthropic API request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Anthropic response");
            OracleError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Anthropic API error");
            return Err(OracleError::new(format!(
                "Anthropic API error {}: {}",
                status, response_text
            )));
        }

        let response_json: serde_json::Value =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = ?e, "Failed to parse Anthropic response");
                OracleError::new(format!("Failed to parse response: {}", e))
            })?;

        let content = response_json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                error!(response = %response_json, "No text content in Anthropic response");
                OracleError::new("No text content in Anthropic response".to_string())
            })?
            .to_string();

        Ok(content)
    }
}

/// Strips whitespace and surrounding quotes the model sometimes adds.
fn clean_challenge(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('"')
        .trim_end_matches('"')
        .trim()
        .to_string()
}

#[async_trait]
impl ChallengeOracle for LlmOracle {
    #[instrument(skip(self), fields(provider = ?self.config.provider, model = %self.config.model))]
    async fn generate(&self, age: u8, language: Language) -> Result<String, OracleError> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                debug!("No credential; returning fallback challenge");
                return Ok(language.fallback_no_credential().to_string());
            }
        };

        let prompt = language.challenge_prompt(age);
        let raw = self.request(api_key, &prompt).await?;
        let challenge = clean_challenge(&raw);

        if challenge.is_empty() {
            error!("Oracle returned an empty challenge");
            return Err(OracleError::new("Empty challenge from oracle".to_string()));
        }

        info!(challenge_length = challenge.len(), "Generated challenge");
        Ok(challenge)
    }
}

/// Deterministic oracle for tests and offline play.
#[derive(Debug, Clone)]
pub enum ScriptedOracle {
    /// Always returns the same challenge text.
    Fixed(String),
    /// Always fails, exercising the fallback path.
    Failing,
}

#[async_trait]
impl ChallengeOracle for ScriptedOracle {
    async fn generate(&self, _age: u8, _language: Language) -> Result<String, OracleError> {
        match self {
            ScriptedOracle::Fixed(text) => Ok(text.clone()),
            ScriptedOracle::Failing => Err(OracleError::new("scripted failure".to_string())),
        }
    }
}

/// Challenge oracle error.
///
/// Internal to the gateway and the engine's fallback substitution; never
/// crosses the session boundary.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error: {} at {}:{}", message, file, line)]
pub struct OracleError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates a new oracle error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
