use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::anthropic::AnthropicClient;
use crate::category::PromptCategory;
use crate::error::GenerationError;
use crate::openai::OpenAiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Outcome of a generation request, shaped for the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Generation {
    pub fn succeeded(content: String) -> Self {
        Self {
            success: true,
            content: Some(content),
            error: None,
        }
    }

    pub fn failed(error: &GenerationError) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error.to_string()),
        }
    }

    /// The generated text, or the reported failure.
    pub fn into_content(self) -> Result<String, GenerationError> {
        match (self.success, self.content) {
            (true, Some(content)) => Ok(content),
            (true, None) => Err(GenerationError::InvalidResponse(
                "No content in response".to_string(),
            )),
            (false, _) => Err(GenerationError::Reported(
                self.error
                    .unwrap_or_else(|| "Generation failed".to_string()),
            )),
        }
    }
}

impl From<Result<String, GenerationError>> for Generation {
    fn from(result: Result<String, GenerationError>) -> Self {
        match result {
            Ok(content) => Self::succeeded(content),
            Err(e) => Self::failed(&e),
        }
    }
}

/// An opaque text-generation service.
///
/// Implementations add the category's system prompt themselves; callers pass
/// only the conversation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn complete(
        &self,
        messages: &[ChatMessage],
        category: PromptCategory,
    ) -> Result<String, GenerationError>;

    /// Single-prompt convenience over [`TextGenerator::complete`]. Never fails;
    /// errors are reported inside the [`Generation`].
    async fn generate(
        &self,
        prompt: &str,
        category: PromptCategory,
    ) -> Generation {
        let messages = [ChatMessage::user(prompt)];
        self.complete(&messages, category).await.into()
    }
}

/// Stands in when no provider is configured. Every request fails, so callers
/// fall back to their fixed narratives.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn provider_name(&self) -> &'static str {
        "none"
    }

    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _category: PromptCategory,
    ) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured("AI is disabled".to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAi,
    Anthropic,
    #[default]
    None,
}

impl AiProvider {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "none" | "disabled" | "" => Some(Self::None),
            _ => None,
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::None => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::None => "",
        }
    }
}

/// Resolved provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub provider: AiProvider,
    /// Falls back to [`AiProvider::default_model`] when `None`.
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::None,
            model: None,
            api_key: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl AiConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

/// # Errors
///
/// [`GenerationError::MissingKey`] when a hosted provider has no API key, or
/// [`GenerationError::Network`] if the HTTP client cannot be built.
pub fn build_generator(config: &AiConfig) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    match config.provider {
        AiProvider::None => Ok(Arc::new(DisabledGenerator)),
        AiProvider::OpenAi => {
            let key = config.api_key.as_deref().ok_or(GenerationError::MissingKey)?;
            Ok(Arc::new(OpenAiClient::new(key, config.model(), config.timeout)?))
        }
        AiProvider::Anthropic => {
            let key = config.api_key.as_deref().ok_or(GenerationError::MissingKey)?;
            Ok(Arc::new(AnthropicClient::new(key, config.model(), config.timeout)?))
        }
    }
}
