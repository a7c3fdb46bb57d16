use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::PromptCategory;
use crate::client::{ChatMessage, ChatRole, TextGenerator};
use crate::error::GenerationError;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    system: String,
    messages: Vec<AnthropicMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

/// Messages API client.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

// The Messages API takes the system prompt out of band, so caller-supplied
// system turns are folded into it.
fn build_request<'a>(
    model: &'a str,
    messages: &'a [ChatMessage],
    category: PromptCategory,
) -> AnthropicRequest<'a> {
    let mut system = category.system_prompt().to_string();
    let mut turns = Vec::with_capacity(messages.len());
    for message in messages {
        match message.role {
            ChatRole::System => {
                system.push_str("\n\n");
                system.push_str(&message.content);
            }
            ChatRole::User | ChatRole::Assistant => turns.push(AnthropicMessage {
                role: message.role.as_str(),
                content: &message.content,
            }),
        }
    }

    AnthropicRequest {
        model,
        system,
        messages: turns,
        temperature: category.temperature(),
        max_tokens: category.max_tokens(),
    }
}

fn api_error(
    status: u16,
    body: &str,
) -> GenerationError {
    let message = serde_json::from_str::<AnthropicError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    GenerationError::Api { status, message }
}

fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let response: AnthropicResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Parse(e.to_string()))?;

    let text: Vec<String> = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() {
        return Err(GenerationError::InvalidResponse(
            "No text content in response".to_string(),
        ));
    }
    Ok(text.concat())
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    fn provider_name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        category: PromptCategory,
    ) -> Result<String, GenerationError> {
        if !messages.iter().any(|m| m.role == ChatRole::User) {
            return Err(GenerationError::InvalidResponse(
                "conversation has no user message".to_string(),
            ));
        }
        let request = build_request(&self.model, messages, category);
        debug!(model = %self.model, category = category.as_str(), "calling Anthropic");

        let response = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        parse_completion(&body)
    }
}
