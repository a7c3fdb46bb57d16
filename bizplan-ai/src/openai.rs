use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::PromptCategory;
use crate::client::{ChatMessage, ChatRole, TextGenerator};
use crate::error::GenerationError;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAiResponseFormat>,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAiResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

/// Chat Completions client.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
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

fn build_request<'a>(
    model: &'a str,
    messages: &'a [ChatMessage],
    category: PromptCategory,
) -> OpenAiRequest<'a> {
    let mut wire = Vec::with_capacity(messages.len() + 1);
    wire.push(OpenAiMessage {
        role: ChatRole::System.as_str(),
        content: category.system_prompt(),
    });
    wire.extend(messages.iter().map(|m| OpenAiMessage {
        role: m.role.as_str(),
        content: &m.content,
    }));

    OpenAiRequest {
        model,
        messages: wire,
        temperature: category.temperature(),
        max_tokens: category.max_tokens(),
        response_format: category.expects_json().then_some(OpenAiResponseFormat {
            format_type: "json_object",
        }),
    }
}

fn api_error(
    status: u16,
    body: &str,
) -> GenerationError {
    let message = serde_json::from_str::<OpenAiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    GenerationError::Api { status, message }
}

fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let response: OpenAiResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Parse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| GenerationError::InvalidResponse("No choices in response".to_string()))
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        category: PromptCategory,
    ) -> Result<String, GenerationError> {
        let request = build_request(&self.model, messages, category);
        debug!(model = %self.model, category = category.as_str(), "calling OpenAI");

        let response = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
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

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn request_puts_system_prompt_first() {
        let messages = vec![ChatMessage::user("What is RDTOH?")];

        let request = build_request("gpt-4o-mini", &messages, PromptCategory::Chat);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1], json!({"role": "user", "content": "What is RDTOH?"}));
        assert_eq!(json["max_tokens"], 1024);
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn structured_categories_request_json_objects() {
        let messages = vec![ChatMessage::user("Compare")];

        let request = build_request("gpt-4o-mini", &messages, PromptCategory::Investment);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["response_format"], json!({"type": "json_object"}));
    }

    #[test]
    fn parses_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hello"},"finish_reason":"stop"}]}"#;
        assert_eq!(parse_completion(body), Ok("Hello".to_string()));
    }

    #[test]
    fn empty_choices_is_invalid_response() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[test]
    fn api_error_prefers_provider_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(
            api_error(401, body),
            GenerationError::Api {
                status: 401,
                message: "Incorrect API key provided".to_string()
            }
        );
        assert_eq!(
            api_error(502, "Bad Gateway"),
            GenerationError::Api {
                status: 502,
                message: "Bad Gateway".to_string()
            }
        );
    }
}
