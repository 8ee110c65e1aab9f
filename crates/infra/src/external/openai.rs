//! OpenAI-compatible chat completion client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use salesadvisor_ai::{GenerationError, GenerationRequest, TextGenerator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    /// `None` disables generation; every call returns `NotConfigured`.
    pub api_key: Option<String>,
    pub model: String,
    /// Base URL without the trailing `/chat/completions`.
    pub base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `TextGenerator` backed by `POST {base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiGenerator {
    pub fn new(config: OpenAiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: OpenAiConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

fn first_choice(body: ChatCompletionResponse) -> Result<String, GenerationError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::Malformed("response has no choices".to_string()))?;
    match choice.message.content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerationError::Empty),
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    #[instrument(skip(self, request), fields(model = %self.config.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(GenerationError::NotConfigured("OPENAI_API_KEY is not set".to_string()));
        };

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;
        let text = first_choice(parsed)?;
        debug!(chars = text.len(), "chat completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            model: "gpt-4.1-mini".to_string(),
            base_url: base_url.to_string(),
        }
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let a = OpenAiGenerator::new(config("https://api.openai.com/v1"));
        let b = OpenAiGenerator::new(config("https://api.openai.com/v1/"));
        assert_eq!(a.endpoint(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(a.endpoint(), b.endpoint());
    }

    #[test]
    fn request_body_has_system_then_user_message() {
        let body = ChatCompletionRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hi",
                },
            ],
            temperature: 0.7,
            max_tokens: 1000,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn first_choice_rejects_missing_or_blank_content() {
        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_choice(empty), Err(GenerationError::Malformed(_))));

        let blank: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  "}}]}"#).unwrap();
        assert_eq!(first_choice(blank), Err(GenerationError::Empty));

        let ok: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"Do X"}}]}"#)
                .unwrap();
        assert_eq!(first_choice(ok).unwrap(), "Do X");
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let generator = OpenAiGenerator::new(OpenAiConfig {
            api_key: None,
            ..config("http://127.0.0.1:9")
        });
        let request = GenerationRequest {
            system: "s".to_string(),
            prompt: "p".to_string(),
            temperature: 0.7,
            max_tokens: 10,
        };
        assert!(matches!(
            generator.generate(&request).await,
            Err(GenerationError::NotConfigured(_))
        ));
    }
}
