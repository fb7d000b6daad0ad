use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::llm::LlmResponseFormat;
use crate::domain::{
    DomainError, FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage,
};
use crate::infrastructure::http_client::HttpClientTrait;

/// Groq serves an OpenAI-compatible API under this prefix
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai";

/// Chat completions provider for any OpenAI-compatible endpoint
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    name: &'static str,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn groq(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, GROQ_BASE_URL).named("groq")
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            name: "openai",
            auth_header,
            base_url,
        }
    }

    /// Override the name reported in errors and metrics
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, model: &str, request: &LlmRequest) -> serde_json::Value {
        let messages: Vec<OpenAiMessage> =
            request.messages.iter().map(OpenAiMessage::from_domain).collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if request.response_format == LlmResponseFormat::JsonObject {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(self.name, format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider(self.name, "No choices in response"))?;

        let message = Message::assistant(choice.message.content.unwrap_or_default());
        let mut llm_response = LlmResponse::new(response.id, response.model, message);

        if let Some(reason) = choice.finish_reason {
            llm_response = llm_response.with_finish_reason(parse_finish_reason(&reason));
        }

        if let Some(usage) = response.usage {
            llm_response =
                llm_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(model, &request);

        debug!(
            provider = self.name,
            model = model,
            prompt_chars = request.prompt_chars(),
            "Sending chat completion"
        );

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        _ => FinishReason::Stop,
    }
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

impl OpenAiMessage {
    fn from_domain(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        Self {
            role,
            content: message.content_text().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    id: String,
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18 }
        })
    }

    #[tokio::test]
    async fn test_groq_chat() {
        let client = MockHttpClient::new()
            .with_response(GROQ_URL, completion("{\"domain\":\"HEALTHCARE\"}"));
        let provider = OpenAiProvider::groq(client, "test-api-key");

        let request = LlmRequest::builder().user("Hello!").build();
        let response = provider
            .chat("llama-3.3-70b-versatile", request)
            .await
            .unwrap();

        assert_eq!(response.id, "chatcmpl-123");
        assert_eq!(response.content(), "{\"domain\":\"HEALTHCARE\"}");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().completion_tokens, 8);
        assert_eq!(provider.provider_name(), "groq");
    }

    #[tokio::test]
    async fn test_json_response_format_is_sent() {
        let client = MockHttpClient::new().with_response(GROQ_URL, completion("{}"));
        let provider = OpenAiProvider::groq(client, "key");

        let request = LlmRequest::builder().user("Hi").temperature(0.0).json_output().build();
        provider.chat("m", request).await.unwrap();

        let sent = provider.client.requests_to(GROQ_URL);
        let body = sent[0].body.clone().unwrap();
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_error_handling() {
        let client = MockHttpClient::new().with_error(GROQ_URL, "API key invalid");
        let provider = OpenAiProvider::groq(client, "invalid-key");

        let request = LlmRequest::builder().user("Hello!").build();
        let result = provider.chat("m", request).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let client = MockHttpClient::new().with_response(
            "http://localhost:8080/v1/chat/completions",
            serde_json::json!({"id": "x", "model": "m", "choices": []}),
        );
        let provider = OpenAiProvider::with_base_url(client, "key", "http://localhost:8080/");

        let result = provider.chat("m", LlmRequest::builder().user("q").build()).await;
        assert!(result.is_err());
    }
}
