use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::ai::{ChatCompletion, ChatRequest, ChatService};
use crate::Result;
use async_trait::async_trait;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

pub struct OpenAiChatClient {
    http: OpenAiHttpClient,
}

impl OpenAiChatClient {
    pub fn new(api_key: String, client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new(api_key, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl ChatService for OpenAiChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let body = ChatCompletionRequest {
            model: request.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(request.prompt.clone()),
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response: ChatCompletionResponse =
            self.http.post("/v1/chat/completions", &body).await?;

        // No choices is an empty answer rather than a failure.
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(ChatCompletion {
            id: response.id,
            text: text.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(prompt: &str) -> ChatRequest {
        ChatRequest {
            prompt: prompt.to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 512,
            temperature: 0.7,
        }
    }

    fn make_client(server: &MockServer, api_key: &str) -> OpenAiChatClient {
        OpenAiChatClient::new(api_key.to_string(), reqwest::Client::new())
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_complete_parses_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-123",
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "  hello there \n"
                    },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let completion = make_client(&server, "test-key")
            .complete(&request("hi"))
            .await
            .unwrap();

        assert_eq!(completion.id.as_deref(), Some("chatcmpl-123"));
        assert_eq!(completion.text, "hello there");
    }

    #[tokio::test]
    async fn test_complete_sends_model_and_sampling_settings() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": 512,
                "messages": [
                    { "role": "system", "content": "You are a helpful assistant." },
                    { "role": "user", "content": "hi" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "message": { "role": "assistant", "content": "ok" },
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server, "key")
            .complete(&request("hi"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "id": "x", "choices": [] })),
            )
            .mount(&server)
            .await;

        let completion = make_client(&server, "key")
            .complete(&request("hi"))
            .await
            .unwrap();
        assert_eq!(completion.text, "");
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = make_client(&server, "key")
            .complete(&request("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
        assert!(err.to_string().contains("rate limited"));
    }
}
