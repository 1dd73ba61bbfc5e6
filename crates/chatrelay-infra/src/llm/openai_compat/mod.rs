//! OpenAI-compatible completion gateway.
//!
//! One [`OpenAiCompletionGateway`] talks to any endpoint speaking the OpenAI
//! chat completions protocol (configurable base URL). Each call sends the
//! configured system prompt followed by the user's text and returns the
//! first choice's content.
//!
//! Uses [`async_openai`] for type-safe request/response handling.

pub mod config;

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    CreateChatCompletionResponse,
};
use backoff::ExponentialBackoff;
use secrecy::ExposeSecret;
use tracing::field::Empty;
use tracing::{Instrument, debug, info_span};

use chatrelay_core::llm::gateway::CompletionGateway;
use chatrelay_observe::genai_attrs::{
    GEN_AI_RESPONSE_ID, GEN_AI_RESPONSE_MODEL, GEN_AI_USAGE_INPUT_TOKENS,
    GEN_AI_USAGE_OUTPUT_TOKENS, OP_CHAT,
};
use chatrelay_types::error::GatewayError;

use self::config::OpenAiCompatConfig;

/// Completion gateway for any OpenAI-compatible API.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiCompletionGateway {
    /// `None` when no API key is configured.
    client: Option<Client<OpenAIConfig>>,
    provider_name: String,
    model: String,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiCompletionGateway {
    /// Create a gateway from a configuration. Never fails; a missing key
    /// yields a gateway whose calls report [`GatewayError::Unavailable`].
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let client = config.api_key.as_ref().map(|key| {
            let openai_config = OpenAIConfig::new()
                .with_api_key(key.expose_secret())
                .with_api_base(&config.base_url);
            Client::with_config(openai_config).with_backoff(single_attempt())
        });

        Self {
            client,
            provider_name: config.provider_name,
            model: config.model,
            system_prompt: config.system_prompt,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.timeout,
        }
    }

    /// The model requested on every call.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build a two-message request: system prompt, then the user's text.
    fn build_request(&self, prompt: &str) -> CreateChatCompletionRequest {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(self.system_prompt.clone()),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                name: None,
            }),
        ];

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_completion_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            n: Some(1),
            ..Default::default()
        }
    }
}

impl CompletionGateway for OpenAiCompletionGateway {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let Some(client) = &self.client else {
            debug!(provider = %self.provider_name, "No API key set; skipping completion call");
            return Err(GatewayError::Unavailable);
        };

        let request = self.build_request(prompt);

        let span = info_span!(
            "chat",
            gen_ai.operation.name = OP_CHAT,
            gen_ai.provider.name = %self.provider_name,
            gen_ai.request.model = %self.model,
            gen_ai.request.max_tokens = self.max_tokens,
            gen_ai.response.id = Empty,
            gen_ai.response.model = Empty,
            gen_ai.usage.input_tokens = Empty,
            gen_ai.usage.output_tokens = Empty,
        );

        let call = async {
            let response = tokio::time::timeout(self.timeout, client.chat().create(request))
                .await
                .map_err(|_| {
                    GatewayError::RequestFailed(format!(
                        "timed out after {}ms",
                        self.timeout.as_millis()
                    ))
                })?
                .map_err(map_openai_error)?;

            record_response(&response);
            extract_text(&response)
        };

        call.instrument(span).await
    }
}

/// Backoff that gives up after the first failure. async-openai retries 5xx
/// and 429 responses by default; each `complete` call makes one request.
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..Default::default()
    }
}

/// Record response metadata on the current completion span.
fn record_response(response: &CreateChatCompletionResponse) {
    let span = tracing::Span::current();
    span.record(GEN_AI_RESPONSE_ID, response.id.as_str());
    span.record(GEN_AI_RESPONSE_MODEL, response.model.as_str());
    if let Some(usage) = &response.usage {
        span.record(GEN_AI_USAGE_INPUT_TOKENS, usage.prompt_tokens);
        span.record(GEN_AI_USAGE_OUTPUT_TOKENS, usage.completion_tokens);
    }
}

/// First choice's content, trimmed; blank or missing content is an empty response.
fn extract_text(response: &CreateChatCompletionResponse) -> Result<String, GatewayError> {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(GatewayError::EmptyResponse)
}

/// Map an `async_openai::error::OpenAIError` to a [`GatewayError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> GatewayError {
    use async_openai::error::OpenAIError;

    let detail = match &err {
        OpenAIError::ApiError(api_err) => match api_err.code.as_deref() {
            Some(code) => format!("{code}: {}", api_err.message),
            None => api_err.message.clone(),
        },
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status() {
            Some(status) => format!("HTTP {status}: {reqwest_err}"),
            None => format!("transport error: {reqwest_err}"),
        },
        OpenAIError::JSONDeserialize(_, content) => {
            format!("failed to parse response: {content}")
        }
        _ => err.to_string(),
    };

    GatewayError::RequestFailed(detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::post;
    use axum::{Json, Router};
    use chatrelay_types::config::CompletionConfig;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_config(base_url: &str, api_key: Option<&str>) -> OpenAiCompatConfig {
        let settings = CompletionConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        OpenAiCompatConfig::from_settings(&settings, api_key.map(|key| SecretString::from(key.to_string())))
    }

    fn completion_body(content: Value) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_760_000_000u32,
            "model": "gpt-3.5-turbo-0125",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content, "refusal": null },
                "finish_reason": "stop",
                "logprobs": null
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
        })
    }

    /// Serve `router` on an ephemeral port and return its OpenAI-style base URL.
    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    /// Replies with "[<system prompt>] <user text>" padded with whitespace.
    async fn echo_handler(Json(body): Json<Value>) -> Json<Value> {
        let system = body["messages"][0]["content"].as_str().unwrap_or_default().to_string();
        let user = body["messages"][1]["content"].as_str().unwrap_or_default().to_string();
        Json(completion_body(json!(format!("  [{system}] {user}\n"))))
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let gateway = OpenAiCompletionGateway::new(test_config("http://127.0.0.1:9/v1", None));
        assert!(!gateway.is_configured());
        assert_eq!(gateway.name(), "openai");
        assert_eq!(gateway.model(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_build_request_shape() {
        let gateway =
            OpenAiCompletionGateway::new(test_config("http://127.0.0.1:9/v1", Some("sk-test")));
        let request = gateway.build_request("hello");

        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.messages.len(), 2);
        assert!(matches!(request.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(request.messages[1], ChatCompletionRequestMessage::User(_)));
        assert_eq!(request.max_completion_tokens, Some(150));
        assert_eq!(request.n, Some(1));
        assert_eq!(request.temperature, Some(0.8));
    }

    #[tokio::test]
    async fn test_missing_key_fails_unavailable_without_network() {
        // Port 9 (discard) is never contacted: the key check comes first.
        let gateway = OpenAiCompletionGateway::new(test_config("http://127.0.0.1:9/v1", None));
        let err = gateway.complete("hello").await.unwrap_err();
        assert_eq!(err, GatewayError::Unavailable);
    }

    #[tokio::test]
    async fn test_complete_returns_trimmed_text() {
        let base_url = spawn_mock(Router::new().route("/v1/chat/completions", post(echo_handler))).await;
        let gateway = OpenAiCompletionGateway::new(test_config(&base_url, Some("sk-test")));

        let text = gateway.complete("hello").await.unwrap();
        assert_eq!(text, "[You are a helpful assistant.] hello");
    }

    #[tokio::test]
    async fn test_blank_content_is_empty_response() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(completion_body(json!(" \n "))) }),
        );
        let base_url = spawn_mock(router).await;
        let gateway = OpenAiCompletionGateway::new(test_config(&base_url, Some("sk-test")));

        let err = gateway.complete("hello").await.unwrap_err();
        assert_eq!(err, GatewayError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_null_content_is_empty_response() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(completion_body(Value::Null)) }),
        );
        let base_url = spawn_mock(router).await;
        let gateway = OpenAiCompletionGateway::new(test_config(&base_url, Some("sk-test")));

        let err = gateway.complete("hello").await.unwrap_err();
        assert_eq!(err, GatewayError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_error_status_is_request_failed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": {
                            "message": "model not found",
                            "type": "invalid_request_error",
                            "param": null,
                            "code": "model_not_found"
                        }
                    })),
                )
            }),
        );
        let base_url = spawn_mock(router).await;
        let gateway = OpenAiCompletionGateway::new(test_config(&base_url, Some("sk-test")));

        let err = gateway.complete("hello").await.unwrap_err();
        assert!(matches!(err, GatewayError::RequestFailed(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (
                        axum::http::StatusCode::SERVICE_UNAVAILABLE,
                        Json(json!({
                            "error": {
                                "message": "upstream overloaded",
                                "type": "server_error",
                                "param": null,
                                "code": null
                            }
                        })),
                    )
                }
            }),
        );
        let base_url = spawn_mock(router).await;
        let mut config = test_config(&base_url, Some("sk-test"));
        config.timeout = Duration::from_secs(4);
        let gateway = OpenAiCompletionGateway::new(config);

        let err = gateway.complete("hello").await.unwrap_err();
        match err {
            GatewayError::RequestFailed(msg) => {
                assert!(msg.contains("upstream overloaded"), "got {msg}");
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out_as_request_failed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(completion_body(json!("too late")))
            }),
        );
        let base_url = spawn_mock(router).await;
        let mut config = test_config(&base_url, Some("sk-test"));
        config.timeout = Duration::from_millis(200);
        let gateway = OpenAiCompletionGateway::new(config);

        let err = gateway.complete("hello").await.unwrap_err();
        match err {
            GatewayError::RequestFailed(msg) => assert!(msg.contains("timed out")),
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_map_openai_error_invalid_argument() {
        let err = map_openai_error(async_openai::error::OpenAIError::InvalidArgument(
            "bad model".to_string(),
        ));
        match err {
            GatewayError::RequestFailed(msg) => assert!(msg.contains("bad model")),
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }
}
