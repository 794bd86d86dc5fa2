//! OpenAI chat-completions client implementation
//!
//! This module implements the LlmClient trait for any OpenAI-compatible
//! `/chat/completions` endpoint, including SSE streaming.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource, retry};
use serde_json::{Value, json};

use crate::error::{GardenError, Result};
use crate::llm::client::{LlmClient, TextStream};
use crate::llm::streaming::{StreamChunk, parse_stream_chunk};
use crate::llm::types::{CompletionRequest, CompletionResponse, Message, Role, ToolCall};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model to use
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for the OpenAI client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl OpenAiConfig {
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// OpenAI API client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client, reading the key from `api_key_env`
    pub fn from_env(api_key_env: &str, config: OpenAiConfig) -> Result<Self> {
        let api_key = std::env::var(api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GardenError::MissingApiKey {
                env_var: api_key_env.to_string(),
            })?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GardenError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Build the request body for the chat-completions API
    fn build_request(&self, request: &CompletionRequest, stream: bool) -> Value {
        let messages: Vec<Value> = request.messages.iter().map(message_to_wire).collect();

        let mut body = json!({
            "model": self.config.model,
            "messages": messages
        });

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request.tools.iter().map(|t| t.to_openai_schema()).collect();
            body["tools"] = json!(tools);
            body["tool_choice"] = json!("auto");
            body["parallel_tool_calls"] = json!(false);
        }

        if stream {
            body["stream"] = json!(true);
        }

        body
    }

    /// Parse the API response into a CompletionResponse
    fn parse_response(body: Value) -> Result<CompletionResponse> {
        let choice = body["choices"]
            .get(0)
            .ok_or_else(|| GardenError::Llm("Response contained no choices".to_string()))?;
        let message = &choice["message"];

        let content = message["content"]
            .as_str()
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        let mut tool_calls: Vec<ToolCall> = message["tool_calls"]
            .as_array()
            .map(|calls| calls.iter().filter_map(parse_tool_call).collect())
            .unwrap_or_default();

        // Legacy single function_call shape
        if tool_calls.is_empty()
            && let Some(name) = message["function_call"]["name"].as_str()
        {
            let arguments = message["function_call"]["arguments"].as_str().unwrap_or("{}");
            tool_calls.push(ToolCall::new("function_call", name, arguments));
        }

        Ok(CompletionResponse { content, tool_calls })
    }

    fn post(&self, body: &Value) -> reqwest::RequestBuilder {
        self.client
            .post(self.config.completions_url())
            .bearer_auth(&self.api_key)
            .json(body)
    }

    /// Send a non-streaming request
    async fn send_request(&self, body: Value) -> Result<Value> {
        let response = self.post(&body).send().await?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(GardenError::RateLimited {
                retry_after_secs: retry_after(&response),
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GardenError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GardenError::Llm(format!("Failed to parse response: {}", e)))
    }
}

fn message_to_wire(message: &Message) -> Value {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    let mut wire = json!({
        "role": role,
        "content": message.content
    });

    if !message.tool_calls.is_empty() {
        let calls: Vec<Value> = message.tool_calls.iter().map(|c| c.to_openai()).collect();
        wire["tool_calls"] = json!(calls);
    }
    if let Some(id) = &message.tool_call_id {
        wire["tool_call_id"] = json!(id);
    }

    wire
}

/// Seconds from the `retry-after` header, 60 when absent
fn retry_after(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(60)
}

fn parse_tool_call(call: &Value) -> Option<ToolCall> {
    let id = call["id"].as_str()?;
    let name = call["function"]["name"].as_str()?;
    let arguments = call["function"]["arguments"].as_str().unwrap_or("");
    Some(ToolCall::new(id, name, arguments))
}

async fn stream_error(error: reqwest_eventsource::Error) -> GardenError {
    match error {
        reqwest_eventsource::Error::InvalidStatusCode(status, response) => {
            if status.as_u16() == 429 {
                return GardenError::RateLimited {
                    retry_after_secs: retry_after(&response),
                };
            }
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            GardenError::Api {
                status: status.as_u16(),
                message,
            }
        }
        reqwest_eventsource::Error::Transport(e) => GardenError::Network(e),
        other => GardenError::Stream(other.to_string()),
    }
}

/// Adapt an event source into a stream of text fragments
///
/// The source is closed on `[DONE]`, on error, and when the stream is dropped.
fn text_stream(source: EventSource) -> TextStream {
    stream::unfold(Some(source), |state| async move {
        let mut source = state?;
        loop {
            match source.next().await {
                Some(Ok(Event::Open)) => continue,
                Some(Ok(Event::Message(message))) => match parse_stream_chunk(&message.data) {
                    Ok(StreamChunk::Text(text)) => return Some((Ok(text), Some(source))),
                    Ok(StreamChunk::Empty) => continue,
                    Ok(StreamChunk::Done) => {
                        source.close();
                        return None;
                    }
                    Err(e) => {
                        source.close();
                        return Some((Err(e), None));
                    }
                },
                Some(Err(reqwest_eventsource::Error::StreamEnded)) | None => return None,
                Some(Err(e)) => {
                    source.close();
                    return Some((Err(stream_error(e).await), None));
                }
            }
        }
    })
    .boxed()
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request, false);
        log::debug!(
            "chat completion: {} messages, {} tools",
            request.messages.len(),
            request.tools.len()
        );
        let response = self.send_request(body).await?;
        Self::parse_response(response)
    }

    async fn stream(&self, request: CompletionRequest) -> Result<TextStream> {
        let body = self.build_request(&request, true);
        log::debug!("streamed chat completion: {} messages", request.messages.len());
        let mut source = EventSource::new(self.post(&body))
            .map_err(|e| GardenError::Llm(format!("Failed to open event stream: {}", e)))?;
        source.set_retry_policy(Box::new(retry::Never));
        Ok(text_stream(source))
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
