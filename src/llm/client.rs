//! Core LLM client trait and a scripted client for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};

use crate::error::{GardenError, Result};
use crate::llm::types::{CompletionRequest, CompletionResponse};

/// Ordered text fragments of one streamed completion
pub type TextStream = BoxStream<'static, Result<String>>;

/// Stateless LLM client - each call carries its full context
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request, may contain tool calls
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Streamed completion; fragments arrive in order until the stream ends
    async fn stream(&self, request: CompletionRequest) -> Result<TextStream>;
}

/// Scripted LLM client
///
/// Replays queued responses in order and records every request it receives.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    completions: Mutex<VecDeque<CompletionResponse>>,
    streams: Mutex<VecDeque<Vec<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `complete` call
    pub fn with_completion(self, response: CompletionResponse) -> Self {
        lock(&self.completions).push_back(response);
        self
    }

    /// Queue a plain text response for the next `complete` call
    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_completion(CompletionResponse::text(content))
    }

    /// Queue fragments for the next `stream` call
    pub fn with_stream<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.streams).push_back(fragments.into_iter().map(Into::into).collect());
        self
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        lock(&self.requests).push(request);
        lock(&self.completions)
            .pop_front()
            .ok_or_else(|| GardenError::Llm("mock has no scripted completion left".to_string()))
    }

    async fn stream(&self, request: CompletionRequest) -> Result<TextStream> {
        lock(&self.requests).push(request);
        let fragments = lock(&self.streams)
            .pop_front()
            .ok_or_else(|| GardenError::Llm("mock has no scripted stream left".to_string()))?;
        Ok(stream::iter(fragments.into_iter().map(Ok)).boxed())
    }
}
