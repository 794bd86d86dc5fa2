//! LLM Client Layer - chat-completions integration with streaming and tool calls
//!
//! This module provides:
//! - Message types for LLM communication
//! - LlmClient trait for API abstraction
//! - OpenAiClient implementation
//! - Streaming chunk parsing

pub mod client;
pub mod openai;
pub mod streaming;
pub mod types;

pub use client::{LlmClient, MockLlmClient, TextStream};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use streaming::{StreamChunk, parse_stream_chunk};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, ToolCall, ToolDefinition};
