//! garden-designer - a garden design assistant built on LLM tool calling
//!
//! A user prompt goes to a chat-completions service along with four garden
//! tools. The service picks a tool, the tool runs locally, and the final
//! answer is streamed back while the conversation is kept in memory.

pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod orchestrator;
pub mod tools;

pub use error::{GardenError, Result};
pub use memory::{ConversationMemory, ConversationTurn};
pub use orchestrator::{FragmentSink, Orchestrator, OrchestratorConfig, TurnReport};
