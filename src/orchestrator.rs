//! Orchestrator - runs one user turn end to end.
//!
//! Each turn:
//! 1. Builds context from memory plus the new prompt
//! 2. Asks the LLM to pick a tool (or none)
//! 3. Dispatches the chosen tool calls locally
//! 4. Streams the final answer through a `FragmentSink`
//! 5. Commits the completed turn to memory

use std::ops::ControlFlow;
use std::sync::Arc;

use futures::StreamExt;

use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::memory::{ConversationMemory, ConversationTurn};
use crate::tools::{ToolInvocation, ToolRegistry};

/// Receives streamed fragments as they arrive.
///
/// Returning `ControlFlow::Break(())` cancels the rest of the stream.
pub trait FragmentSink {
    fn fragment(&mut self, text: &str) -> ControlFlow<()>;
}

impl<F> FragmentSink for F
where
    F: FnMut(&str) -> ControlFlow<()>,
{
    fn fragment(&mut self, text: &str) -> ControlFlow<()> {
        self(text)
    }
}

/// Configuration for the Orchestrator.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// Prepended to every context when set
    pub system_prompt: Option<String>,
}

/// What happened during one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    /// Tool calls dispatched, in request order
    pub invocations: Vec<ToolInvocation>,
    /// Concatenation of every fragment the sink accepted
    pub response: String,
    /// The sink stopped the stream early; the turn was not committed
    pub cancelled: bool,
}

/// Drives the tool-selection round trip and owns the conversation memory.
pub struct Orchestrator<L>
where
    L: LlmClient,
{
    llm: Arc<L>,
    registry: ToolRegistry,
    memory: ConversationMemory,
    config: OrchestratorConfig,
}

impl<L> Orchestrator<L>
where
    L: LlmClient,
{
    /// Create an Orchestrator with empty memory.
    pub fn new(llm: Arc<L>, registry: ToolRegistry) -> Self {
        Self::with_config(llm, registry, OrchestratorConfig::default())
    }

    /// Create an Orchestrator with custom configuration.
    pub fn with_config(llm: Arc<L>, registry: ToolRegistry, config: OrchestratorConfig) -> Self {
        Self {
            llm,
            registry,
            memory: ConversationMemory::new(),
            config,
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Optional system prompt, replayed memory, then the new prompt.
    pub fn build_context(&self, prompt: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.memory.len() * 2 + 2);
        if let Some(system) = &self.config.system_prompt {
            messages.push(Message::system(system));
        }
        messages.extend(self.memory.to_messages());
        messages.push(Message::user(prompt));
        messages
    }

    /// Run one user turn.
    ///
    /// Upstream failures end the turn with an error and nothing is committed.
    pub async fn run_turn<S>(&mut self, prompt: &str, sink: &mut S) -> Result<TurnReport>
    where
        S: FragmentSink + ?Sized,
    {
        let context = self.build_context(prompt);

        let selection_request =
            CompletionRequest::new(context.clone()).with_tools(self.registry.descriptors());
        let selection = self.llm.complete(selection_request).await?;

        let mut invocations = Vec::new();
        let follow_up = if selection.wants_tools() {
            let mut messages = context;
            messages.push(Message::assistant_tool_calls(
                selection.content.clone(),
                selection.tool_calls.clone(),
            ));
            for call in &selection.tool_calls {
                let invocation = self.registry.dispatch(call, self.llm.as_ref()).await?;
                log::info!("{} -> {:?}", invocation.name, invocation.status);
                messages.push(Message::tool(&invocation.call_id, &invocation.name, invocation.content()));
                invocations.push(invocation);
            }
            messages
        } else {
            log::info!("no tool selected, answering directly");
            context
        };

        let mut stream = self.llm.stream(CompletionRequest::new(follow_up)).await?;
        let mut response = String::new();
        let mut cancelled = false;

        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            if sink.fragment(&fragment).is_break() {
                cancelled = true;
                break;
            }
            response.push_str(&fragment);
        }

        if cancelled {
            log::info!("turn cancelled after {} bytes", response.len());
        } else {
            self.memory.append(ConversationTurn::new(prompt, response.clone()));
            log::debug!("memory now holds {} turns", self.memory.len());
        }

        Ok(TurnReport {
            invocations,
            response,
            cancelled,
        })
    }
}
