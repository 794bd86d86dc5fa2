//! Tool registry - maps tool kinds to handlers and dispatches LLM tool calls

use std::collections::BTreeMap;

use serde_json::{Value, json};

use super::{GoalParserTool, LayoutTool, PlantSuggestionTool, ShoppingListTool, ToolHandler, ToolKind};
use crate::error::{GardenError, Result};
use crate::llm::{LlmClient, ToolCall, ToolDefinition};

/// How a dispatched call was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStatus {
    /// Handler ran and the LLM reply parsed (or the tool is local)
    Parsed,
    /// Handler ran and substituted its fallback value
    Fallback,
    /// No handler for the requested name
    UnknownTool,
    /// Arguments were not valid JSON or did not fit the tool
    InvalidArguments,
}

/// Record of one dispatched tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub call_id: String,
    pub name: String,
    pub kind: Option<ToolKind>,
    pub status: InvocationStatus,
    pub result: Value,
}

impl ToolInvocation {
    /// JSON-encoded result, used as the tool message content
    pub fn content(&self) -> String {
        self.result.to_string()
    }

    fn unknown(call: &ToolCall) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            kind: None,
            status: InvocationStatus::UnknownTool,
            result: json!({"error": "Unknown function"}),
        }
    }

    fn invalid(call: &ToolCall, kind: ToolKind, detail: String) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            kind: Some(kind),
            status: InvocationStatus::InvalidArguments,
            result: json!({"error": "Invalid arguments", "detail": detail}),
        }
    }
}

/// Handlers keyed by tool kind
#[derive(Default)]
pub struct ToolRegistry {
    handlers: BTreeMap<ToolKind, Box<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the four garden tools
    pub fn standard() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(GoalParserTool))?;
        registry.register(Box::new(PlantSuggestionTool))?;
        registry.register(Box::new(LayoutTool))?;
        registry.register(Box::new(ShoppingListTool))?;
        Ok(registry)
    }

    /// Add a handler, checking its descriptor against its kind
    pub fn register(&mut self, handler: Box<dyn ToolHandler>) -> Result<()> {
        let kind = handler.kind();
        let descriptor = handler.descriptor();

        if descriptor.name != kind.name() {
            return Err(GardenError::Registry(format!(
                "handler for '{}' describes itself as '{}'",
                kind, descriptor.name
            )));
        }

        if let Some(field) = descriptor
            .required_fields()
            .into_iter()
            .find(|field| !descriptor.declares_property(field))
        {
            return Err(GardenError::Registry(format!(
                "'{}' requires undeclared parameter '{}'",
                kind, field
            )));
        }

        if self.handlers.contains_key(&kind) {
            return Err(GardenError::Registry(format!("'{}' is already registered", kind)));
        }

        log::debug!("registered tool {}", kind);
        self.handlers.insert(kind, handler);
        Ok(())
    }

    /// Descriptors of every registered handler, in kind order
    pub fn descriptors(&self) -> Vec<ToolDefinition> {
        self.handlers.values().map(|h| h.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run one LLM tool call
    ///
    /// Unknown names and bad arguments become error records for the LLM;
    /// only upstream failures inside a handler are returned as `Err`.
    pub async fn dispatch(&self, call: &ToolCall, llm: &dyn LlmClient) -> Result<ToolInvocation> {
        let Some((kind, handler)) = ToolKind::from_name(&call.name)
            .and_then(|kind| self.handlers.get(&kind).map(|h| (kind, h)))
        else {
            log::warn!("LLM requested unknown tool '{}'", call.name);
            return Ok(ToolInvocation::unknown(call));
        };

        let arguments = match parse_arguments(&call.arguments) {
            Ok(arguments) => arguments,
            Err(detail) => {
                log::warn!("bad arguments for {}: {}", kind, detail);
                return Ok(ToolInvocation::invalid(call, kind, detail));
            }
        };

        log::info!("dispatching {} ({})", kind, call.id);
        match handler.call(arguments, llm).await {
            Ok(output) => Ok(ToolInvocation {
                call_id: call.id.clone(),
                name: call.name.clone(),
                kind: Some(kind),
                status: if output.used_fallback {
                    InvocationStatus::Fallback
                } else {
                    InvocationStatus::Parsed
                },
                result: output.value,
            }),
            Err(GardenError::InvalidArguments(detail)) => {
                log::warn!("bad arguments for {}: {}", kind, detail);
                Ok(ToolInvocation::invalid(call, kind, detail))
            }
            Err(e) => Err(e),
        }
    }
}

/// Parse the JSON-encoded argument string; an empty string means no arguments
fn parse_arguments(raw: &str) -> std::result::Result<Value, String> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(format!("arguments must be a JSON object, got {}", other)),
        Err(e) => Err(format!("arguments are not valid JSON: {}", e)),
    }
}
