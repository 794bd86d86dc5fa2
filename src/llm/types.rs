//! LLM types for chat-completions communication
//!
//! This module defines the message, tool and request/response types shared by
//! every `LlmClient` implementation.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    /// Tool calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Id of the call a tool message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Name of the tool that produced a tool message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    fn with_role(role: Role, content: Option<String>) -> Self {
        Self {
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, Some(content.into()))
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, Some(content.into()))
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, Some(content.into()))
    }

    /// Create the assistant message that requested tool calls
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::with_role(Role::Assistant, content)
        }
    }

    /// Create a tool result message answering `tool_call_id`
    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            ..Self::with_role(Role::Tool, Some(content.into()))
        }
    }

    /// Text content, empty when absent
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// A tool call from the LLM
///
/// `arguments` is kept as the raw JSON-encoded string the service sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Convert to the OpenAI wire format
    pub fn to_openai(&self) -> Value {
        json!({
            "id": self.id,
            "type": "function",
            "function": {
                "name": self.name,
                "arguments": self.arguments
            }
        })
    }
}

/// Tool descriptor exposed to the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Convert to OpenAI API schema format
    pub fn to_openai_schema(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters
            }
        })
    }

    /// Names listed under the schema's `required` key
    pub fn required_fields(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(|r| r.as_array())
            .map(|fields| fields.iter().filter_map(|f| f.as_str()).collect())
            .unwrap_or_default()
    }

    /// Whether the schema declares `field` under `properties`
    pub fn declares_property(&self, field: &str) -> bool {
        self.parameters
            .get("properties")
            .and_then(|p| p.as_object())
            .is_some_and(|props| props.contains_key(field))
    }
}

/// Request to the LLM for completion
///
/// Tools, when present, are offered with `tool_choice = "auto"`.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
}

impl CompletionRequest {
    /// Create a request from an ordered message list
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Add a message to the request
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Add a user message
    pub fn with_user_message(self, content: impl Into<String>) -> Self {
        self.with_message(Message::user(content))
    }

    /// Offer tools, letting the model choose
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// Response from the LLM
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl CompletionResponse {
    /// A plain text response
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// A response requesting tool calls
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    /// Whether the model asked for at least one tool
    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Text content, empty when absent
    pub fn content_text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), "\"tool\"");
    }

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), "Hello");

        let msg = Message::tool("call_1", "design_layout", "\"layout\"");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.name.as_deref(), Some("design_layout"));
    }

    #[test]
    fn test_assistant_tool_calls_message() {
        let call = ToolCall::new("call_1", "suggest_plants", "{}");
        let msg = Message::assistant_tool_calls(None, vec![call.clone()]);
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.text(), "");
        assert_eq!(msg.tool_calls, vec![call]);
    }

    #[test]
    fn test_tool_call_to_openai() {
        let call = ToolCall::new("call_9", "parse_garden_goals", r#"{"description":"x"}"#);
        let wire = call.to_openai();
        assert_eq!(wire["id"], "call_9");
        assert_eq!(wire["type"], "function");
        assert_eq!(wire["function"]["name"], "parse_garden_goals");
        assert_eq!(wire["function"]["arguments"], r#"{"description":"x"}"#);
    }

    #[test]
    fn test_tool_definition_schema_helpers() {
        let tool = ToolDefinition::new(
            "generate_shopping_list",
            "Generates a plant shopping list.",
            json!({
                "type": "object",
                "properties": { "plants": { "type": "array", "items": { "type": "string" } } },
                "required": ["plants"]
            }),
        );

        assert_eq!(tool.required_fields(), vec!["plants"]);
        assert!(tool.declares_property("plants"));
        assert!(!tool.declares_property("theme"));

        let schema = tool.to_openai_schema();
        assert_eq!(schema["type"], "function");
        assert_eq!(schema["function"]["name"], "generate_shopping_list");
    }

    #[test]
    fn test_with_tools_keeps_messages() {
        let req = CompletionRequest::default()
            .with_user_message("hi")
            .with_tools(vec![ToolDefinition::new("t", "d", json!({}))]);
        assert_eq!(req.tools.len(), 1);
        assert_eq!(req.messages.len(), 1);
    }

    #[test]
    fn test_response_wants_tools() {
        assert!(!CompletionResponse::text("hello").wants_tools());
        let response = CompletionResponse::tool_calls(vec![ToolCall::new("c", "design_layout", "{}")]);
        assert!(response.wants_tools());
        assert_eq!(response.content_text(), "");
    }
}
