//! Garden tools the LLM can call
//!
//! Each tool is a plain function plus a `ToolHandler` wrapper that decodes the
//! LLM's JSON arguments. The registry maps `ToolKind` to handlers.

mod definition;
mod goals;
mod layout;
mod outcome;
mod plants;
mod registry;
mod shopping;

pub use definition::ToolKind;
pub use goals::{GardenGoals, GoalParserTool, parse_garden_goals, parse_goals_reply};
pub use layout::{LayoutTool, SECTIONS, design_layout, section_for};
pub use outcome::{ParseFailure, ParseOutcome, ToolOutput, strip_code_fence};
pub use plants::{PLANT_COUNT, PlantSuggestionTool, parse_plants_reply, placeholder_plants, suggest_plants};
pub use registry::{InvocationStatus, ToolInvocation, ToolRegistry};
pub use shopping::{
    FALLBACK_CARE_NOTES, FALLBACK_QUANTITY, ShoppingItem, ShoppingList, ShoppingListTool, fallback_list,
    generate_shopping_list, parse_shopping_reply,
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{GardenError, Result};
use crate::llm::{LlmClient, ToolDefinition};

/// A tool that can be called by the LLM
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Which tool this handler implements
    fn kind(&self) -> ToolKind;

    /// Descriptor shown to the LLM
    fn descriptor(&self) -> ToolDefinition {
        self.kind().descriptor()
    }

    /// Execute the tool with already-parsed JSON arguments
    ///
    /// Returns `GardenError::InvalidArguments` when the arguments do not fit.
    async fn call(&self, arguments: Value, llm: &dyn LlmClient) -> Result<ToolOutput>;
}

/// Decode a tool's typed arguments
pub fn decode_arguments<T: DeserializeOwned>(kind: ToolKind, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| GardenError::InvalidArguments(format!("{}: {}", kind, e)))
}
