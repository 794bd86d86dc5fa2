//! Tool identifiers and the static descriptors shown to the LLM

use std::fmt;

use serde_json::json;

use crate::llm::ToolDefinition;

/// The closed set of garden tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolKind {
    ParseGoals,
    SuggestPlants,
    DesignLayout,
    ShoppingList,
}

impl ToolKind {
    /// Every tool, in descriptor order
    pub const ALL: [ToolKind; 4] = [
        ToolKind::ParseGoals,
        ToolKind::SuggestPlants,
        ToolKind::DesignLayout,
        ToolKind::ShoppingList,
    ];

    /// Name the LLM uses to call the tool
    pub fn name(&self) -> &'static str {
        match self {
            Self::ParseGoals => "parse_garden_goals",
            Self::SuggestPlants => "suggest_plants",
            Self::DesignLayout => "design_layout",
            Self::ShoppingList => "generate_shopping_list",
        }
    }

    /// Resolve a tool name from an LLM tool call
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Static descriptor for this tool
    pub fn descriptor(&self) -> ToolDefinition {
        match self {
            Self::ParseGoals => ToolDefinition::new(
                self.name(),
                "Parses a garden description into structured goals.",
                json!({
                    "type": "object",
                    "properties": {
                        "description": {"type": "string"}
                    },
                    "required": ["description"]
                }),
            ),
            Self::SuggestPlants => ToolDefinition::new(
                self.name(),
                "Suggests plants for a zone and maintenance level.",
                json!({
                    "type": "object",
                    "properties": {
                        "zone": {"type": "string"},
                        "maintenance": {"type": "string"},
                        "sun": {"type": "string"}
                    },
                    "required": ["zone", "maintenance", "sun"]
                }),
            ),
            Self::DesignLayout => ToolDefinition::new(
                self.name(),
                "Creates a garden layout using selected plants and theme.",
                json!({
                    "type": "object",
                    "properties": {
                        "plants": {"type": "array", "items": {"type": "string"}},
                        "theme": {"type": "string"}
                    },
                    "required": ["plants", "theme"]
                }),
            ),
            Self::ShoppingList => ToolDefinition::new(
                self.name(),
                "Generates a plant shopping list.",
                json!({
                    "type": "object",
                    "properties": {
                        "plants": {"type": "array", "items": {"type": "string"}}
                    },
                    "required": ["plants"]
                }),
            ),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
