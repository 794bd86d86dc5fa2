//! design_layout tool - assign plants to garden sections

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::outcome::ToolOutput;
use super::{ToolHandler, ToolKind, decode_arguments};
use crate::error::Result;
use crate::llm::LlmClient;

/// Sections assigned in order, repeating after the last
pub const SECTIONS: [&str; 6] = ["Front", "Middle", "Back", "Accent", "Corner", "Path Border"];

/// Section for the plant at `index`
pub fn section_for(index: usize) -> &'static str {
    SECTIONS[index % SECTIONS.len()]
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Build the layout text for `plants` under `theme`
pub fn design_layout(plants: &[String], theme: &str) -> String {
    let mut layout = format!("{} Garden Layout:\n", title_case(theme));
    for (i, plant) in plants.iter().enumerate() {
        layout.push_str(&format!("- {}: {}\n", section_for(i), plant));
    }
    layout
}

#[derive(Debug, Deserialize)]
struct DesignLayoutArgs {
    plants: Vec<String>,
    theme: String,
}

/// Handler for `design_layout`; never calls the LLM
pub struct LayoutTool;

#[async_trait]
impl ToolHandler for LayoutTool {
    fn kind(&self) -> ToolKind {
        ToolKind::DesignLayout
    }

    async fn call(&self, arguments: Value, _llm: &dyn LlmClient) -> Result<ToolOutput> {
        let args: DesignLayoutArgs = decode_arguments(self.kind(), arguments)?;
        Ok(ToolOutput::parsed(Value::String(design_layout(&args.plants, &args.theme))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use serde_json::json;

    fn plants(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("peaceful flower"), "Peaceful Flower");
        assert_eq!(title_case("DRY creek-bed"), "Dry Creek-Bed");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_design_layout_format() {
        let layout = design_layout(&plants(&["Lavender", "Salvia"]), "peaceful");
        assert_eq!(
            layout,
            "Peaceful Garden Layout:\n- Front: Lavender\n- Middle: Salvia\n"
        );
    }

    #[test]
    fn test_design_layout_sections_cycle() {
        let names: Vec<String> = (0..14).map(|i| format!("P{}", i)).collect();
        let layout = design_layout(&names, "cottage");
        let lines: Vec<&str> = layout.lines().skip(1).collect();

        assert_eq!(lines.len(), names.len());
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(*line, format!("- {}: P{}", SECTIONS[i % 6], i));
        }
        assert_eq!(lines[6], "- Front: P6");
        assert_eq!(lines[11], "- Path Border: P11");
    }

    #[test]
    fn test_design_layout_is_deterministic() {
        let names = plants(&["Fern", "Hosta", "Astilbe", "Heuchera", "Bleeding Heart", "Hellebore", "Ginger"]);
        assert_eq!(design_layout(&names, "woodland shade"), design_layout(&names, "woodland shade"));
    }

    #[test]
    fn test_design_layout_no_plants() {
        assert_eq!(design_layout(&[], "empty"), "Empty Garden Layout:\n");
    }

    #[tokio::test]
    async fn test_handler_does_not_call_llm() {
        let mock = MockLlmClient::new();
        let output = LayoutTool
            .call(json!({"plants": ["Rose"], "theme": "romantic"}), &mock)
            .await
            .unwrap();

        assert_eq!(output.value, json!("Romantic Garden Layout:\n- Front: Rose\n"));
        assert!(!output.used_fallback);
        assert_eq!(mock.request_count(), 0);
    }
}
