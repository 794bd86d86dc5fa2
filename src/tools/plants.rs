//! suggest_plants tool - four plant names for a zone, sun and maintenance level

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::outcome::{ParseOutcome, ToolOutput, strip_code_fence};
use super::{ToolHandler, ToolKind, decode_arguments};
use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient};

/// Number of plants the tool always returns
pub const PLANT_COUNT: usize = 4;

/// Names used when the reply is not a list of exactly four names
pub fn placeholder_plants() -> Vec<String> {
    (1..=PLANT_COUNT).map(|i| format!("Plant {}", i)).collect()
}

fn build_prompt(zone: &str, maintenance: &str, sun: &str) -> String {
    format!(
        "Suggest {count} plants that thrive in USDA Zone {zone}, with {maintenance} maintenance \
         and {sun} sun exposure.\nReply with only a JSON array of {count} plant names, like:\n\
         [\"Lavender\", \"Agapanthus\", \"Sedum\", \"Rosemary\"]",
        count = PLANT_COUNT,
    )
}

/// Parse an LLM reply into exactly four plant names
pub fn parse_plants_reply(reply: &str) -> ParseOutcome<Vec<String>> {
    match serde_json::from_str::<Vec<String>>(strip_code_fence(reply)) {
        Ok(plants) if plants.len() == PLANT_COUNT => ParseOutcome::Parsed(plants),
        Ok(plants) => {
            log::debug!("plant reply had {} names, expected {}", plants.len(), PLANT_COUNT);
            ParseOutcome::Fallback(placeholder_plants())
        }
        Err(e) => {
            log::debug!("plant reply did not parse: {}", e);
            ParseOutcome::Fallback(placeholder_plants())
        }
    }
}

/// Ask the LLM for plants suited to the given conditions
pub async fn suggest_plants(
    llm: &dyn LlmClient,
    zone: &str,
    maintenance: &str,
    sun: &str,
) -> Result<ParseOutcome<Vec<String>>> {
    let request = CompletionRequest::default().with_user_message(build_prompt(zone, maintenance, sun));
    let response = llm.complete(request).await?;
    Ok(parse_plants_reply(response.content_text()))
}

#[derive(Debug, Deserialize)]
struct SuggestPlantsArgs {
    zone: String,
    maintenance: String,
    sun: String,
}

/// Handler for `suggest_plants`
pub struct PlantSuggestionTool;

#[async_trait]
impl ToolHandler for PlantSuggestionTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SuggestPlants
    }

    async fn call(&self, arguments: Value, llm: &dyn LlmClient) -> Result<ToolOutput> {
        let args: SuggestPlantsArgs = decode_arguments(self.kind(), arguments)?;
        let outcome = suggest_plants(llm, &args.zone, &args.maintenance, &args.sun).await?;
        Ok(ToolOutput::from_outcome(&outcome)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use serde_json::json;

    #[test]
    fn test_placeholder_plants() {
        assert_eq!(placeholder_plants(), vec!["Plant 1", "Plant 2", "Plant 3", "Plant 4"]);
    }

    #[test]
    fn test_build_prompt_mentions_inputs() {
        let prompt = build_prompt("9b", "low", "full");
        assert!(prompt.contains("USDA Zone 9b"));
        assert!(prompt.contains("low maintenance"));
        assert!(prompt.contains("full sun exposure"));
    }

    #[test]
    fn test_parse_plants_reply_valid() {
        let outcome = parse_plants_reply(r#"["Lavender", "Salvia", "Yarrow", "Penstemon"]"#);
        assert_eq!(
            outcome,
            ParseOutcome::Parsed(vec![
                "Lavender".to_string(),
                "Salvia".to_string(),
                "Yarrow".to_string(),
                "Penstemon".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_plants_reply_unparseable_uses_placeholders() {
        for reply in [
            "",
            "Lavender, Salvia, Yarrow, Penstemon",
            "['Lavender', 'Salvia', 'Yarrow', 'Penstemon']",
            r#"{"plants": ["Lavender"]}"#,
            "[1, 2, 3, 4]",
        ] {
            let outcome = parse_plants_reply(reply);
            assert_eq!(outcome, ParseOutcome::Fallback(placeholder_plants()), "reply: {}", reply);
        }
    }

    #[test]
    fn test_parse_plants_reply_wrong_count_uses_placeholders() {
        let outcome = parse_plants_reply(r#"["Lavender", "Salvia"]"#);
        assert!(outcome.is_fallback());
        assert_eq!(outcome.value().len(), PLANT_COUNT);
    }

    #[tokio::test]
    async fn test_handler_calls_llm_once() {
        let mock = MockLlmClient::new().with_text(r#"["Sage", "Thyme", "Lantana", "Coreopsis"]"#);
        let output = PlantSuggestionTool
            .call(json!({"zone": "9b", "maintenance": "low", "sun": "full"}), &mock)
            .await
            .unwrap();

        assert!(!output.used_fallback);
        assert_eq!(output.value, json!(["Sage", "Thyme", "Lantana", "Coreopsis"]));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_handler_fallback_flagged() {
        let mock = MockLlmClient::new().with_text("I recommend lavender.");
        let output = PlantSuggestionTool
            .call(json!({"zone": "5", "maintenance": "high", "sun": "partial"}), &mock)
            .await
            .unwrap();

        assert!(output.used_fallback);
        assert_eq!(output.value, json!(["Plant 1", "Plant 2", "Plant 3", "Plant 4"]));
    }
}
