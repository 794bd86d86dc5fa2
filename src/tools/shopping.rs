//! generate_shopping_list tool - quantity and care notes per plant

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::outcome::{ParseOutcome, ToolOutput, strip_code_fence};
use super::{ToolHandler, ToolKind, decode_arguments};
use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient};

/// Quantity used when the reply could not be parsed
pub const FALLBACK_QUANTITY: u32 = 3;

/// Care note used when the reply could not be parsed
pub const FALLBACK_CARE_NOTES: &str = "Generic care.";

/// One shopping list line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    #[serde(alias = "Quantity", deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    #[serde(alias = "careNotes", alias = "Care Notes")]
    pub care_notes: String,
}

impl ShoppingItem {
    pub fn new(quantity: u32, care_notes: impl Into<String>) -> Self {
        Self {
            quantity,
            care_notes: care_notes.into(),
        }
    }
}

fn lenient_quantity<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let quantity = match &value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    quantity
        .and_then(|q| u32::try_from(q).ok())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid quantity {}", value)))
}

/// Plant name to shopping item, in reply order
pub type ShoppingList = IndexMap<String, ShoppingItem>;

/// One entry per plant with the generic quantity and care note
pub fn fallback_list(plants: &[String]) -> ShoppingList {
    plants
        .iter()
        .map(|plant| (plant.clone(), ShoppingItem::new(FALLBACK_QUANTITY, FALLBACK_CARE_NOTES)))
        .collect()
}

fn build_prompt(plants: &[String]) -> String {
    format!(
        "Give a shopping list with quantity and care notes for: {}.\n\
         Reply with only a JSON object that maps each plant name to \
         {{\"quantity\": <integer>, \"care_notes\": <string>}}.",
        plants.join(", ")
    )
}

fn parse_list(reply: &str) -> Option<ShoppingList> {
    let list: ShoppingList = serde_json::from_str(strip_code_fence(reply)).ok()?;
    (!list.is_empty()).then_some(list)
}

/// Parse an LLM reply, falling back to one generic entry per plant
pub fn parse_shopping_reply(reply: &str, plants: &[String]) -> ParseOutcome<ShoppingList> {
    match parse_list(reply) {
        Some(list) => ParseOutcome::Parsed(list),
        None => {
            log::debug!("shopping reply did not parse, using fallback for {} plants", plants.len());
            ParseOutcome::Fallback(fallback_list(plants))
        }
    }
}

/// Ask the LLM for a shopping list covering `plants`
pub async fn generate_shopping_list(
    llm: &dyn LlmClient,
    plants: &[String],
) -> Result<ParseOutcome<ShoppingList>> {
    if plants.is_empty() {
        return Ok(ParseOutcome::Fallback(ShoppingList::new()));
    }

    let request = CompletionRequest::default().with_user_message(build_prompt(plants));
    let response = llm.complete(request).await?;
    Ok(parse_shopping_reply(response.content_text(), plants))
}

#[derive(Debug, Deserialize)]
struct ShoppingListArgs {
    plants: Vec<String>,
}

/// Handler for `generate_shopping_list`
pub struct ShoppingListTool;

#[async_trait]
impl ToolHandler for ShoppingListTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ShoppingList
    }

    async fn call(&self, arguments: Value, llm: &dyn LlmClient) -> Result<ToolOutput> {
        let args: ShoppingListArgs = decode_arguments(self.kind(), arguments)?;
        let outcome = generate_shopping_list(llm, &args.plants).await?;
        Ok(ToolOutput::from_outcome(&outcome)?)
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
    fn test_build_prompt_joins_plants() {
        let prompt = build_prompt(&plants(&["Lavender", "Sage"]));
        assert!(prompt.starts_with("Give a shopping list with quantity and care notes for: Lavender, Sage."));
    }

    #[test]
    fn test_parse_reply_valid_keeps_order() {
        let reply = r#"{
            "Sage": {"quantity": 2, "care_notes": "Prune in spring."},
            "Lavender": {"quantity": 5, "care_notes": "Full sun, little water."}
        }"#;
        let outcome = parse_shopping_reply(reply, &plants(&["Lavender", "Sage"]));
        let list = outcome.parsed().unwrap();

        let names: Vec<&str> = list.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Sage", "Lavender"]);
        assert_eq!(list.get("Lavender"), Some(&ShoppingItem::new(5, "Full sun, little water.")));
    }

    #[test]
    fn test_parse_reply_accepts_alternate_keys() {
        let reply = r#"{"Yarrow": {"Quantity": "4", "Care Notes": "Deadhead often."}}"#;
        let outcome = parse_shopping_reply(reply, &plants(&["Yarrow"]));
        assert_eq!(
            outcome.parsed().unwrap().get("Yarrow"),
            Some(&ShoppingItem::new(4, "Deadhead often."))
        );
    }

    #[test]
    fn test_parse_reply_unparseable_uses_fallback() {
        let requested = plants(&["Lavender", "Sage", "Yarrow"]);
        for reply in ["Here is your list:\n1. Lavender x3", "{}", r#"{"Lavender": "lots"}"#, "[]"] {
            let outcome = parse_shopping_reply(reply, &requested);
            assert!(outcome.is_fallback(), "reply: {}", reply);

            let list = outcome.value();
            assert_eq!(list.len(), requested.len());
            for plant in &requested {
                assert_eq!(list.get(plant), Some(&ShoppingItem::new(3, "Generic care.")));
            }
        }
    }

    #[test]
    fn test_fallback_dedupes_repeated_plants() {
        let list = fallback_list(&plants(&["Rose", "Rose"]));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_serializes_as_object() {
        let list = fallback_list(&plants(&["Fern"]));
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!({"Fern": {"quantity": 3, "care_notes": "Generic care."}})
        );
    }

    #[tokio::test]
    async fn test_empty_plants_skips_llm() {
        let mock = MockLlmClient::new();
        let outcome = generate_shopping_list(&mock, &[]).await.unwrap();
        assert!(outcome.is_fallback());
        assert!(outcome.value().is_empty());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_handler_fallback_covers_every_plant() {
        let mock = MockLlmClient::new().with_text("Buy some plants!");
        let output = ShoppingListTool
            .call(json!({"plants": ["Lavender", "Sage"]}), &mock)
            .await
            .unwrap();

        assert!(output.used_fallback);
        assert_eq!(output.value["Lavender"]["quantity"], 3);
        assert_eq!(output.value["Sage"]["care_notes"], "Generic care.");
    }
}
