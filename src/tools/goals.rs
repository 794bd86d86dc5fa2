//! parse_garden_goals tool - extract structured preferences from free text

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::outcome::{ParseFailure, ParseOutcome, ToolOutput, strip_code_fence};
use super::{ToolHandler, ToolKind, decode_arguments};
use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient, Message};

const SYSTEM_PROMPT: &str = "You are a garden design assistant. Extract the user's garden preferences. \
Reply with a single JSON object with exactly these keys: theme, sun, maintenance, location, zone \
(zone is the USDA hardiness zone). Every value is a string. Reply with JSON only.";

/// Structured garden preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenGoals {
    #[serde(deserialize_with = "lenient_string")]
    pub theme: String,
    #[serde(deserialize_with = "lenient_string")]
    pub sun: String,
    #[serde(deserialize_with = "lenient_string")]
    pub maintenance: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub zone: String,
}

/// Accept numbers and booleans where a string is expected ("zone": 9)
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!("expected a string, got {}", other))),
    }
}

/// Parse an LLM reply into goals, or the error record carrying the raw text
pub fn parse_goals_reply(reply: &str) -> ParseOutcome<GardenGoals, ParseFailure> {
    match serde_json::from_str::<GardenGoals>(strip_code_fence(reply)) {
        Ok(goals) => ParseOutcome::Parsed(goals),
        Err(e) => {
            log::debug!("goal reply did not parse: {}", e);
            ParseOutcome::Fallback(ParseFailure::new(reply))
        }
    }
}

/// Ask the LLM to turn a free-text description into garden goals
pub async fn parse_garden_goals(
    llm: &dyn LlmClient,
    description: &str,
) -> Result<ParseOutcome<GardenGoals, ParseFailure>> {
    let request = CompletionRequest::new(vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(description),
    ]);

    let response = llm.complete(request).await?;
    Ok(parse_goals_reply(response.content_text()))
}

#[derive(Debug, Deserialize)]
struct ParseGoalsArgs {
    description: String,
}

/// Handler for `parse_garden_goals`
pub struct GoalParserTool;

#[async_trait]
impl ToolHandler for GoalParserTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ParseGoals
    }

    async fn call(&self, arguments: Value, llm: &dyn LlmClient) -> Result<ToolOutput> {
        let args: ParseGoalsArgs = decode_arguments(self.kind(), arguments)?;
        let outcome = parse_garden_goals(llm, &args.description).await?;
        Ok(ToolOutput::from_outcome(&outcome)?)
    }
}
