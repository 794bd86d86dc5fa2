//! Tagged results for best-effort parsing of LLM replies

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a tool's payload came from the LLM or from its fallback default.
///
/// Serializes as the bare payload, so the follow-up message content is the same
/// shape either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParseOutcome<T, F = T> {
    /// The LLM produced valid structured data
    Parsed(T),
    /// The deterministic default was substituted
    Fallback(F),
}

impl<T, F> ParseOutcome<T, F> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback(_))
    }

    /// The parsed payload, if any
    pub fn parsed(&self) -> Option<&T> {
        match self {
            ParseOutcome::Parsed(value) => Some(value),
            ParseOutcome::Fallback(_) => None,
        }
    }
}

impl<T> ParseOutcome<T> {
    /// The payload regardless of where it came from
    pub fn into_inner(self) -> T {
        match self {
            ParseOutcome::Parsed(value) | ParseOutcome::Fallback(value) => value,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            ParseOutcome::Parsed(value) | ParseOutcome::Fallback(value) => value,
        }
    }
}

/// Error record returned when an LLM reply could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub error: String,
    pub raw_output: String,
}

impl ParseFailure {
    pub fn new(raw_output: impl Into<String>) -> Self {
        Self {
            error: "Could not parse output".to_string(),
            raw_output: raw_output.into(),
        }
    }
}

/// JSON-ready result of one tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub value: Value,
    pub used_fallback: bool,
}

impl ToolOutput {
    pub fn parsed(value: Value) -> Self {
        Self {
            value,
            used_fallback: false,
        }
    }

    pub fn from_outcome<T: Serialize, F: Serialize>(outcome: &ParseOutcome<T, F>) -> serde_json::Result<Self> {
        Ok(Self {
            value: serde_json::to_value(outcome)?,
            used_fallback: outcome.is_fallback(),
        })
    }
}

/// Strip a surrounding markdown code fence from an LLM reply
///
/// "```json\n[1]\n```" becomes "[1]"; anything else is only trimmed.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}
