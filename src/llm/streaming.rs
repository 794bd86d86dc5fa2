//! Streaming support for chat-completion responses.
//!
//! The service sends Server-Sent Events whose `data:` payload is either a JSON
//! chunk or the literal `[DONE]`:
//! ```text
//! data: {"choices":[{"index":0,"delta":{"content":"Hel"},"finish_reason":null}]}
//! data: [DONE]
//! ```

use serde::Deserialize;

use crate::error::{GardenError, Result};

/// One decoded SSE payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    /// Text content delta
    Text(String),
    /// Chunk without text (role header, finish marker, keep-alive)
    Empty,
    /// End of stream
    Done,
}

#[derive(Debug, Deserialize)]
struct ChunkBody {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    message: String,
}

/// Parse the `data:` field of one SSE event.
pub fn parse_stream_chunk(data: &str) -> Result<StreamChunk> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(StreamChunk::Empty);
    }
    if data == "[DONE]" {
        return Ok(StreamChunk::Done);
    }

    let body: ChunkBody = serde_json::from_str(data)
        .map_err(|e| GardenError::Stream(format!("Malformed stream chunk: {}", e)))?;

    if let Some(error) = body.error {
        return Err(GardenError::Stream(error.message));
    }

    match body.choices.into_iter().next().and_then(|c| c.delta.content) {
        Some(text) if !text.is_empty() => Ok(StreamChunk::Text(text)),
        _ => Ok(StreamChunk::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_delta() {
        let data = r#"{"choices":[{"index":0,"delta":{"content":"Lavender"},"finish_reason":null}]}"#;
        assert_eq!(
            parse_stream_chunk(data).unwrap(),
            StreamChunk::Text("Lavender".to_string())
        );
    }

    #[test]
    fn test_parse_role_header_is_empty() {
        let data = r#"{"choices":[{"index":0,"delta":{"role":"assistant","content":""}}]}"#;
        assert_eq!(parse_stream_chunk(data).unwrap(), StreamChunk::Empty);
    }

    #[test]
    fn test_parse_finish_chunk_is_empty() {
        let data = r#"{"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#;
        assert_eq!(parse_stream_chunk(data).unwrap(), StreamChunk::Empty);
    }

    #[test]
    fn test_parse_usage_only_chunk_is_empty() {
        let data = r#"{"choices":[],"usage":{"prompt_tokens":10,"completion_tokens":3}}"#;
        assert_eq!(parse_stream_chunk(data).unwrap(), StreamChunk::Empty);
    }

    #[test]
    fn test_parse_done() {
        assert_eq!(parse_stream_chunk("[DONE]").unwrap(), StreamChunk::Done);
        assert_eq!(parse_stream_chunk(" [DONE]\n").unwrap(), StreamChunk::Done);
    }

    #[test]
    fn test_parse_blank_is_empty() {
        assert_eq!(parse_stream_chunk("").unwrap(), StreamChunk::Empty);
    }

    #[test]
    fn test_parse_error_payload() {
        let data = r#"{"error":{"message":"server overloaded","type":"server_error"}}"#;
        let err = parse_stream_chunk(data).unwrap_err();
        assert!(matches!(err, GardenError::Stream(ref m) if m == "server overloaded"));
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(matches!(
            parse_stream_chunk("{not json"),
            Err(GardenError::Stream(_))
        ));
    }
}
