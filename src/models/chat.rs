//! Chat Transcript Models
//!
//! Entries of the running chat transcript, persisted under the `transcript`
//! store key. Tool-call and tool-result entries carry the payloads the UI
//! renders as inline cards.

use serde::{Deserialize, Serialize};

/// One entry in the chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEntry {
    /// A message typed by the user
    User {
        id: String,
        content: String,
        created_at: String,
    },
    /// Streamed assistant text
    Assistant {
        id: String,
        content: String,
        created_at: String,
    },
    /// A tool invocation requested by the assistant
    ToolCall {
        id: String,
        tool_call_id: String,
        tool_name: String,
        arguments: serde_json::Value,
        created_at: String,
    },
    /// The result of a tool invocation (card payload or error)
    ToolResult {
        id: String,
        tool_call_id: String,
        tool_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        created_at: String,
    },
}

impl TranscriptEntry {
    /// The entry's unique id.
    pub fn id(&self) -> &str {
        match self {
            TranscriptEntry::User { id, .. }
            | TranscriptEntry::Assistant { id, .. }
            | TranscriptEntry::ToolCall { id, .. }
            | TranscriptEntry::ToolResult { id, .. } => id,
        }
    }

    /// The entry's creation timestamp.
    pub fn created_at(&self) -> &str {
        match self {
            TranscriptEntry::User { created_at, .. }
            | TranscriptEntry::Assistant { created_at, .. }
            | TranscriptEntry::ToolCall { created_at, .. }
            | TranscriptEntry::ToolResult { created_at, .. } => created_at,
        }
    }
}
