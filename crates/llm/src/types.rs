//! Shared LLM Types
//!
//! Message, tool, response, and error types shared by all provider
//! implementations and their consumers.

use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One content block inside a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    /// Plain text
    Text { text: String },
    /// A tool invocation emitted by the assistant
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// The result of a tool invocation, fed back to the model
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

/// A single message in the conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: Vec<MessageContent>,
}

impl Message {
    /// Create a user message with plain text content
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![MessageContent::Text { text: text.into() }],
        }
    }

    /// Create an assistant message with plain text content
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: vec![MessageContent::Text { text: text.into() }],
        }
    }

    /// Create a system message with plain text content
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: vec![MessageContent::Text { text: text.into() }],
        }
    }

    /// Concatenated text content of this message
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                MessageContent::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A tool offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's parameters
    pub input_schema: serde_json::Value,
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    Other,
}

impl From<&str> for StopReason {
    fn from(s: &str) -> Self {
        match s {
            "stop" | "end_turn" => StopReason::EndTurn,
            "tool_calls" | "tool_use" => StopReason::ToolUse,
            "length" | "max_tokens" => StopReason::MaxTokens,
            _ => StopReason::Other,
        }
    }
}

/// Token usage statistics for a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Complete response from a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Text content, if any
    pub content: Option<String>,
    /// Tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
    pub usage: UsageStats,
    pub model: String,
}

/// Provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key; `None` means no credential is configured
    pub api_key: Option<String>,
    /// Model identifier (e.g., "gpt-4o")
    pub model: String,
    /// Override for the API base URL
    pub base_url: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl ProviderConfig {
    /// Config for the given model with an API key
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Coarse failure classification for user-facing reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing credential, invalid key, access denied
    Auth,
    /// Connection, timeout, transport failures
    Network,
    /// Everything else (bad request, parse failure, server error)
    Unknown,
}

/// Errors from the generation-service boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LlmError {
    /// No credential configured, or the service rejected it
    AuthenticationFailed { message: String },
    /// Transport-level failure before or during the response
    NetworkError { message: String },
    /// The service throttled the request
    RateLimited { message: String },
    /// The request was malformed
    InvalidRequest { message: String },
    /// The service returned an unexpected response shape
    ParseError { message: String },
    /// The requested model does not exist
    ModelNotFound { model: String },
    /// 5xx from the service
    ServerError {
        message: String,
        status: Option<u16>,
    },
    /// Anything else
    Other { message: String },
}

impl LlmError {
    /// Classify this error for user-facing reporting (toast copy).
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            LlmError::AuthenticationFailed { .. } => FailureKind::Auth,
            LlmError::NetworkError { .. } => FailureKind::Network,
            _ => FailureKind::Unknown,
        }
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::AuthenticationFailed { message } => {
                write!(f, "Authentication failed: {}", message)
            }
            LlmError::NetworkError { message } => write!(f, "Network error: {}", message),
            LlmError::RateLimited { message } => write!(f, "Rate limited: {}", message),
            LlmError::InvalidRequest { message } => write!(f, "Invalid request: {}", message),
            LlmError::ParseError { message } => write!(f, "Parse error: {}", message),
            LlmError::ModelNotFound { model } => write!(f, "Model not found: {}", model),
            LlmError::ServerError { message, status } => match status {
                Some(code) => write!(f, "Server error ({}): {}", code, message),
                None => write!(f, "Server error: {}", message),
            },
            LlmError::Other { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for LlmError {}

/// Result type alias for provider operations
pub type LlmResult<T> = Result<T, LlmError>;
