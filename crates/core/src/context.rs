//! Tool Execution Context
//!
//! Read-only context handed to chat tools when they execute. Tools receive a
//! `ToolContext` and cannot mutate session state through it; the chat
//! orchestrator owns the transcript and applies tool results itself.

/// Context for tool-level execution.
#[derive(Debug, Clone)]
pub struct ToolContext {
    session_id: String,
    /// Unique identifier for this specific tool call.
    tool_call_id: String,
    /// Template text of the prompt currently selected in the library, if any.
    /// The only piece of prompt-store state visible to the chat layer.
    selected_template: Option<String>,
}

impl ToolContext {
    /// Create a new ToolContext.
    pub fn new(session_id: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            tool_call_id: tool_call_id.into(),
            selected_template: None,
        }
    }

    /// Attach the selected prompt's template text.
    pub fn with_selected_template(mut self, template: Option<String>) -> Self {
        self.selected_template = template;
        self
    }

    /// Returns the chat session identifier.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the identifier of this tool call.
    pub fn tool_call_id(&self) -> &str {
        &self.tool_call_id
    }

    /// Returns the selected prompt's template text, if one is selected.
    pub fn selected_template(&self) -> Option<&str> {
        self.selected_template.as_deref()
    }
}
