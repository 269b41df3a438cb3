//! OpenAI Chat Completions SSE Stream Adapter
//!
//! Handles the OpenAI `chat/completions` SSE format: `data: {...}` lines
//! carrying choice deltas, with tool-call arguments accumulated across
//! continuation chunks until a finish_reason or `[DONE]` sentinel.

use prompt_stash_core::streaming::{AdapterError, StreamAdapter, UnifiedStreamEvent};
use serde::Deserialize;

/// Internal event types from the OpenAI SSE format
#[derive(Debug, Deserialize)]
struct OpenAiEvent {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Adapter for the OpenAI Chat Completions SSE format
pub struct OpenAiAdapter {
    /// Tool call currently being accumulated
    tool_id: Option<String>,
    tool_name: Option<String>,
    tool_args_buffer: String,
}

impl OpenAiAdapter {
    pub fn new() -> Self {
        Self {
            tool_id: None,
            tool_name: None,
            tool_args_buffer: String::new(),
        }
    }

    /// Flush any pending tool call, emitting a ToolComplete event
    fn flush_pending_tool(&mut self) -> Option<UnifiedStreamEvent> {
        if let (Some(id), Some(name)) = (self.tool_id.take(), self.tool_name.take()) {
            let args = std::mem::take(&mut self.tool_args_buffer);
            Some(UnifiedStreamEvent::ToolComplete {
                tool_id: id,
                tool_name: name,
                arguments: args,
            })
        } else {
            None
        }
    }
}

impl Default for OpenAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAdapter for OpenAiAdapter {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn supports_tools(&self) -> bool {
        true
    }

    fn adapt(&mut self, input: &str) -> Result<Vec<UnifiedStreamEvent>, AdapterError> {
        let trimmed = input.trim();

        // Handle SSE format: "data: {...}"
        let json_str = if let Some(rest) = trimmed.strip_prefix("data: ") {
            rest
        } else if trimmed.is_empty() {
            return Ok(vec![]);
        } else {
            trimmed
        };

        if json_str.is_empty() || json_str == "[DONE]" {
            // End of stream - flush any pending tool call
            let mut events = vec![];
            if let Some(tool_event) = self.flush_pending_tool() {
                events.push(tool_event);
            }
            return Ok(events);
        }

        let event: OpenAiEvent =
            serde_json::from_str(json_str).map_err(|e| AdapterError::ParseError(e.to_string()))?;

        let mut events = vec![];

        if let Some(usage) = event.usage {
            events.push(UnifiedStreamEvent::Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            });
        }

        for choice in event.choices {
            if let Some(finish_reason) = choice.finish_reason {
                // Flush any pending tool call before completing
                if let Some(tool_event) = self.flush_pending_tool() {
                    events.push(tool_event);
                }
                events.push(UnifiedStreamEvent::Complete {
                    stop_reason: Some(finish_reason),
                });
                continue;
            }

            if let Some(delta) = choice.delta {
                if let Some(content) = delta.content {
                    if !content.is_empty() {
                        events.push(UnifiedStreamEvent::TextDelta { content });
                    }
                }

                if let Some(tool_calls) = delta.tool_calls {
                    for tc in tool_calls {
                        // A non-empty id that differs from the pending one
                        // starts a new tool call. Continuation chunks carry
                        // no id (or an empty one) and only append arguments.
                        if let Some(id) = tc.id.as_deref() {
                            if !id.is_empty() && self.tool_id.as_deref() != Some(id) {
                                if let Some(tool_event) = self.flush_pending_tool() {
                                    events.push(tool_event);
                                }
                                self.tool_id = Some(id.to_string());
                                if let Some(func) = &tc.function {
                                    self.tool_name = func.name.clone().filter(|n| !n.is_empty());
                                }
                                self.tool_args_buffer.clear();

                                if let Some(name) = &self.tool_name {
                                    events.push(UnifiedStreamEvent::ToolStart {
                                        tool_id: id.to_string(),
                                        tool_name: name.clone(),
                                        arguments: None,
                                    });
                                }
                            }
                        }

                        if let Some(func) = tc.function {
                            if self.tool_name.is_none() {
                                if let Some(name) = func.name.as_ref().filter(|n| !n.is_empty()) {
                                    self.tool_name = Some(name.clone());
                                }
                            }
                            if let Some(args) = func.arguments {
                                self.tool_args_buffer.push_str(&args);
                            }
                        }
                    }
                }
            }
        }

        Ok(events)
    }

    fn reset(&mut self) {
        self.tool_id = None;
        self.tool_name = None;
        self.tool_args_buffer.clear();
    }
}
