//! Chat Service
//!
//! Drives the assistant conversation: maintains the persisted transcript,
//! streams model output, and executes tool calls through the registry,
//! appending the resulting cards to the transcript. Credential presence is
//! checked before any network traffic so a missing key fails immediately.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use prompt_stash_core::context::ToolContext;
use prompt_stash_core::streaming::UnifiedStreamEvent;
use prompt_stash_core::tool_trait::UnifiedToolRegistry;
use prompt_stash_llm::provider::{missing_api_key_error, LlmProvider};
use prompt_stash_llm::types::{
    FailureKind, Message, MessageContent, MessageRole, ToolDefinition,
};

use crate::models::chat::TranscriptEntry;
use crate::storage::store::{StashStore, KEY_TRANSCRIPT};
use crate::utils::error::{AppError, AppResult};

const SYSTEM_PROMPT: &str = "You are a prompt engineering assistant inside a prompt library \
application. Help the user write, improve, and understand prompts. When a tool fits the \
request, call it instead of answering inline; its result is rendered to the user as a card.";

/// Upper bound on model→tool→model rounds within one user message
const MAX_TOOL_ROUNDS: usize = 4;

pub struct ChatService {
    provider: Arc<dyn LlmProvider>,
    registry: UnifiedToolRegistry,
    store: StashStore,
    session_id: String,
    transcript: Vec<TranscriptEntry>,
}

impl ChatService {
    /// Create a chat service, loading any persisted transcript.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: UnifiedToolRegistry,
        store: StashStore,
    ) -> Self {
        let transcript = store.load(KEY_TRANSCRIPT, vec![]);
        Self {
            provider,
            registry,
            store,
            session_id: Uuid::new_v4().to_string(),
            transcript,
        }
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Drop the transcript, in memory and on disk.
    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
        self.store.save(KEY_TRANSCRIPT, &self.transcript);
    }

    /// Send a user message and run the conversation until the model stops
    /// requesting tools.
    ///
    /// `selected_tools` restricts which registered tools are offered; an
    /// empty list offers all of them. `selected_template` is the selected
    /// prompt's template text, handed to tools through their context so a
    /// tool invoked without an explicit subject operates on it. Streaming
    /// events are forwarded on `tx`; the returned entries are the ones
    /// appended this turn, already persisted. Fails before appending
    /// anything when no credential is configured.
    pub async fn send_message(
        &mut self,
        content: &str,
        selected_tools: &[String],
        selected_template: Option<String>,
        tx: mpsc::Sender<UnifiedStreamEvent>,
    ) -> AppResult<Vec<TranscriptEntry>> {
        if self.provider.config().api_key.is_none() {
            let err = missing_api_key_error(self.provider.name());
            let _ = tx
                .send(UnifiedStreamEvent::Error {
                    message: err.to_string(),
                    code: Some(kind_code(err.failure_kind()).to_string()),
                })
                .await;
            return Err(err.into());
        }

        let offered = self.offered_tools(selected_tools);
        let system = self.build_system_prompt(&offered);
        let appended_from = self.transcript.len();

        self.push(TranscriptEntry::User {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            created_at: Utc::now().to_rfc3339(),
        });

        let mut total_usage = prompt_stash_llm::types::UsageStats::default();
        let mut stop_reason = None;

        for round in 0..MAX_TOOL_ROUNDS {
            let messages = self.transcript_to_messages();
            // Tools are withheld on the last round so the model must answer.
            let tools = if round + 1 < MAX_TOOL_ROUNDS {
                offered.clone()
            } else {
                vec![]
            };

            let response = match self
                .provider
                .stream_message(messages, Some(system.clone()), tools, tx.clone())
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(kind = kind_code(e.failure_kind()), error = %e, "Chat turn failed");
                    let _ = tx
                        .send(UnifiedStreamEvent::Error {
                            message: e.to_string(),
                            code: Some(kind_code(e.failure_kind()).to_string()),
                        })
                        .await;
                    return Err(e.into());
                }
            };

            total_usage.input_tokens += response.usage.input_tokens;
            total_usage.output_tokens += response.usage.output_tokens;

            if let Some(text) = response.content.as_deref() {
                if !text.is_empty() {
                    self.push(TranscriptEntry::Assistant {
                        id: Uuid::new_v4().to_string(),
                        content: text.to_string(),
                        created_at: Utc::now().to_rfc3339(),
                    });
                }
            }

            if response.tool_calls.is_empty() {
                stop_reason = Some(response.stop_reason);
                break;
            }

            for call in &response.tool_calls {
                self.run_tool_call(call, selected_template.clone(), &tx)
                    .await;
            }
        }

        let _ = tx
            .send(UnifiedStreamEvent::Usage {
                input_tokens: total_usage.input_tokens,
                output_tokens: total_usage.output_tokens,
            })
            .await;
        let _ = tx
            .send(UnifiedStreamEvent::Complete {
                stop_reason: stop_reason
                    .map(|r| serde_json::to_value(r).ok())
                    .flatten()
                    .and_then(|v| v.as_str().map(String::from)),
            })
            .await;

        Ok(self.transcript[appended_from..].to_vec())
    }

    async fn run_tool_call(
        &mut self,
        call: &prompt_stash_llm::types::ToolCall,
        selected_template: Option<String>,
        tx: &mpsc::Sender<UnifiedStreamEvent>,
    ) {
        debug!(tool = %call.name, id = %call.id, "Executing tool call");
        let _ = tx
            .send(UnifiedStreamEvent::ToolStart {
                tool_id: call.id.clone(),
                tool_name: call.name.clone(),
                arguments: Some(call.arguments.to_string()),
            })
            .await;

        self.push(TranscriptEntry::ToolCall {
            id: Uuid::new_v4().to_string(),
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            arguments: call.arguments.clone(),
            created_at: Utc::now().to_rfc3339(),
        });

        let ctx = ToolContext::new(self.session_id.clone(), call.id.clone())
            .with_selected_template(selected_template);
        let (result, error) = match self
            .registry
            .execute(&call.name, &ctx, call.arguments.clone())
            .await
        {
            Ok(value) => (Some(value), None),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                (None, Some(e.to_string()))
            }
        };

        let _ = tx
            .send(UnifiedStreamEvent::ToolResult {
                tool_id: call.id.clone(),
                tool_name: call.name.clone(),
                result: result.clone(),
                error: error.clone(),
            })
            .await;

        self.push(TranscriptEntry::ToolResult {
            id: Uuid::new_v4().to_string(),
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            result,
            error,
            created_at: Utc::now().to_rfc3339(),
        });
    }

    fn push(&mut self, entry: TranscriptEntry) {
        self.transcript.push(entry);
        self.store.save(KEY_TRANSCRIPT, &self.transcript);
    }

    /// Definitions for the offered subset; an empty selection means all
    /// registered tools.
    fn offered_tools(&self, selected: &[String]) -> Vec<ToolDefinition> {
        self.registry
            .definitions()
            .into_iter()
            .filter_map(|def| {
                let name = def.get("name")?.as_str()?.to_string();
                if !selected.is_empty() && !selected.contains(&name) {
                    return None;
                }
                Some(ToolDefinition {
                    description: def
                        .get("description")
                        .and_then(|d| d.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    input_schema: def
                        .get("parameters")
                        .cloned()
                        .unwrap_or(serde_json::json!({})),
                    name,
                })
            })
            .collect()
    }

    fn build_system_prompt(&self, offered: &[ToolDefinition]) -> String {
        if offered.is_empty() {
            return SYSTEM_PROMPT.to_string();
        }
        let names: Vec<&str> = offered.iter().map(|t| t.name.as_str()).collect();
        format!(
            "{}\n\nTools available in this conversation: {}.",
            SYSTEM_PROMPT,
            names.join(", ")
        )
    }

    fn transcript_to_messages(&self) -> Vec<Message> {
        self.transcript
            .iter()
            .map(|entry| match entry {
                TranscriptEntry::User { content, .. } => Message::user(content.clone()),
                TranscriptEntry::Assistant { content, .. } => {
                    Message::assistant(content.clone())
                }
                TranscriptEntry::ToolCall {
                    tool_call_id,
                    tool_name,
                    arguments,
                    ..
                } => Message {
                    role: MessageRole::Assistant,
                    content: vec![MessageContent::ToolUse {
                        id: tool_call_id.clone(),
                        name: tool_name.clone(),
                        input: arguments.clone(),
                    }],
                },
                TranscriptEntry::ToolResult {
                    tool_call_id,
                    result,
                    error,
                    ..
                } => Message {
                    role: MessageRole::User,
                    content: vec![MessageContent::ToolResult {
                        tool_use_id: tool_call_id.clone(),
                        content: match (result, error) {
                            (Some(value), _) => value.to_string(),
                            (None, Some(message)) => format!("Error: {}", message),
                            (None, None) => String::new(),
                        },
                    }],
                },
            })
            .collect()
    }
}

fn kind_code(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Auth => "auth",
        FailureKind::Network => "network",
        FailureKind::Unknown => "unknown",
    }
}
