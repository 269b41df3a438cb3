//! Prompt Composer
//!
//! Turns a free-text request into a ready-to-save prompt record in two
//! model calls: first a technique-guided draft of the prompt text, then a
//! structured formatting pass that yields title, description, template,
//! and tags.

use std::sync::Arc;

use schemars::schema_for;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use prompt_stash_llm::provider::LlmProvider;
use prompt_stash_llm::types::Message;

use crate::models::prompt::NewPrompt;
use crate::utils::error::{AppError, AppResult};

const MAX_TAGS: usize = 3;
const MAX_TAG_LEN: usize = 20;

const DRAFT_SYSTEM_PROMPT: &str = "You are an expert prompt engineer. Write a single, \
high-quality prompt template for the user's request. Use {variableName} placeholders for \
the parts the end user will fill in. Output only the prompt text, nothing else.";

const FORMAT_SYSTEM_PROMPT: &str = "You format prompt templates into library records. \
Derive a short title, a one-sentence description, and up to three short lowercase tags. \
Keep the template text unchanged apart from whitespace cleanup.";

/// Prompting technique applied to the drafted template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Technique {
    /// Include worked input/output examples in the template
    #[default]
    FewShot,
    /// Ask the model to reason step by step before answering
    ChainOfThought,
    /// Plain instruction with no examples
    ZeroShot,
}

impl Technique {
    fn instructions(self) -> &'static str {
        match self {
            Technique::FewShot => {
                "Use the few-shot technique: include two or three representative \
                 input/output examples before the final instruction."
            }
            Technique::ChainOfThought => {
                "Use the chain-of-thought technique: instruct the model to reason \
                 step by step before giving its final answer."
            }
            Technique::ZeroShot => {
                "Use the zero-shot technique: a single clear instruction with no examples."
            }
        }
    }
}

/// Structured result of the formatting pass
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ComposedPrompt {
    /// Short display title
    pub title: String,
    /// One-sentence description
    pub description: String,
    /// The prompt template with `{variableName}` placeholders
    pub template: String,
    /// Up to three short lowercase tags
    pub tags: Vec<String>,
}

impl ComposedPrompt {
    /// Convert into a create request for the library.
    pub fn into_new_prompt(self) -> NewPrompt {
        NewPrompt {
            title: self.title,
            description: Some(self.description),
            template: Some(self.template),
            tags: self.tags,
            ..Default::default()
        }
    }
}

pub struct ComposerService {
    provider: Arc<dyn LlmProvider>,
}

impl ComposerService {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Compose a prompt record from a free-text request.
    pub async fn generate(
        &self,
        request: &str,
        technique: Technique,
    ) -> AppResult<ComposedPrompt> {
        if request.trim().is_empty() {
            return Err(AppError::validation("Composer request must not be empty"));
        }

        debug!(?technique, "Drafting prompt template");
        let draft = self.draft_template(request, technique).await?;

        let schema = output_schema()?;
        let format_prompt = format!(
            "Format this prompt template as a library record:\n\n{}",
            draft
        );
        let value = self
            .provider
            .generate_object(
                format_prompt,
                Some(FORMAT_SYSTEM_PROMPT.to_string()),
                "composed_prompt",
                schema,
            )
            .await?;

        let mut composed: ComposedPrompt = serde_json::from_value(value).map_err(|e| {
            AppError::generation(format!("Composer returned an unexpected shape: {}", e))
        })?;
        clamp_tags(&mut composed.tags);
        Ok(composed)
    }

    async fn draft_template(&self, request: &str, technique: Technique) -> AppResult<String> {
        let system = format!("{}\n\n{}", DRAFT_SYSTEM_PROMPT, technique.instructions());
        // The draft pass streams like any chat turn; the deltas are not
        // surfaced anywhere, so drain them.
        let (tx, mut rx) = mpsc::channel(256);
        let drain = tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let response = self
            .provider
            .stream_message(vec![Message::user(request)], Some(system), vec![], tx)
            .await;
        let _ = drain.await;
        let response = response?;

        match response.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(AppError::generation("Composer draft pass returned no text")),
        }
    }
}

fn output_schema() -> AppResult<serde_json::Value> {
    let schema = schema_for!(ComposedPrompt);
    let mut value = serde_json::to_value(schema)?;
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
    }
    Ok(value)
}

fn clamp_tags(tags: &mut Vec<String>) {
    tags.truncate(MAX_TAGS);
    for tag in tags.iter_mut() {
        if tag.chars().count() > MAX_TAG_LEN {
            *tag = tag.chars().take(MAX_TAG_LEN).collect();
        }
    }
}
