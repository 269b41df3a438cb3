//! Convert To Few-Shot Tool
//!
//! Restructures an arbitrary prompt into few-shot form: a rewritten prompt
//! with demonstration examples inlined, plus the examples as structured
//! data so the card can render them separately.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use prompt_stash_core::context::ToolContext;
use prompt_stash_core::error::{CoreError, CoreResult};
use prompt_stash_core::tool_trait::{ToolDefinitionTrait, ToolExecutable};
use prompt_stash_llm::LlmProvider;

use crate::output_schema;

const CONVERSION_SYSTEM_PROMPT: &str = "You are an expert prompt engineer. Rewrite prompts into \
    few-shot form: keep the original task intact, add two or three representative input/output \
    demonstrations, and end with the open slot for the real input.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConvertArgs {
    prompt: String,
}

/// One demonstration pair in the converted prompt
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FewShotExample {
    /// Demonstration input
    pub input: String,
    /// Expected output for that input
    pub output: String,
}

/// Structured conversion result returned by the provider
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FewShotConversion {
    /// The rewritten prompt with demonstrations inlined
    pub few_shot_prompt: String,
    /// The demonstrations as structured data
    pub examples: Vec<FewShotExample>,
}

/// Tool that converts a prompt into few-shot form
pub struct ConvertToFewShotTool {
    provider: Arc<dyn LlmProvider>,
}

impl ConvertToFewShotTool {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

impl ToolDefinitionTrait for ConvertToFewShotTool {
    fn name(&self) -> &str {
        "convert_to_few_shot_prompt"
    }

    fn description(&self) -> &str {
        "Convert a prompt into few-shot form by adding representative input/output \
         demonstrations. Returns the rewritten prompt and the demonstrations used."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "The prompt to convert. When omitted, the prompt \
                        currently selected in the library is converted instead."
                }
            }
        })
    }
}

#[async_trait]
impl ToolExecutable for ConvertToFewShotTool {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> CoreResult<Value> {
        let args: ConvertArgs = serde_json::from_value(args).map_err(|e| {
            CoreError::validation(format!("Invalid convert_to_few_shot_prompt arguments: {}", e))
        })?;

        // Omitted argument falls back to the selected prompt's template.
        let mut prompt = args.prompt.trim();
        if prompt.is_empty() {
            prompt = ctx.selected_template().unwrap_or("").trim();
        }
        if prompt.is_empty() {
            return Err(CoreError::validation(
                "prompt is empty and no prompt is selected",
            ));
        }

        debug!(chars = prompt.len(), "Converting prompt to few-shot form");

        let instruction = format!(
            "Convert the following prompt into few-shot form.\n\nOriginal prompt:\n{}",
            prompt
        );

        let schema = output_schema::<FewShotConversion>()?;
        let conversion = self
            .provider
            .generate_object(
                instruction,
                Some(CONVERSION_SYSTEM_PROMPT.to_string()),
                "few_shot_conversion",
                schema,
            )
            .await
            .map_err(|e| CoreError::generation(e.to_string()))?;

        let conversion: FewShotConversion = serde_json::from_value(conversion).map_err(|e| {
            CoreError::generation(format!("Conversion result had unexpected shape: {}", e))
        })?;

        serde_json::to_value(&conversion)
            .map_err(|e| CoreError::internal(format!("Failed to serialize conversion: {}", e)))
    }
}
