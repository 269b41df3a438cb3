//! Grade Prompt Tool
//!
//! Evaluates a prompt against prompt-engineering practice (clarity, task
//! framing, context, output constraints) and returns a numeric grade, an
//! improved rewrite, and a short analysis. The heavy lifting happens in a
//! structured-object request to the provider.

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

const GRADING_SYSTEM_PROMPT: &str = "You are an expert prompt engineer. Evaluate prompts for \
    clarity, specificity, context, structure, and output constraints. Grade on a 0-100 scale \
    where 100 is an exemplary prompt. Always propose a concrete improved rewrite.";

/// Arguments supplied by the model
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GradePromptArgs {
    prompt_to_evaluate: String,
}

/// Structured grading report returned by the provider
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GradeReport {
    /// Overall grade from 0 to 100
    pub grade: u8,
    /// Improved version of the evaluated prompt
    pub new_prompt: String,
    /// Explanation of the grade and the changes made
    pub analysis: String,
}

/// Tool that grades a prompt and proposes an improved rewrite
pub struct GradePromptTool {
    provider: Arc<dyn LlmProvider>,
}

impl GradePromptTool {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

impl ToolDefinitionTrait for GradePromptTool {
    fn name(&self) -> &str {
        "grade_prompt"
    }

    fn description(&self) -> &str {
        "Evaluate a prompt against prompt-engineering best practices. Returns a 0-100 grade, \
         an improved version of the prompt, and an analysis of its strengths and weaknesses."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt_to_evaluate": {
                    "type": "string",
                    "description": "The prompt text to grade. When omitted, the prompt \
                        currently selected in the library is graded instead."
                }
            }
        })
    }
}

#[async_trait]
impl ToolExecutable for GradePromptTool {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> CoreResult<Value> {
        let args: GradePromptArgs = serde_json::from_value(args)
            .map_err(|e| CoreError::validation(format!("Invalid grade_prompt arguments: {}", e)))?;

        // Omitted argument falls back to the selected prompt's template.
        let mut prompt = args.prompt_to_evaluate.trim();
        if prompt.is_empty() {
            prompt = ctx.selected_template().unwrap_or("").trim();
        }
        if prompt.is_empty() {
            return Err(CoreError::validation(
                "prompt_to_evaluate is empty and no prompt is selected",
            ));
        }

        debug!(chars = prompt.len(), "Grading prompt");

        let instruction = format!(
            "Evaluate the following prompt and produce a grading report.\n\nPrompt to evaluate:\n{}",
            prompt
        );

        let schema = output_schema::<GradeReport>()?;
        let report = self
            .provider
            .generate_object(
                instruction,
                Some(GRADING_SYSTEM_PROMPT.to_string()),
                "grade_report",
                schema,
            )
            .await
            .map_err(|e| CoreError::generation(e.to_string()))?;

        let mut report: GradeReport = serde_json::from_value(report).map_err(|e| {
            CoreError::generation(format!("Grading report had unexpected shape: {}", e))
        })?;
        report.grade = report.grade.min(100);

        serde_json::to_value(&report)
            .map_err(|e| CoreError::internal(format!("Failed to serialize report: {}", e)))
    }
}
